//! Login and session state.
//!
//! The login endpoint reads form fields (not JSON) and answers a successful
//! attempt with a plain-text line `role,name`.

use crate::model::Role;
use crate::source::DataSource;
use serde::Serialize;

pub const LOGIN_PATH: &str = "login";

/// Descriptor of a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub username: String,
    pub display_name: String,
    /// Lower-cased role as sent by the backend.
    pub role: String,
}

impl Session {
    pub fn role_kind(&self) -> Role {
        Role::from_wire(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role_kind() == Role::Admin
    }
}

/// Result of a login attempt.
///
/// Rejected credentials are an ordinary outcome, kept apart from a server
/// that could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Session),
    InvalidCredentials,
    Unreachable(String),
}

/// Parse the `role,name` body of a successful login.
///
/// Splits once on the first comma; the name is trimmed and the role
/// lower-cased. Returns `None` when there is no comma.
pub fn parse_login_body(username: &str, body: &str) -> Option<Session> {
    let (role, name) = body.split_once(',')?;
    Some(Session {
        username: username.to_string(),
        display_name: name.trim().to_string(),
        role: role.to_lowercase(),
    })
}

/// Who is logged in, if anyone.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current: Option<Session>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt a login through `source`.
    ///
    /// The state is reset to "not logged in" before the attempt and only
    /// set again when the attempt succeeds.
    pub fn login(
        &mut self,
        source: &dyn DataSource,
        username: &str,
        password: &str,
    ) -> LoginOutcome {
        self.current = None;
        let outcome = source.login(username, password);
        if let LoginOutcome::Authenticated(session) = &outcome {
            self.current = Some(session.clone());
        }
        outcome
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            log::info!("user '{}' logged out", session.username);
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FixtureSource;

    #[test]
    fn test_parse_login_body() {
        let session = parse_login_body("dlopez", "ADMIN,David López\n").unwrap();
        assert_eq!(session.username, "dlopez");
        assert_eq!(session.display_name, "David López");
        assert_eq!(session.role, "admin");
        assert!(session.is_admin());
    }

    #[test]
    fn test_parse_login_body_splits_once() {
        let session = parse_login_body("juan", "comercial, Pérez, Juan").unwrap();
        assert_eq!(session.role, "comercial");
        assert_eq!(session.display_name, "Pérez, Juan");
        assert_eq!(session.role_kind(), Role::Salesperson);
    }

    #[test]
    fn test_parse_login_body_without_comma() {
        assert_eq!(parse_login_body("ana", "OK"), None);
        assert_eq!(parse_login_body("ana", ""), None);
    }

    #[test]
    fn test_session_state_lifecycle() {
        let source = FixtureSource::new();
        let mut state = SessionState::new();
        assert!(!state.is_logged_in());

        let outcome = state.login(&source, "admin", "1234");
        assert!(matches!(outcome, LoginOutcome::Authenticated(_)));
        assert_eq!(state.current().unwrap().display_name, "Administrador");

        // A failed attempt leaves nobody logged in
        assert_eq!(
            state.login(&source, "admin", "nope"),
            LoginOutcome::InvalidCredentials
        );
        assert!(state.current().is_none());

        state.login(&source, "admin", "1234");
        state.logout();
        assert!(!state.is_logged_in());
    }
}
