//! Data sources.
//!
//! [`DataSource`] abstracts where records come from, so the typed client and
//! the aggregates never care whether they are talking to the real backend
//! ([`LiveSource`]) or to built-in fixtures ([`FixtureSource`]).

pub mod fixture;
pub mod live;

pub use fixture::FixtureSource;
pub use live::LiveSource;

use crate::auth::LoginOutcome;
use crate::config::{ClientConfig, DataSourceKind};
use crate::error::ApiError;
use crate::normalize::normalize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// HTTP verbs the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(ApiError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A JSON body, already normalized
    Json(Value),
    /// The call succeeded with no body (empty or 204)
    Empty,
}

impl Payload {
    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Empty => None,
        }
    }
}

/// Query parameters, in backend naming (`clienteId`, `comercialId`, ...).
pub type Query = [(&'static str, String)];

/// Backend access: one call, one attempt.
///
/// Implementations must never panic on remote failures; HTTP and transport
/// problems come back as [`ApiError`].
pub trait DataSource {
    /// Perform a single call against an entity-relative `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] for status >= 400, [`ApiError::Transport`]
    /// when the server is unreachable, and [`ApiError::Decode`] when a
    /// successful body is not JSON.
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query,
    ) -> Result<Payload, ApiError>;

    /// Submit credentials to the login endpoint.
    fn login(&self, username: &str, password: &str) -> LoginOutcome;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Build the data source selected by `config.data_source`.
pub fn from_config(config: &ClientConfig) -> Box<dyn DataSource> {
    match config.data_source {
        DataSourceKind::Live => Box::new(LiveSource::new(config.clone())),
        DataSourceKind::Fixture => Box::new(FixtureSource::new()),
    }
}

/// Turn a successful response body into a [`Payload`].
///
/// Empty bodies and 204 are [`Payload::Empty`]; anything else must be JSON
/// and is normalized.
pub(crate) fn decode_body(status: u16, text: &str) -> Result<Payload, ApiError> {
    if status == 204 || text.trim().is_empty() {
        return Ok(Payload::Empty);
    }
    let value: Value = serde_json::from_str(text)?;
    Ok(Payload::Json(normalize(value)))
}
