//! HTTP data source backed by a blocking `ureq` agent.
//!
//! The agent keeps a cookie jar, so the session cookie handed out by the
//! login endpoint rides along on every later call from the same source.

use super::{decode_body, DataSource, Method, Payload, Query};
use crate::auth::{parse_login_body, LoginOutcome, LOGIN_PATH};
use crate::config::ClientConfig;
use crate::error::ApiError;
use serde_json::Value;
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

pub struct LiveSource {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl LiveSource {
    pub fn new(config: ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self { agent, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        query: &Query,
    ) -> Result<ureq::Response, ureq::Error> {
        let mut req = self.agent.request(method.as_str(), url);
        for (key, value) in query {
            req = req.query(key, value);
        }
        match (method, body) {
            (Method::Post | Method::Put, Some(body)) => req
                .set("Content-Type", "application/json")
                .send_string(&body.to_string()),
            _ => req.call(),
        }
    }
}

impl DataSource for LiveSource {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query,
    ) -> Result<Payload, ApiError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::request_span(method, path).entered();

        let url = self.config.url_for(path);
        let start = Instant::now();
        log::debug!("{} {}", method, url);

        let result = match self.send(method, &url, body, query) {
            Ok(response) => {
                let status = response.status();
                match response.into_string() {
                    Ok(text) => decode_body(status, &text),
                    Err(e) => {
                        log::error!("connection error reading {} {}: {}", method, url, e);
                        Err(ApiError::Transport(e.to_string()))
                    }
                }
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                let detail = if body.is_empty() {
                    "no detail available"
                } else {
                    body.as_str()
                };
                log::error!("HTTP error {} on {} {}: {}", status, method, url, detail);
                Err(ApiError::Http { status, body })
            }
            Err(ureq::Error::Transport(transport)) => {
                log::error!("connection error on {} {}: {}", method, url, transport);
                Err(ApiError::Transport(transport.to_string()))
            }
        };

        #[cfg(feature = "metrics")]
        METRICS.record_request(method, start.elapsed(), result.is_err());
        #[cfg(not(feature = "metrics"))]
        let _ = start;

        result
    }

    fn login(&self, username: &str, password: &str) -> LoginOutcome {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::login_span(username).entered();

        let url = self.config.url_for(LOGIN_PATH);
        let form = [("username", username), ("password", password)];

        let outcome = match self.agent.post(&url).send_form(&form) {
            Ok(response) if response.status() == 200 => match response.into_string() {
                Ok(text) => parse_login_body(username, &text)
                    .map(LoginOutcome::Authenticated)
                    .unwrap_or(LoginOutcome::InvalidCredentials),
                Err(e) => LoginOutcome::Unreachable(e.to_string()),
            },
            Ok(_) | Err(ureq::Error::Status(..)) => LoginOutcome::InvalidCredentials,
            Err(ureq::Error::Transport(transport)) => {
                log::error!("connection error on POST {}: {}", url, transport);
                LoginOutcome::Unreachable(transport.to_string())
            }
        };

        match &outcome {
            LoginOutcome::Authenticated(session) => {
                log::info!("user '{}' logged in as {}", username, session.role)
            }
            LoginOutcome::InvalidCredentials => {
                log::info!("login rejected for user '{}'", username)
            }
            LoginOutcome::Unreachable(_) => {}
        }
        outcome
    }

    fn describe(&self) -> String {
        self.config.base_url.clone()
    }
}
