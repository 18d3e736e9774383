//! Authorization gate guarding mutating operations.
//!
//! A gate is a synchronous yes/no decision taken from request headers. A
//! passing decision yields a [`Caller`], which mutating service operations
//! take as a parameter; without one they cannot be invoked.

use std::collections::HashSet;

use axum::http::HeaderMap;
use folio_kernel::settings::AuthSettings;

mod extract;

pub use extract::Authorized;

/// Header carrying the session token issued by the authentication service.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Proof that the authorization gate accepted the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    subject: String,
}

impl Caller {
    fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Label identifying the caller in logs. Never the token itself.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Pass/fail check evaluated before any mutating operation.
pub trait AuthorizationGate: Send + Sync {
    fn authorize(&self, headers: &HeaderMap) -> Option<Caller>;
}

/// Gate accepting configured session tokens, or everything in public mode.
#[derive(Debug, Clone, Default)]
pub struct SessionTokenGate {
    public: bool,
    tokens: HashSet<String>,
}

impl SessionTokenGate {
    pub fn new(public: bool, tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            public,
            tokens: tokens.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        let gate = Self::new(settings.public, settings.session_tokens.iter().cloned());
        if !gate.public && gate.tokens.is_empty() {
            tracing::warn!("no session tokens configured; all mutating requests will be rejected");
        }
        gate
    }
}

impl AuthorizationGate for SessionTokenGate {
    fn authorize(&self, headers: &HeaderMap) -> Option<Caller> {
        if self.public {
            return Some(Caller::new("public"));
        }

        let token = headers.get(SESSION_TOKEN_HEADER)?.to_str().ok()?;
        if self.tokens.contains(token) {
            Some(Caller::new("session"))
        } else {
            tracing::debug!("session token rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
        headers
    }

    #[test]
    fn public_mode_accepts_anonymous_requests() {
        let gate = SessionTokenGate::new(true, Vec::new());
        let caller = gate.authorize(&HeaderMap::new()).unwrap();
        assert_eq!(caller.subject(), "public");
    }

    #[test]
    fn known_token_is_accepted() {
        let gate = SessionTokenGate::new(false, vec!["s3cret".to_string()]);
        assert!(gate.authorize(&headers_with_token("s3cret")).is_some());
    }

    #[test]
    fn missing_or_unknown_token_is_rejected() {
        let gate = SessionTokenGate::new(false, vec!["s3cret".to_string()]);
        assert!(gate.authorize(&HeaderMap::new()).is_none());
        assert!(gate.authorize(&headers_with_token("guess")).is_none());
    }

    #[test]
    fn empty_tokens_never_match() {
        let gate = SessionTokenGate::new(false, vec![String::new()]);
        assert!(gate.authorize(&headers_with_token("")).is_none());
    }
}
