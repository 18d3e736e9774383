use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use folio_http::error::AppError;

use crate::{AuthorizationGate, Caller};

/// Extractor resolving the [`Caller`] for a request.
///
/// Rejects with 401 when the gate refuses the request. List it before any
/// body extractor so refused requests are turned away before their payload
/// is looked at.
#[derive(Debug, Clone)]
pub struct Authorized(pub Caller);

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
    Arc<dyn AuthorizationGate>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<dyn AuthorizationGate>::from_ref(state);

        match gate.authorize(&parts.headers) {
            Some(caller) => Ok(Authorized(caller)),
            None => {
                tracing::info!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "unauthorized request"
                );
                Err(AppError::unauthorized("unauthorized"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SessionTokenGate, SESSION_TOKEN_HEADER};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::IntoResponse,
    };

    #[derive(Clone)]
    struct TestState {
        gate: Arc<dyn AuthorizationGate>,
    }

    impl FromRef<TestState> for Arc<dyn AuthorizationGate> {
        fn from_ref(state: &TestState) -> Self {
            state.gate.clone()
        }
    }

    fn state() -> TestState {
        TestState {
            gate: Arc::new(SessionTokenGate::new(false, vec!["s3cret".to_string()])),
        }
    }

    #[tokio::test]
    async fn resolves_caller_for_valid_token() {
        let request = Request::builder()
            .header(SESSION_TOKEN_HEADER, "s3cret")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let Authorized(caller) = Authorized::from_request_parts(&mut parts, &state())
            .await
            .unwrap();
        assert_eq!(caller.subject(), "session");
    }

    #[tokio::test]
    async fn rejects_with_unauthorized() {
        let request = Request::builder().body(Body::empty()).unwrap();
        let (mut parts, _) = request.into_parts();

        let rejection = Authorized::from_request_parts(&mut parts, &state())
            .await
            .unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
