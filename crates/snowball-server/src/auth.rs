use axum::body::Body;
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;

/// Authentication configuration for the control routes.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for control access. None = auth disabled.
    pub bearer_token: Option<String>,
}

impl AuthConfig {
    /// Whether `headers` carry the configured token (always true when no
    /// token is configured).
    pub fn allows(&self, headers: &HeaderMap) -> bool {
        let Some(ref expected) = self.bearer_token else {
            return true;
        };
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }
}

/// Axum middleware that validates Bearer token authentication.
/// Expects the `AuthConfig` in the request extensions; without one, all
/// requests are allowed through.
pub async fn bearer_auth_middleware(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let auth_config = request
        .extensions()
        .get::<AuthConfig>()
        .cloned()
        .unwrap_or_default();

    if !auth_config.allows(request.headers()) {
        tracing::warn!(path = %request.uri().path(), "Rejected control request without valid token");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(auth: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = auth {
            headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn open_when_no_token_configured() {
        let auth = AuthConfig::default();
        assert!(auth.allows(&headers(None)));
        assert!(auth.allows(&headers(Some("Bearer anything"))));
    }

    #[test]
    fn requires_matching_token() {
        let auth = AuthConfig {
            bearer_token: Some("s3cret".to_string()),
        };
        assert!(auth.allows(&headers(Some("Bearer s3cret"))));
        assert!(!auth.allows(&headers(Some("Bearer wrong"))));
        assert!(!auth.allows(&headers(Some("s3cret"))));
        assert!(!auth.allows(&headers(None)));
    }
}
