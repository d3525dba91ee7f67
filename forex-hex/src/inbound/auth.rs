//! Authentication middleware for API keys and bearer tokens.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use forex_adapters::security::hash_api_key;
use forex_adapters::token::Claims;

use super::handlers::AppState;

/// Paths reachable without an API key.
const PUBLIC_PREFIXES: [&str; 3] = ["/health", "/swagger-ui", "/api-docs"];

/// Token issuance endpoint. Only API-key callers may use it.
pub const TOKEN_PATH: &str = "/api/token/generate";

/// Roles a bearer token must carry to reach the rate endpoints.
pub const REQUIRED_ROLES: [&str; 2] = ["User", "Admin"];

pub(crate) fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Extracts the credential from the Authorization header.
/// Expected format: "Bearer <credential>" or just "<credential>"
pub(crate) fn extract_api_key(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?.trim();
    Some(header.strip_prefix("Bearer ").unwrap_or(header).trim())
}

/// The authenticated caller, stored in the request extensions.
#[derive(Debug, Clone)]
pub enum Caller {
    ApiKey { key_hash: String },
    Token(Claims),
}

impl Caller {
    /// Rate-limit partition. Tokens are limited per subject, not per token.
    pub fn rate_limit_key(&self) -> String {
        match self {
            Caller::ApiKey { key_hash } => format!("key:{key_hash}"),
            Caller::Token(claims) => format!("user:{}", claims.sub),
        }
    }
}

fn authenticate(state: &AppState, credential: &str) -> Option<Caller> {
    if state.api_keys.verify(credential) {
        return Some(Caller::ApiKey {
            key_hash: hash_api_key(credential),
        });
    }
    let tokens = state.tokens.as_ref()?;
    tokens.validate(credential).ok().map(Caller::Token)
}

/// Authentication middleware.
///
/// The credential is first checked as an API key (SHA-256, constant-time
/// comparison). Otherwise, when token issuance is configured, it is validated
/// as a signed bearer token, which must carry every role in
/// [`REQUIRED_ROLES`]. Returns 401 for unknown credentials and 403 for tokens
/// lacking a role.
///
/// `/health` and the OpenAPI documentation bypass authentication.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_public(&path) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let caller = match extract_api_key(auth_header) {
        Some(credential) if !credential.is_empty() => authenticate(&state, credential),
        _ => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "Missing or invalid Authorization header",
            );
        }
    };

    let Some(caller) = caller else {
        tracing::debug!(%path, "Rejected request with unknown credential");
        let message = if state.tokens.is_some() {
            "Invalid API key or token"
        } else {
            "Invalid API key"
        };
        return error_response(StatusCode::UNAUTHORIZED, message);
    };

    if let Caller::Token(claims) = &caller {
        if path == TOKEN_PATH {
            return error_response(
                StatusCode::FORBIDDEN,
                "Tokens can only be issued with an API key",
            );
        }
        if let Some(missing) = REQUIRED_ROLES.iter().find(|role| !claims.has_role(role)) {
            tracing::debug!(subject = %claims.sub, role = missing, "Token lacks a required role");
            return error_response(
                StatusCode::FORBIDDEN,
                &format!("Missing required role: {missing}"),
            );
        }
    }

    request.extensions_mut().insert(caller);
    next.run(request).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": message,
            "code": status.as_u16()
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_api_key_bearer() {
        assert_eq!(
            extract_api_key(Some("Bearer sk_test_123")),
            Some("sk_test_123")
        );
    }

    #[test]
    fn test_extract_api_key_raw() {
        assert_eq!(extract_api_key(Some("sk_test_123")), Some("sk_test_123"));
    }

    #[test]
    fn test_extract_api_key_none() {
        assert_eq!(extract_api_key(None), None);
    }

    #[test]
    fn test_rate_limit_key_by_caller_kind() {
        let key = Caller::ApiKey {
            key_hash: "abc".to_string(),
        };
        assert_eq!(key.rate_limit_key(), "key:abc");

        let token = Caller::Token(Claims {
            sub: "alice".to_string(),
            jti: "one".to_string(),
            roles: vec![],
            iss: "forex-gateway".to_string(),
            aud: "forex-gateway".to_string(),
            iat: 0,
            exp: 0,
        });
        assert_eq!(token.rate_limit_key(), "user:alice");
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public("/health"));
        assert!(is_public("/swagger-ui"));
        assert!(is_public("/swagger-ui/index.html"));
        assert!(is_public("/api-docs/openapi.json"));

        assert!(!is_public("/healthz"));
        assert!(!is_public("/api/v1/currency-exchange/Frankfurter/latest-rates"));
        assert!(!is_public(TOKEN_PATH));
    }
}
