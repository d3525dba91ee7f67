//! Signed bearer tokens (HS256 JWT) carrying a subject and its roles.

use std::time::Duration;

use chrono::Utc;
use forex_types::TokenError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shortest accepted HMAC secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Token lifetime when none is configured.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Issues and validates tokens for one issuer/audience pair.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        if config.secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: config.ttl,
        })
    }

    /// Signs a token for `subject` with a fresh `jti`.
    pub fn issue(&self, subject: &str, roles: &[String]) -> Result<String, TokenError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp: iat.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = ?err.kind(), "Rejected bearer token");
                TokenError::InvalidToken
            })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn config() -> TokenConfig {
        TokenConfig {
            secret: SECRET.to_vec(),
            issuer: "forex-gateway".to_string(),
            audience: "forex-clients".to_string(),
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_issue_then_validate_keeps_subject_and_roles() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        let token = issuer.issue("alice", &roles(&["User", "Admin"])).unwrap();

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.has_role("User"));
        assert!(claims.has_role("Admin"));
        assert!(!claims.has_role("admin"));
        assert_eq!(claims.iss, "forex-gateway");
        assert_eq!(claims.aud, "forex-clients");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_each_token_gets_its_own_jti() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        let a = issuer.validate(&issuer.issue("alice", &[]).unwrap()).unwrap();
        let b = issuer.validate(&issuer.issue("alice", &[]).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_blank_subject_is_rejected() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        assert!(matches!(
            issuer.issue("   ", &[]),
            Err(TokenError::EmptySubject)
        ));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let mut cfg = config();
        cfg.secret = b"too-short".to_vec();
        assert!(matches!(TokenIssuer::new(&cfg), Err(TokenError::WeakSecret)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "alice".to_string(),
            jti: Uuid::new_v4().to_string(),
            roles: roles(&["User", "Admin"]),
            iss: "forex-gateway".to_string(),
            aud: "forex-clients".to_string(),
            iat: now - 3600,
            exp: now - 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(issuer.validate(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        let mut other = config();
        other.secret = b"fedcba9876543210fedcba9876543210".to_vec();
        let token = TokenIssuer::new(&other)
            .unwrap()
            .issue("mallory", &roles(&["Admin"]))
            .unwrap();

        assert!(matches!(issuer.validate(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        let mut other = config();
        other.audience = "someone-else".to_string();
        let token = TokenIssuer::new(&other).unwrap().issue("alice", &[]).unwrap();

        assert!(matches!(issuer.validate(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        assert!(matches!(
            issuer.validate("not.a.token"),
            Err(TokenError::InvalidToken)
        ));
    }
}
