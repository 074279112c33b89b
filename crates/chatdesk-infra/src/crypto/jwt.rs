//! HS256 JWT session tokens.
//!
//! Implements `TokenIssuer` from `chatdesk-core` with `jsonwebtoken`. Claims
//! carry the numeric user id as `sub` plus the username and role, so request
//! authentication never touches the database.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use chatdesk_core::service::token::TokenIssuer;
use chatdesk_types::config::AuthConfig;
use chatdesk_types::error::AuthError;
use chatdesk_types::user::{Identity, UserRole};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    role: String,
    exp: i64,
    iat: i64,
}

pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Build from config, generating a random per-process secret when none is set.
    ///
    /// Tokens signed with an ephemeral secret stop validating after a restart.
    pub fn from_config(config: &AuthConfig) -> Self {
        let ttl = Duration::hours(i64::from(config.token_ttl_hours));
        match &config.jwt_secret {
            Some(secret) if !secret.expose_secret().is_empty() => Self::new(secret, ttl),
            _ => {
                warn!("No JWT secret configured; using an ephemeral secret for this process");
                Self::new(&ephemeral_secret(), ttl)
            }
        }
    }
}

fn ephemeral_secret() -> SecretString {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    SecretString::from(hex)
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.user_id.to_string(),
            username: identity.username.clone(),
            role: identity.role.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let user_id: i64 = data
            .claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))?;
        let role: UserRole = data.claims.role.parse().map_err(AuthError::InvalidToken)?;

        Ok(Identity {
            user_id,
            username: data.claims.username,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str, ttl: Duration) -> JwtTokenIssuer {
        JwtTokenIssuer::new(&SecretString::from(secret), ttl)
    }

    fn admin() -> Identity {
        Identity {
            user_id: 7,
            username: "root".to_string(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = issuer("test-secret", Duration::hours(24));
        let token = tokens.issue(&admin()).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer("one", Duration::hours(1)).issue(&admin()).unwrap();
        let err = issuer("two", Duration::hours(1)).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_expired_token() {
        let tokens = issuer("test-secret", Duration::hours(-1));
        let token = tokens.issue(&admin()).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_garbage_token() {
        let tokens = issuer("test-secret", Duration::hours(1));
        assert!(matches!(
            tokens.verify("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_from_config_without_secret_still_roundtrips() {
        let tokens = JwtTokenIssuer::from_config(&AuthConfig::default());
        let token = tokens.issue(&admin()).unwrap();
        assert_eq!(tokens.verify(&token).unwrap().user_id, 7);
    }
}
