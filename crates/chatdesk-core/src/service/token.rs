//! TokenIssuer trait for bearer session tokens.
//!
//! The JWT adapter (`JwtTokenIssuer`) lives in chatdesk-infra.

use chatdesk_types::error::AuthError;
use chatdesk_types::user::Identity;

pub trait TokenIssuer: Send + Sync {
    /// Sign a token for the given identity.
    fn issue(&self, identity: &Identity) -> Result<String, AuthError>;

    /// Validate a token and recover the identity it was issued for.
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
