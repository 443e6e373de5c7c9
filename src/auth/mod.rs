pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::types::Portal;

pub use password::{generate_password, hash_password, verify_password, PasswordError};

/// Token payload. A token is only honoured by the portal that issued it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub portal: Portal,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Uuid, portal: Portal, role: impl Into<String>) -> Self {
        let now = Utc::now();
        let exp = (now + lifetime(config::config().security.jwt_expiry_hours)).timestamp();

        Self {
            sub,
            portal,
            role: role.into(),
            exp,
            iat: now.timestamp(),
        }
    }
}

fn lifetime(expiry_hours: u64) -> Duration {
    Duration::hours(config::clamp_expiry(expiry_hours) as i64)
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Invalid JWT token: {0}")]
    Invalid(String),
    #[error("Token issued for {found}, expected {expected}")]
    WrongPortal { expected: Portal, found: Portal },
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Decode a bearer token and check that it belongs to `expected`.
pub fn validate_jwt(token: &str, expected: Portal) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());

    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::Invalid(e.to_string()))?;

    let claims = token_data.claims;
    if claims.portal != expected {
        return Err(JwtError::WrongPortal {
            expected,
            found: claims.portal,
        });
    }
    Ok(claims)
}

/// Issue a token for a freshly authenticated account.
pub fn issue_token(sub: Uuid, portal: Portal, role: impl Into<String>) -> Result<String, JwtError> {
    generate_jwt(&Claims::new(sub, portal, role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_for_issuing_portal() {
        let id = Uuid::new_v4();
        let token = issue_token(id, Portal::Tutoring, "tutor").unwrap();
        let claims = validate_jwt(&token, Portal::Tutoring).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, "tutor");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_is_rejected_by_other_portals() {
        let token = issue_token(Uuid::new_v4(), Portal::Store, "admin").unwrap();
        match validate_jwt(&token, Portal::Freelance) {
            Err(JwtError::WrongPortal { expected, found }) => {
                assert_eq!(expected, Portal::Freelance);
                assert_eq!(found, Portal::Store);
            }
            other => panic!("expected WrongPortal, got {:?}", other),
        }
    }

    #[test]
    fn oversized_expiry_is_capped_at_a_year() {
        assert_eq!(lifetime(u64::MAX), Duration::hours(24 * 365));
        assert_eq!(lifetime(0), Duration::hours(1));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(matches!(
            validate_jwt("not.a.token", Portal::Registration),
            Err(JwtError::Invalid(_))
        ));
    }
}
