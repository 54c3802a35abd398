// JWT token service
// Decision: Use HS256 algorithm for simplicity (symmetric key)
// Decision: Zero leeway on expiry; a token whose exp has passed is rejected
// even when the clock is within the library's default grace window

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use inkpost_core::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::JwtConfig;

/// JWT claims carried by every issued token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// User role
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a signed token for a user
    pub fn issue(&self, user_id: Uuid, email: &str, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.token_lifetime)?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).context("Failed to encode token")
    }

    /// Validate signature, structure and expiry, returning the claims.
    /// Any failure is reported as the same opaque error; callers must not
    /// distinguish a bad signature from an expired token in responses.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid or expired token")?;

        // jsonwebtoken treats exp == now as still valid; the boundary second
        // must already count as expired
        if token_data.claims.exp <= Utc::now().timestamp() {
            anyhow::bail!("Invalid or expired token");
        }

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds
    pub fn token_lifetime_secs(&self) -> i64 {
        self.config.token_lifetime.as_secs() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            token_lifetime: StdDuration::from_secs(3600),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let service = TokenService::new(test_config());
        let user_id = Uuid::nil();
        let token = service.issue(user_id, "test@example.com", Role::User).unwrap();

        assert!(!token.is_empty());

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = TokenService::new(test_config());
        assert!(service.verify("not-a-jwt").is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = TokenService::new(test_config());
        let token = service
            .issue(Uuid::nil(), "test@example.com", Role::User)
            .unwrap();

        // Flip a character in the payload segment
        let mut chars: Vec<char> = token.chars().collect();
        let mid = token.find('.').unwrap() + 2;
        chars[mid] = if chars[mid] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();

        assert!(service.verify(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = TokenService::new(test_config());
        let other = TokenService::new(JwtConfig {
            secret: "a-different-secret".to_string(),
            token_lifetime: StdDuration::from_secs(3600),
        });

        let token = service
            .issue(Uuid::nil(), "test@example.com", Role::Admin)
            .unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected_with_zero_leeway() {
        // Lifetime of zero means exp == iat == now, which must already
        // be rejected
        let service = TokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            token_lifetime: StdDuration::from_secs(0),
        });

        let token = service
            .issue(Uuid::nil(), "test@example.com", Role::User)
            .unwrap();
        assert!(service.verify(&token).is_err());
    }
}
