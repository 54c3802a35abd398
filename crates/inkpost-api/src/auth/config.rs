// Authentication configuration loaded from environment variables.
// Decision: Default token lifetime is 7 days, matching typical blog sessions

use std::time::Duration;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs
    pub secret: String,
    /// Token lifetime
    pub token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_lifetime: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env(dev_mode: bool) -> Self {
        let secret = std::env::var("AUTH_JWT_SECRET").unwrap_or_else(|_| {
            if dev_mode {
                // Generate a random secret for dev mode; tokens do not
                // survive a restart, which is fine for local development
                use rand::Rng;
                let bytes: [u8; 32] = rand::thread_rng().gen();
                hex::encode(bytes)
            } else {
                tracing::warn!("AUTH_JWT_SECRET not set, using insecure default");
                "insecure-dev-secret-change-me".to_string()
            }
        });

        let token_lifetime = std::env::var("AUTH_TOKEN_LIFETIME")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(7 * 24 * 60 * 60));

        Self {
            jwt: JwtConfig {
                secret,
                token_lifetime,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetime_is_seven_days() {
        let config = JwtConfig::default();
        assert_eq!(config.token_lifetime, Duration::from_secs(604_800));
    }
}
