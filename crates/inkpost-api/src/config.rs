// Server configuration loaded from environment variables

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Postgres connection string; absent means dev mode (in-memory storage)
    pub database_url: Option<String>,
    /// Allowed CORS origins; empty means same-origin only
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_default();

        Self {
            port,
            database_url,
            cors_origins,
        }
    }

    /// Dev mode: no database configured, storage is in-memory
    pub fn is_dev_mode(&self) -> bool {
        self.database_url.is_none()
    }
}
