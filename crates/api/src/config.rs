use std::str::FromStr;

/// Which store backend the server persists movies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Deadline for each store operation in seconds (default: `5`).
    pub store_timeout_secs: u64,
    /// Store backend (default: `postgres`).
    pub store_backend: StoreBackend,
    /// Maximum pooled database connections (default: `20`).
    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `4000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STORE_TIMEOUT_SECS`   | `5`                        |
    /// | `STORE_BACKEND`        | `postgres`                 |
    /// | `DB_MAX_CONNECTIONS`   | `20`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let store_timeout_secs: u64 = std::env::var("STORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("STORE_TIMEOUT_SECS must be a valid u64");

        let store_backend: StoreBackend = std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .parse()
            .expect("STORE_BACKEND must be 'postgres' or 'memory'");

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store_timeout_secs,
            store_backend,
            db_max_connections,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
