/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// Monitoring rules live in [`millguard_engine::MonitorConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// How often the maintenance check runs, in seconds (default: `600`).
    pub maintenance_check_interval_secs: u64,
    /// Path to the exported classifier pipeline (default: `model.json`).
    pub model_path: String,
    /// Postgres URL. When unset, state is kept in memory.
    pub database_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                 |
    /// |-----------------------------------|-------------------------|
    /// | `HOST`                            | `0.0.0.0`               |
    /// | `PORT`                            | `5000`                  |
    /// | `CORS_ORIGINS`                    | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`            | `60`                    |
    /// | `MAINTENANCE_CHECK_INTERVAL_SECS` | `600`                   |
    /// | `MODEL_PATH`                      | `model.json`            |
    /// | `DATABASE_URL`                    | unset (in-memory store) |
    ///
    /// Panics on malformed numbers; misconfiguration should fail at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Dispatch waits for every channel, so leave room above the channel timeout.
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let maintenance_check_interval_secs: u64 =
            std::env::var("MAINTENANCE_CHECK_INTERVAL_SECS")
                .unwrap_or_else(|_| "600".into())
                .parse()
                .expect("MAINTENANCE_CHECK_INTERVAL_SECS must be a valid u64");

        let model_path = std::env::var("MODEL_PATH").unwrap_or_else(|_| "model.json".into());

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            maintenance_check_interval_secs,
            model_path,
            database_url,
        }
    }
}
