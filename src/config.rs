//! Application configuration loaded from environment variables.

use std::env;

/// HTTP header name for API key authentication.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Query/body parameter name carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const DEV_API_KEY: &str = "dev-api-key-do-not-use-in-production";

    /// Paths that bypass API key authentication by default.
    /// Matched exactly or as a prefix ending at a path separator.
    pub const EXEMPT_PATHS: &[&str] = &["/health", "/debug", "/test/async-example"];
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Valid API keys. Empty is allowed but makes every
    /// non-exempt request fail with a configuration error.
    pub api_keys: Vec<String>,
    /// Path prefixes that bypass authentication
    pub exempt_paths: Vec<String>,
    /// Disable API key authentication entirely (development only)
    pub auth_disabled: bool,
    /// Optional PostgreSQL URL for the debug connectivity probe
    pub database_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development):
    /// - All variables have sensible defaults
    /// - Only RUST_ENV is required
    /// - API_KEYS falls back to a single well-known development key
    ///
    /// In production mode (RUST_ENV=production):
    /// - The development default key is rejected
    /// - DISABLE_API_AUTH must not be set
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `KEYGATE_HOST`: Server host (default: 127.0.0.1)
    /// - `KEYGATE_PORT`: Server port (default: 8080)
    /// - `API_KEYS`: Comma-separated list of valid API keys
    /// - `KEYGATE_EXEMPT_PATHS`: Comma-separated exempt path prefixes
    ///   (default: /health, /debug, /test/async-example)
    /// - `DISABLE_API_AUTH`: Set to bypass authentication (development only)
    /// - `DATABASE_URL`: PostgreSQL connection string for the debug probe (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Parse environment - required
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        // Load values with defaults
        let host = env::var("KEYGATE_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("KEYGATE_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("KEYGATE_PORT must be a valid port number"))?;

        // API_KEYS is a comma-separated allow-list. When the variable is unset
        // in development a single well-known key is used; in production an
        // unset variable means an empty list, which fails closed per request.
        let api_keys = match env::var("API_KEYS") {
            Ok(raw) => parse_list(&raw),
            Err(_) if environment.is_development() => vec![defaults::DEV_API_KEY.to_string()],
            Err(_) => Vec::new(),
        };

        let exempt_paths = match env::var("KEYGATE_EXEMPT_PATHS") {
            Ok(raw) => parse_list(&raw),
            Err(_) => defaults::EXEMPT_PATHS.iter().map(|s| s.to_string()).collect(),
        };

        // Treat any value other than empty/"0"/"false" as enabled.
        let auth_disabled = env::var("DISABLE_API_AUTH")
            .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL").ok();

        let config = Config {
            environment,
            host,
            port,
            api_keys,
            exempt_paths,
            auth_disabled,
            database_url,
        };

        // Validate production configuration
        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.auth_disabled {
            errors.push(
                "DISABLE_API_AUTH is set. Authentication must not be disabled in production."
                    .to_string(),
            );
        }

        if self.api_keys.iter().any(|k| k == defaults::DEV_API_KEY) {
            errors.push(format!(
                "API_KEYS contains the development default '{}'. Set production keys.",
                defaults::DEV_API_KEY
            ));
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Split a comma-separated environment value into trimmed, non-empty entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
