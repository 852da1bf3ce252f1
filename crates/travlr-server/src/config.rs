use travlr_core::AppError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Deployment mode. Only development exposes internal error text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

/// HTTP-level settings. Database and token settings live in their own crates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: Environment,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: Environment::Production,
            cors_origins: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `TRAVLR_PORT` (default 3000)
    /// - `TRAVLR_ENV` (`development` or anything else for production)
    /// - `TRAVLR_CORS_ORIGINS` (comma separated; unset means permissive)
    /// - `TRAVLR_BODY_LIMIT` (bytes, default 1 MiB)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let port = match lookup("TRAVLR_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid TRAVLR_PORT '{raw}': must be a port number"))
            })?,
        };

        let environment = match lookup("TRAVLR_ENV").as_deref().map(str::trim) {
            Some(env) if env.eq_ignore_ascii_case("development") => Environment::Development,
            _ => Environment::Production,
        };

        let cors_origins = lookup("TRAVLR_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty());

        let body_limit = match lookup("TRAVLR_BODY_LIMIT") {
            None => DEFAULT_BODY_LIMIT,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid TRAVLR_BODY_LIMIT '{raw}': must be a positive number of bytes"
                    )));
                }
            },
        };

        Ok(Self {
            port,
            environment,
            cors_origins,
            body_limit,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
