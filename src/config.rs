use std::env;

use thiserror::Error;

/// Deployment flavour; controls how much error detail reaches API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        }
    }
}

/// Credentials and defaults for the external media CDN.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder uploaded product images are placed in.
    pub folder: String,
}

/// Settings shared by every request handler.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HS256 secret shared with the token issuing service.
    pub jwt_secret: String,
    pub environment: Environment,
    pub uploads_per_hour: u32,
}

impl ServerConfig {
    pub fn new(jwt_secret: impl Into<String>, environment: Environment) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            environment,
            uploads_per_hour: DEFAULT_UPLOADS_PER_HOUR,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Network and storage settings used to start the HTTP server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    pub server: ServerConfig,
    pub media: MediaConfig,
}

pub const DEFAULT_UPLOADS_PER_HOUR: u32 = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").unwrap_or("app.db".to_string());
        let address = env::var("ADDRESS").unwrap_or("127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let environment = env::var("APP_ENV")
            .map(|value| Environment::parse(&value))
            .unwrap_or_default();

        let uploads_per_hour = env::var("UPLOADS_PER_HOUR")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_UPLOADS_PER_HOUR);

        let server = ServerConfig {
            jwt_secret: required("JWT_SECRET")?,
            environment,
            uploads_per_hour,
        };

        let media = MediaConfig {
            cloud_name: required("MEDIA_CLOUD_NAME")?,
            api_key: required("MEDIA_API_KEY")?,
            api_secret: required("MEDIA_API_SECRET")?,
            folder: env::var("MEDIA_FOLDER").unwrap_or("products".to_string()),
        };

        Ok(Self {
            database_url,
            address,
            port,
            server,
            media,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
