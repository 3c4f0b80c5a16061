//! Configuration types.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Settings for the wizard service binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port for the REST server.
    pub port: u16,
    /// Redirect target for exit/finish navigation.
    pub dashboard_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            dashboard_path: "/dashboard".to_string(),
        }
    }
}

impl AppConfig {
    /// Read overrides from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("SKILLSWAP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);
        let dashboard_path =
            std::env::var("SKILLSWAP_DASHBOARD_PATH").unwrap_or(defaults.dashboard_path);
        Self {
            port,
            dashboard_path,
        }
    }
}

/// Connection settings for the hosted backend (REST + object storage).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the backend project, no trailing slash.
    pub base_url: String,
    /// Service key sent as both `apikey` and bearer token.
    pub service_key: SecretString,
    /// Object-storage bucket for profile photos.
    pub photo_bucket: String,
}

impl GatewayConfig {
    /// Build from the environment. The URL and key are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("SKILLSWAP_BACKEND_URL")
            .map_err(|_| ConfigError::MissingEnvVar("SKILLSWAP_BACKEND_URL".to_string()))?;
        let service_key = std::env::var("SKILLSWAP_SERVICE_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("SKILLSWAP_SERVICE_KEY".to_string()))?;
        let photo_bucket = std::env::var("SKILLSWAP_PHOTO_BUCKET")
            .unwrap_or_else(|_| "profile-photos".to_string());
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: SecretString::from(service_key),
            photo_bucket,
        })
    }

    /// Construct directly (tests, embedded use).
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        photo_bucket: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: SecretString::from(service_key.into()),
            photo_bucket: photo_bucket.into(),
        }
    }
}
