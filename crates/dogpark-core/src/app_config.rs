use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub regions_path: Option<PathBuf>,
    pub places_api_key: Option<String>,
    pub places_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Search radius used when a county is selected.
    pub region_radius_meters: f64,
    /// Ceiling applied to the center-to-corner distance of a viewport search.
    pub viewport_radius_cap_meters: f64,
    /// Pause between clearing the board and issuing a viewport search.
    pub viewport_search_delay_ms: u64,
    /// How many place detail fetches may be in flight at once.
    pub detail_concurrency: usize,
    pub photo_max_px: u32,
    /// Region searched once when the server starts, as the map page did on load.
    pub initial_region: Option<String>,
}

impl AppConfig {
    /// Returns the Places API key or the error a caller should surface when
    /// a search is attempted without one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `GOOGLE_PLACES_API_KEY`
    /// was not set.
    pub fn require_places_api_key(&self) -> Result<&str, ConfigError> {
        self.places_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_PLACES_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("regions_path", &self.regions_path)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_base_url", &self.places_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("region_radius_meters", &self.region_radius_meters)
            .field(
                "viewport_radius_cap_meters",
                &self.viewport_radius_cap_meters,
            )
            .field("viewport_search_delay_ms", &self.viewport_search_delay_ms)
            .field("detail_concurrency", &self.detail_concurrency)
            .field("photo_max_px", &self.photo_max_px)
            .field("initial_region", &self.initial_region)
            .finish()
    }
}
