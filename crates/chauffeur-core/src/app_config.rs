use std::path::PathBuf;

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

/// Credentials for the transactional email API. Any missing value makes
/// delivery fail at submit time rather than at startup.
#[derive(Clone, Default)]
pub struct EmailJsConfig {
    pub base_url: String,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
}

impl std::fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsConfig")
            .field("base_url", &self.base_url)
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &self.public_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub site_origin: String,
    pub google_maps_api_key: Option<String>,
    pub settings_path: PathBuf,
    pub pricing_path: Option<PathBuf>,
    pub route_debounce_ms: u64,
    pub maps_init_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub routes_base_url: String,
    pub directions_base_url: String,
    pub emailjs: EmailJsConfig,
    pub company_name: String,
    pub bookings_email: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("site_origin", &self.site_origin)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("settings_path", &self.settings_path)
            .field("pricing_path", &self.pricing_path)
            .field("route_debounce_ms", &self.route_debounce_ms)
            .field("maps_init_timeout_secs", &self.maps_init_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("routes_base_url", &self.routes_base_url)
            .field("directions_base_url", &self.directions_base_url)
            .field("emailjs", &self.emailjs)
            .field("company_name", &self.company_name)
            .field("bookings_email", &self.bookings_email)
            .finish()
    }
}
