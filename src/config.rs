use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,

    /// Base URL of the circular-hub ("as-is") offer feed.
    pub catalog_api_base: String,
    pub catalog_language: String,

    /// OSRM-compatible routing endpoint for driving distances.
    pub routing_api_base: String,
    /// Nominatim-compatible geocoding endpoint.
    pub geocoding_api_base: String,

    /// Resend-compatible mail API.
    pub mail_api_base: String,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub site_url: String,

    /// Identity endpoint that resolves bearer tokens to users.
    pub identity_api_url: String,
    pub identity_api_key: Option<String>,

    /// Interval between background polling passes, in seconds.
    pub check_interval_secs: u64,
    /// Temporarily disables both the background poller and the trigger routes.
    pub check_disabled: bool,
    /// Optional shared secret required by the run-trigger routes.
    pub check_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let catalog_api_base = env::var("CATALOG_API_BASE").unwrap_or_else(|_|
            "https://web-api.ikea.com/circular/circular-asis".to_string()
        );
        let catalog_language = env::var("CATALOG_LANGUAGE").unwrap_or_else(|_| "nl".to_string());

        let routing_api_base = env::var("ROUTING_API_BASE").unwrap_or_else(|_|
            "https://router.project-osrm.org".to_string()
        );
        let geocoding_api_base = env::var("GEOCODING_API_BASE").unwrap_or_else(|_|
            "https://nominatim.openstreetmap.org".to_string()
        );

        let mail_api_base = env::var("MAIL_API_BASE").unwrap_or_else(|_|
            "https://api.resend.com".to_string()
        );
        let mail_api_key = env::var("MAIL_API_KEY").ok();
        let mail_from = env::var("MAIL_FROM").unwrap_or_else(|_|
            "As-is Alerts <onboarding@resend.dev>".to_string()
        );
        let site_url = env::var("SITE_URL").unwrap_or_else(|_|
            "http://localhost:3000".to_string()
        );

        let identity_api_url = env::var("IDENTITY_API_URL")?;
        let identity_api_key = env::var("IDENTITY_API_KEY").ok();

        let check_interval_secs = env::var("CHECK_INTERVAL_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()?;
        let check_disabled = env::var("CHECK_DISABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let check_secret = env::var("CHECK_SECRET").ok();

        Ok(Self {
            database_url,
            server_host,
            server_port,
            catalog_api_base,
            catalog_language,
            routing_api_base,
            geocoding_api_base,
            mail_api_base,
            mail_api_key,
            mail_from,
            site_url,
            identity_api_url,
            identity_api_key,
            check_interval_secs,
            check_disabled,
            check_secret,
        })
    }
}
