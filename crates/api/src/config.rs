//! Process configuration, read once in `main` and injected everywhere.

/// Runtime configuration for the API process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
    /// HS256 signing secret for all token purposes.
    pub token_secret: String,
    /// Base URL of the frontend, used to build email links.
    pub frontend_base_url: String,
}

impl ApiConfig {
    /// Reads configuration from the environment, with dev defaults for
    /// everything except nothing — a missing `JWT_SECRET` is allowed but
    /// loudly insecure.
    pub fn from_env() -> Self {
        let token_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let frontend_base_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        Self {
            bind_addr,
            token_secret,
            frontend_base_url,
        }
    }
}
