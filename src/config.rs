use std::env;

/// Default endpoint of the external classification service the frontend
/// forwards uploads to.
pub const DEFAULT_CLASSIFY_ENDPOINT: &str = "http://localhost:8000/classify/";

const DEFAULT_FRONTEND_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    // Classification endpoint (receives the multipart CSV upload)
    pub classify_endpoint: String,

    // HTTP listen port for the frontend
    pub frontend_port: u16,

    // When true, the classified CSV is also written under the OS temp dir
    // and the result page links to it with a file:// URL. Only meaningful
    // when the browser and this service share a filesystem.
    pub local_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let frontend_port = match env::var("FRONTEND_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("FRONTEND_PORT must be a port number, got '{}'", raw))?,
            Err(_) => DEFAULT_FRONTEND_PORT,
        };

        Ok(Config {
            classify_endpoint: env::var("CLASSIFY_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_CLASSIFY_ENDPOINT.to_string()),

            frontend_port,

            local_mode: env::var("LOCAL_MODE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    pub fn log_config(&self) {
        tracing::info!("📋 Configuration:");
        tracing::info!("   Classify Endpoint: {}", self.classify_endpoint);
        tracing::info!("   Frontend Port: {}", self.frontend_port);
        tracing::info!("   Local Mode: {}", self.local_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_port_parsing() {
        env::remove_var("CLASSIFY_ENDPOINT");
        env::remove_var("FRONTEND_PORT");
        env::remove_var("LOCAL_MODE");

        let config = Config::from_env().unwrap();
        assert_eq!(config.classify_endpoint, DEFAULT_CLASSIFY_ENDPOINT);
        assert_eq!(config.frontend_port, DEFAULT_FRONTEND_PORT);
        assert!(!config.local_mode);

        env::set_var("FRONTEND_PORT", "not-a-port");
        assert!(Config::from_env().is_err());

        env::set_var("FRONTEND_PORT", "8081");
        env::set_var("LOCAL_MODE", "1");
        let config = Config::from_env().unwrap();
        assert_eq!(config.frontend_port, 8081);
        assert!(config.local_mode);

        env::remove_var("FRONTEND_PORT");
        env::remove_var("LOCAL_MODE");
    }
}
