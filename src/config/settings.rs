use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Synthesize placeholder entities when the backend cannot be reached.
    /// Routes asking for one get a 500 instead when this is off.
    pub mock_entities: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            mock_entities: true,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::info!("No config file found, using defaults");
                Settings::default()
            }
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    // Environment wins over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get("BACKEND_API_URL") {
            self.backend.base_url = url;
        }
        if let Some(secs) = get("BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = secs
                .parse()
                .map_err(|_| format!("BACKEND_TIMEOUT_SECS is not a number: {}", secs))?;
        }
        if let Some(host) = get("GATEWAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("GATEWAY_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| format!("GATEWAY_PORT is not a valid port: {}", port))?;
        }
        if let Some(flag) = get("GATEWAY_MOCK_FALLBACK") {
            self.fallback.mock_entities = matches!(flag.as_str(), "1" | "true" | "TRUE" | "yes" | "YES");
        }
        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_names = ["custom-config.toml", "config.toml"];

        possible_names
            .iter()
            .find(|name| Path::new(name).exists())
            .map(|name| name.to_string())
    }
}
