use super::canvas::CanvasConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client_name: String,
    pub canvas: CanvasConfig,
    pub notification_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_name: "knobsketch".to_string(),
            canvas: CanvasConfig::default(),
            notification_capacity: 32,
        }
    }
}

impl AppConfig {
    pub const CONFIG_FILE_NAME: &'static str = "knobsketch_config.json";

    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("App config saved to {}", path.display());
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str(&json) {
                    Ok(config) => {
                        log::info!("App config loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => log::error!("Failed to parse app config file: {}", e),
                },
                Err(e) => log::error!("Failed to read app config file: {}", e),
            }
        } else {
            log::info!("No app config file found, using defaults");
        }
        Self::default()
    }
}
