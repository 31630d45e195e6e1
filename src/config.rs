use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseConfig,
    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DatabaseConfig {
    path: String,
    csv_dir: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "test_db.sqlite".to_string(),
            csv_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ApiConfig {
    url: String,
    model: String,
    timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "phi3:mini".to_string(),
            timeout: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct StorageConfig {
    history_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_file: "chat_history.json".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub csv_dir: Option<PathBuf>,
    pub api_url: String,
    pub api_model: String,
    pub api_timeout: u64,
    pub history_path: PathBuf,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config_file: ConfigFile =
            toml::from_str(&content).context("Failed to parse config file")?;

        Ok(Self::from_config_file(config_file))
    }

    /// Reads `config.toml` from the working directory. A missing file is not
    /// an error, the defaults target a local Ollama and a database in the
    /// working directory; a malformed file is fatal.
    pub fn load() -> Result<Self> {
        if std::path::Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else {
            Ok(Self::from_config_file(ConfigFile::default()))
        }
    }

    fn from_config_file(config_file: ConfigFile) -> Self {
        Self {
            db_path: config_file.database.path.into(),
            csv_dir: config_file.database.csv_dir.map(PathBuf::from),
            api_url: config_file.api.url,
            api_model: config_file.api.model,
            api_timeout: config_file.api.timeout,
            history_path: config_file.storage.history_file.into(),
        }
    }
}
