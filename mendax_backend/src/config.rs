use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    // LLM configuration (OpenAI-compatible: Ollama, LM Studio, vLLM, OpenAI, etc.)
    #[serde(default = "default_llm_url")]
    pub llm_api_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default)]
    pub llm_api_key: Option<String>,

    // State persistence
    #[serde(default = "default_database_path")]
    pub database_path: String,

    // Startup selections
    #[serde(default = "default_persona_id")]
    pub default_persona: String,
    #[serde(default = "default_level_id")]
    pub default_level: String,

    // Shown in place of an oracle reply when the request fails
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

fn default_llm_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_database_path() -> String {
    "mendax_state.db".to_string()
}

fn default_persona_id() -> String {
    "normal".to_string()
}

fn default_level_id() -> String {
    "bold".to_string()
}

fn default_fallback_text() -> String {
    "The Oracle's connection is unstable... Please try again.".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            llm_api_url: default_llm_url(),
            llm_model: default_llm_model(),
            llm_api_key: None,
            database_path: default_database_path(),
            default_persona: default_persona_id(),
            default_level: default_level_id(),
            fallback_text: default_fallback_text(),
        }
    }
}

impl OracleConfig {
    /// Get the directory containing the executable
    fn get_base_dir() -> PathBuf {
        match std::env::current_exe() {
            Ok(exe_path) => exe_path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")),
            Err(_) => PathBuf::from("."),
        }
    }

    /// Get the path to the config file (relative to executable)
    pub fn config_path() -> PathBuf {
        Self::get_base_dir().join("mendax_config.toml")
    }

    /// Resolve the state database path; relative paths land next to the
    /// executable, like the config file itself.
    pub fn resolved_database_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.database_path);
        if path.is_absolute() {
            path
        } else {
            Self::get_base_dir().join(path)
        }
    }

    /// Load config from mendax_config.toml next to the executable, falling
    /// back to defaults plus environment variables.
    pub fn load() -> Self {
        let path = Self::config_path();

        if let Ok(contents) = fs::read_to_string(&path) {
            match toml::from_str::<OracleConfig>(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {:?}", path);
                    return config;
                }
                Err(e) => {
                    tracing::error!("Failed to parse {:?}: {}", path, e);
                }
            }
        }

        tracing::warn!("No config file found, using defaults + env vars");
        Self::from_env()
    }

    /// Save config to file (next to executable)
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("MENDAX_LLM_API_URL") {
            config.llm_api_url = url;
        }

        if let Ok(model) = env::var("MENDAX_LLM_MODEL") {
            config.llm_model = model;
        }

        if let Ok(key) = env::var("MENDAX_LLM_API_KEY") {
            config.llm_api_key = Some(key);
        }

        if let Ok(path) = env::var("MENDAX_DATABASE_PATH") {
            if !path.trim().is_empty() {
                config.database_path = path;
            }
        }

        if let Ok(id) = env::var("MENDAX_DEFAULT_PERSONA") {
            if !id.trim().is_empty() {
                config.default_persona = id;
            }
        }

        if let Ok(id) = env::var("MENDAX_DEFAULT_LEVEL") {
            if !id.trim().is_empty() {
                config.default_level = id;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: OracleConfig =
            toml::from_str("llm_model = \"qwen2.5\"").expect("parse partial config");
        assert_eq!(config.llm_model, "qwen2.5");
        assert_eq!(config.llm_api_url, default_llm_url());
        assert_eq!(config.default_level, "bold");
        assert_eq!(
            config.fallback_text,
            "The Oracle's connection is unstable... Please try again."
        );
    }

    #[test]
    fn save_to_writes_a_loadable_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mendax_config.toml");
        let mut config = OracleConfig::default();
        config.llm_model = "mistral".into();
        config.save_to(&path).expect("save");
        let raw = std::fs::read_to_string(&path).expect("read back");
        let back: OracleConfig = toml::from_str(&raw).expect("parse");
        assert_eq!(back.llm_model, "mistral");
        assert_eq!(back.llm_api_url, default_llm_url());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = OracleConfig::default();
        config.llm_api_key = Some("secret".into());
        config.default_persona = "jaded_dragon".into();
        let raw = toml::to_string_pretty(&config).expect("serialize");
        let back: OracleConfig = toml::from_str(&raw).expect("parse");
        assert_eq!(back.llm_api_key.as_deref(), Some("secret"));
        assert_eq!(back.default_persona, "jaded_dragon");
    }
}
