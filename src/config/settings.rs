//! Configuration settings for ClipNest.
//!
//! Secrets never live in the config file: `OPENAI_API_KEY`, `SUPABASE_URL`
//! and `SUPABASE_SERVICE_ROLE_KEY` come from the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
    pub completion: CompletionSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions. Must match the stored vectors.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Similarity search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Name of the stored similarity-search procedure.
    pub rpc_function: String,
    /// Number of matches to request per turn.
    pub match_count: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            rpc_function: "match_clipnest_embeddings".to_string(),
            match_count: 4,
        }
    }
}

/// Streaming completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Model for answer generation.
    pub model: String,
    /// API base URL.
    pub base_url: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Relay server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClipnestError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipnest")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
        assert_eq!(settings.embedding.dimensions, 1536);
        assert_eq!(settings.search.rpc_function, "match_clipnest_embeddings");
        assert_eq!(settings.search.match_count, 4);
        assert_eq!(settings.completion.model, "gpt-4o");
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let path = PathBuf::from("/nonexistent/clipnest/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.search.match_count, 4);
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() {
        let settings: Settings = toml::from_str("[completion]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        assert_eq!(settings.completion.model, "gpt-4o-mini");
        assert_eq!(settings.completion.base_url, "https://api.openai.com/v1");
        assert_eq!(settings.search.match_count, 4);
    }
}
