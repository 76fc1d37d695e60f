//! Persisted application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BriefError, Result};

/// The two credentials the pipeline needs: the OAuth client id for the mail
/// provider and the API key for the generation service. Persisted as a single
/// JSON entry under the user's config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub google_client_id: String,
    pub gemini_api_key: String,
}

impl AppConfig {
    pub fn new(google_client_id: impl Into<String>, gemini_api_key: impl Into<String>) -> Self {
        Self {
            google_client_id: google_client_id.into(),
            gemini_api_key: gemini_api_key.into(),
        }
    }

    /// Default user-scoped location of the config entry.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ai-brief")
            .join("config.json")
    }

    /// Reject configs that would only fail later inside the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.google_client_id.trim().is_empty() {
            return Err(BriefError::Config(
                "googleClientId cannot be empty".to_string(),
            ));
        }
        if self.gemini_api_key.trim().is_empty() {
            return Err(BriefError::Config(
                "geminiApiKey cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load the saved configuration. A missing file means the app has not
    /// been configured yet, which is a state rather than an error.
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let config: Self = serde_json::from_str(&content).map_err(|e| {
                    BriefError::Config(format!("Failed to parse config file: {}", e))
                })?;
                config.validate()?;
                tracing::info!("Loaded configuration from {:?}", path);
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Save the configuration, creating the parent directory if needed.
    pub async fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Remove the saved configuration; used when entering demo mode. A
    /// missing file is fine.
    pub async fn clear(path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::info!("Cleared configuration at {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
