//! Local slot storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where slots live and how they are keyed
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Prefix of every slot key
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directory holding the slot document
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Workspace opened at startup
    #[serde(default = "default_workspace")]
    pub default_workspace: String,
}

impl StorageConfig {
    /// Path of the slot document inside `data_dir`
    pub fn slots_path(&self) -> PathBuf {
        self.data_dir.join("slots.json")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.namespace.trim().is_empty() {
            return Err(ValidationError::EmptyNamespace);
        }
        if self.default_workspace.trim().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__DEFAULT_WORKSPACE"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            data_dir: default_data_dir(),
            default_workspace: default_workspace(),
        }
    }
}

fn default_namespace() -> String {
    "revenue-desk-".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_workspace() -> String {
    "main".to_string()
}
