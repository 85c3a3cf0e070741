//! Configuration handling for the form pipeline

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the config file location
const CONFIG_ENV: &str = "CMS_FORMS_CONFIG";

/// Default maximum depth of a plugin tree
pub const DEFAULT_MAX_TREE_DEPTH: usize = 32;

/// Languages accepted when none are configured
const DEFAULT_LANGUAGES: &[&str] = &["en"];

/// User configuration for the form pipeline
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormsConfig {
    /// Action backend key to handler reference
    pub action_backends: Option<BTreeMap<String, String>>,
    /// Language codes a submission may carry
    pub languages: Option<Vec<String>>,
    /// Maximum plugin tree depth before loading is refused
    pub max_tree_depth: Option<usize>,
}

impl FormsConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("io", "cms-forms", "cms-forms")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: FormsConfig = serde_json::from_str(&content)?;
                tracing::debug!("Loaded configuration from {}", path.display());
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Configured backends, or the built-in mapping
    pub fn action_backends(&self) -> BTreeMap<String, String> {
        self.action_backends
            .clone()
            .unwrap_or_else(crate::actions::default_backend_mapping)
    }

    pub fn languages(&self) -> Vec<String> {
        match &self.languages {
            Some(languages) if !languages.is_empty() => languages.clone(),
            _ => DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn max_tree_depth(&self) -> usize {
        self.max_tree_depth.unwrap_or(DEFAULT_MAX_TREE_DEPTH)
    }
}
