//! Error taxonomy for form configuration and processing

use thiserror::Error;

use crate::tree::PluginId;

/// Fatal misconfiguration, surfaced at load or admin-save time
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unregistered plugin kind `{0}`")]
    UnregisteredKind(String),

    #[error("plugin {0} does not exist")]
    UnknownPlugin(PluginId),

    #[error("Invalid action backends. {0}")]
    InvalidBackends(String),

    #[error("action backend registry is already installed")]
    RegistryInstalled,

    #[error("invalid configuration for field `{field}`: {}", messages.join(" "))]
    InvalidField { field: String, messages: Vec<String> },

    #[error("plugin {alias} aliases plugin {target}, which is already being expanded")]
    AliasCycle { alias: PluginId, target: PluginId },

    #[error("plugin tree exceeds the maximum depth of {0}")]
    TreeTooDeep(usize),

    #[error("field name `{0}` is used more than once")]
    DuplicateFieldName(String),

    #[error("field name `{0}` is reserved")]
    ReservedFieldName(String),
}

/// Any failure of the form pipeline that is not a user-facing validation error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("storage failure: {0:#}")]
    Storage(#[source] anyhow::Error),

    #[error("notification failure: {0:#}")]
    Delivery(#[source] anyhow::Error),

    #[error("failed to encode submission data: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
