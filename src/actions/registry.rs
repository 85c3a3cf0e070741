//! Startup-time resolution of action backend references

use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, HashMap};

use super::{ActionBackend, DefaultAction, EmailAction, NoAction};
use crate::error::ConfigurationError;

/// Longest backend key a form may store
pub const MAX_KEY_LENGTH: usize = 15;

static INSTALLED: OnceCell<ActionRegistry> = OnceCell::new();

/// Zero-argument constructor of a backend
pub type BackendFactory = fn() -> Box<dyn ActionBackend>;

pub fn construct<T: ActionBackend + Default + 'static>() -> Box<dyn ActionBackend> {
    Box::new(T::default())
}

/// Handler references that configuration may name
#[derive(Debug, Clone, Default)]
pub struct BackendCatalog {
    factories: HashMap<String, BackendFactory>,
}

impl BackendCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        catalog.register("cms_forms::actions::DefaultAction", construct::<DefaultAction>);
        catalog.register("cms_forms::actions::EmailAction", construct::<EmailAction>);
        catalog.register("cms_forms::actions::NoAction", construct::<NoAction>);
        catalog
    }

    pub fn register(&mut self, reference: &str, factory: BackendFactory) {
        self.factories.insert(reference.to_string(), factory);
    }

    fn get(&self, reference: &str) -> Option<BackendFactory> {
        self.factories.get(reference).copied()
    }
}

/// Backend key to constructed backend; read-only once loaded
pub struct ActionRegistry {
    backends: BTreeMap<String, Box<dyn ActionBackend>>,
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionRegistry {
    /// Resolve `mapping` against the built-in backends
    pub fn load(mapping: &BTreeMap<String, String>) -> Result<Self, ConfigurationError> {
        Self::load_from(mapping, &BackendCatalog::builtin())
    }

    pub fn load_from(
        mapping: &BTreeMap<String, String>,
        catalog: &BackendCatalog,
    ) -> Result<Self, ConfigurationError> {
        let mut backends = BTreeMap::new();
        for (key, reference) in mapping {
            let factory = catalog.get(reference).ok_or_else(|| {
                ConfigurationError::InvalidBackends(format!(
                    "No backend is registered as \"{reference}\"."
                ))
            })?;
            backends.insert(key.clone(), factory());
        }

        if backends.keys().any(|key| key.chars().count() > MAX_KEY_LENGTH) {
            return Err(ConfigurationError::InvalidBackends(format!(
                "Ensure all keys are no longer than {MAX_KEY_LENGTH} characters."
            )));
        }
        if !backends.contains_key("default") {
            return Err(ConfigurationError::InvalidBackends(
                "Key \"default\" is missing.".to_string(),
            ));
        }

        tracing::debug!("Loaded {} action backends", backends.len());
        Ok(Self { backends })
    }

    pub fn get(&self, key: &str) -> Option<&dyn ActionBackend> {
        self.backends.get(key).map(|backend| backend.as_ref())
    }

    /// Backend for `key`, falling back to the default backend
    pub fn resolve(&self, key: &str) -> &dyn ActionBackend {
        match self.get(key) {
            Some(backend) => backend,
            None => {
                tracing::warn!("Unknown action backend {key}, using default");
                self.backends["default"].as_ref()
            }
        }
    }

    /// `(key, verbose name)` pairs sorted by verbose name
    pub fn choices(&self) -> Vec<(&str, &'static str)> {
        let mut choices: Vec<_> = self
            .backends
            .iter()
            .map(|(key, backend)| (key.as_str(), backend.verbose_name()))
            .collect();
        choices.sort_by(|a, b| a.1.cmp(b.1));
        choices
    }

    /// Make this registry the process-wide one
    pub fn install(self) -> Result<&'static ActionRegistry, ConfigurationError> {
        INSTALLED
            .set(self)
            .map_err(|_| ConfigurationError::RegistryInstalled)?;
        INSTALLED.get().ok_or(ConfigurationError::RegistryInstalled)
    }

    pub fn global() -> Option<&'static ActionRegistry> {
        INSTALLED.get()
    }
}
