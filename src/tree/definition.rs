//! A loaded form: settings of the root plugin plus its ordered fields

use std::collections::{HashMap, HashSet};

use super::{build_tree, PluginId, PluginNode};
use crate::actions::ActionRegistry;
use crate::error::{ConfigurationError, Result};
use crate::fields::{
    validate_field_config, validate_form_config, AcceptedTypes, Choice, EmailNotification,
    FieldDescriptor, FieldKind, FieldRegistry, FormPluginConfig, PluginKind,
};
use crate::storage::PluginStore;

/// Input names the submission form uses for its own hidden fields
pub const RESERVED_FIELD_NAMES: &[&str] = &["language", "form_plugin_id"];

#[derive(Debug, Clone)]
pub struct FormDefinition {
    pub plugin_id: PluginId,
    pub settings: FormPluginConfig,
    pub fields: Vec<FieldDescriptor>,
    pub tree: PluginNode,
}

impl FormDefinition {
    /// Rebuild the tree of `root` from storage and validate its configuration
    pub async fn load(
        store: &dyn PluginStore,
        registry: &FieldRegistry,
        backends: &ActionRegistry,
        root: PluginId,
        max_depth: usize,
    ) -> Result<Self> {
        let tree = build_tree(store, root, max_depth).await?;
        let definition = Self::from_tree(tree, registry, backends)?;
        tracing::debug!(
            "Loaded form {} with {} fields",
            definition.plugin_id,
            definition.fields.len()
        );
        Ok(definition)
    }

    pub fn from_tree(
        tree: PluginNode,
        registry: &FieldRegistry,
        backends: &ActionRegistry,
    ) -> std::result::Result<Self, ConfigurationError> {
        let root = registry.resolve(&tree.record.kind)?;
        if root.kind != PluginKind::Form {
            return Err(ConfigurationError::InvalidField {
                field: tree.record.kind.clone(),
                messages: vec![format!("Plugin {} is not a form.", tree.record.id)],
            });
        }

        let settings = tree.record.form.clone().unwrap_or_default();
        let settings =
            validate_form_config(&settings, backends).map_err(|errors| {
                ConfigurationError::InvalidField {
                    field: "form".to_string(),
                    messages: errors.messages(),
                }
            })?;
        let backend = backends.get(&settings.action_backend);

        let mut fields = Vec::new();
        let mut occurrences: HashMap<FieldKind, usize> = HashMap::new();
        let mut names = HashSet::new();

        for node in tree.descendants() {
            let plugin = registry.resolve(&node.record.kind)?;
            let PluginKind::Field(kind) = plugin.kind else {
                continue;
            };

            let occurrence = occurrences.entry(kind).or_default();
            *occurrence += 1;
            let name = if node.record.config.name.trim().is_empty() {
                format!("{}_{}", kind.slug(), occurrence)
            } else {
                node.record.config.name.trim().to_string()
            };

            let config = validate_field_config(plugin, &node.record.config, backend).map_err(
                |errors| ConfigurationError::InvalidField {
                    field: name.clone(),
                    messages: errors.messages(),
                },
            )?;

            if RESERVED_FIELD_NAMES.contains(&name.as_str()) {
                return Err(ConfigurationError::ReservedFieldName(name));
            }
            if !names.insert(name.clone()) {
                return Err(ConfigurationError::DuplicateFieldName(name));
            }

            let choices = if kind.has_choices() {
                collect_choices(node, registry)?
            } else {
                Vec::new()
            };
            let accepted_types = match config.accepted_types.as_deref() {
                Some(types) => AcceptedTypes::parse(types).unwrap_or_default(),
                None => AcceptedTypes::default(),
            };
            let required = if kind.is_multiple_choice() {
                node.record.config.required || config.min_value.is_some_and(|min| min >= 1)
            } else {
                config.required
            };
            let notification = config.email_send_notification.then(|| EmailNotification {
                subject: config.email_subject.clone(),
                body: config.email_body.clone(),
            });

            fields.push(FieldDescriptor {
                plugin_id: node.record.id,
                kind,
                label: if config.label.trim().is_empty() {
                    name.clone()
                } else {
                    config.label.clone()
                },
                name,
                required,
                required_message: config.required_message,
                min_value: config.min_value,
                max_value: config.max_value,
                accepted_types,
                max_size: config.max_size,
                max_files: config.max_files,
                max_width: config.max_width,
                max_height: config.max_height,
                choices,
                initial_value: config.initial_value,
                notification,
                position: fields.len(),
            });
        }

        Ok(Self {
            plugin_id: tree.record.id,
            settings,
            fields,
            tree,
        })
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn collect_choices(
    node: &PluginNode,
    registry: &FieldRegistry,
) -> std::result::Result<Vec<Choice>, ConfigurationError> {
    let mut choices = Vec::new();
    for option in node.descendants() {
        if registry.resolve(&option.record.kind)?.kind != PluginKind::SelectOption {
            continue;
        }
        let config = &option.record.config;
        let value = if config.value.is_empty() {
            config.label.clone()
        } else {
            config.value.clone()
        };
        choices.push(Choice {
            label: if config.label.is_empty() {
                value.clone()
            } else {
                config.label.clone()
            },
            value,
            selected: config.default_value,
        });
    }
    Ok(choices)
}
