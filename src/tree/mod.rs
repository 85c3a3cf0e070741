//! Plugin tree reconstruction
//!
//! Plugins are stored as flat rows pointing at their parent. A form is
//! rebuilt level by level from its root plugin, resolving alias plugins on
//! the way, and then flattened into the ordered list of its fields.

mod builder;
mod definition;

pub use builder::build_tree;
pub use definition::{FormDefinition, RESERVED_FIELD_NAMES};

use serde::{Deserialize, Serialize};

use crate::fields::{FieldConfig, FormPluginConfig, ALIAS_KIND};

pub type PluginId = u64;

/// One row of plugin storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub id: PluginId,
    #[serde(default)]
    pub parent: Option<PluginId>,
    /// Ordering among siblings
    #[serde(default)]
    pub position: u32,
    pub kind: String,
    #[serde(default)]
    pub config: FieldConfig,
    /// Settings of a form plugin
    #[serde(default)]
    pub form: Option<FormPluginConfig>,
    /// Plugin whose children an alias stands in for
    #[serde(default)]
    pub alias_of: Option<PluginId>,
}

impl PluginRecord {
    pub fn new(id: PluginId, parent: Option<PluginId>, position: u32, kind: &str) -> Self {
        Self {
            id,
            parent,
            position,
            kind: kind.to_string(),
            config: FieldConfig::default(),
            form: None,
            alias_of: None,
        }
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_form(mut self, form: FormPluginConfig) -> Self {
        self.form = Some(form);
        self
    }

    pub fn aliasing(mut self, target: PluginId) -> Self {
        self.alias_of = Some(target);
        self
    }

    pub fn is_alias(&self) -> bool {
        self.kind == ALIAS_KIND
    }

    /// The plugin whose children populate this node
    pub fn children_source(&self) -> PluginId {
        if self.is_alias() {
            self.alias_of.unwrap_or(self.id)
        } else {
            self.id
        }
    }
}

/// A plugin with its ordered children; alias nodes hold their target's children
#[derive(Debug, Clone, PartialEq)]
pub struct PluginNode {
    pub record: PluginRecord,
    pub children: Vec<PluginNode>,
}

impl PluginNode {
    pub fn leaf(record: PluginRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn is_alias(&self) -> bool {
        self.record.is_alias()
    }

    /// Pre-order descendants with every alias replaced by its subtree
    pub fn descendants(&self) -> Vec<&PluginNode> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a PluginNode>) {
        for child in &self.children {
            if !child.is_alias() {
                out.push(child);
            }
            child.collect(out);
        }
    }
}
