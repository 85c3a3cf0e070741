//! Field plugin domain layer
//!
//! Plugin kinds, the admin-editable configuration stored with every plugin,
//! and the read-only field descriptors handed to the submission form.

mod accepted_types;
mod config;
pub mod filesize;
mod registry;

pub use accepted_types::AcceptedTypes;
pub use config::{validate_field_config, validate_form_config, ConfigErrors};
pub use registry::{Attribute, ConfigSchema, FieldPlugin, FieldRegistry, SerializeFn, ValidateFn};

use serde::{Deserialize, Serialize};

use crate::tree::PluginId;

/// Kind name of alias plugins in storage
pub const ALIAS_KIND: &str = "Alias";

/// Input field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Phone,
    Number,
    Hidden,
    Boolean,
    Select,
    RadioSelect,
    MultipleSelect,
    MultipleCheckbox,
    File,
    MultipleFiles,
    Image,
}

impl FieldKind {
    /// Prefix of generated field names
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Text => "textfield",
            Self::TextArea => "textareafield",
            Self::Email => "emailfield",
            Self::Phone => "phonefield",
            Self::Number => "numberfield",
            Self::Hidden => "hiddenfield",
            Self::Boolean => "booleanfield",
            Self::Select => "selectfield",
            Self::RadioSelect => "radioselectfield",
            Self::MultipleSelect => "multipleselectfield",
            Self::MultipleCheckbox => "multiplecheckboxselectfield",
            Self::File => "filefield",
            Self::MultipleFiles => "multiplefilesfield",
            Self::Image => "imagefield",
        }
    }

    pub fn is_multiple_choice(&self) -> bool {
        matches!(self, Self::MultipleSelect | Self::MultipleCheckbox)
    }

    pub fn has_choices(&self) -> bool {
        matches!(self, Self::Select | Self::RadioSelect) || self.is_multiple_choice()
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, Self::File | Self::MultipleFiles | Self::Image)
    }
}

/// Every kind of plugin that may appear in a form tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Form,
    Fieldset,
    SubmitButton,
    Text,
    Alias,
    SelectOption,
    Field(FieldKind),
}

impl PluginKind {
    pub fn is_field(&self) -> bool {
        matches!(self, Self::Field(_))
    }
}

/// Admin-editable attributes of a plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub name: String,
    pub label: String,
    pub help_text: Option<String>,
    pub placeholder_text: String,
    pub required: bool,
    pub required_message: Option<String>,
    pub min_value: Option<u64>,
    pub max_value: Option<u64>,
    pub initial_value: String,
    pub accepted_types: Option<String>,
    #[serde(with = "filesize::serde_opt")]
    pub max_size: Option<u64>,
    pub max_files: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub email_send_notification: bool,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    /// Submitted value of a select option
    pub value: String,
    /// Whether a select option is preselected
    pub default_value: bool,
    pub custom_classes: String,
}

/// Where the visitor goes after a successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectType {
    RedirectToPage,
    RedirectToUrl,
}

/// Settings of the form plugin at the root of a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormPluginConfig {
    pub name: String,
    pub action_backend: String,
    pub redirect_type: Option<RedirectType>,
    pub redirect_page: Option<String>,
    pub url: Option<String>,
    /// Addresses notified about every submission
    pub recipients: Vec<String>,
}

impl Default for FormPluginConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            action_backend: "default".to_string(),
            redirect_type: None,
            redirect_page: None,
            url: None,
            recipients: Vec::new(),
        }
    }
}

impl FormPluginConfig {
    pub fn redirect_target(&self) -> Option<&str> {
        match self.redirect_type? {
            RedirectType::RedirectToPage => self.redirect_page.as_deref(),
            RedirectType::RedirectToUrl => self.url.as_deref(),
        }
    }
}

/// One selectable value of a choice field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Confirmation mail sent to the address entered in an e-mail field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailNotification {
    pub subject: Option<String>,
    pub body: Option<String>,
}

/// Read-only snapshot of one configured input field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub plugin_id: PluginId,
    pub kind: FieldKind,
    pub name: String,
    pub label: String,
    pub required: bool,
    pub required_message: Option<String>,
    pub min_value: Option<u64>,
    pub max_value: Option<u64>,
    pub accepted_types: AcceptedTypes,
    pub max_size: Option<u64>,
    pub max_files: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub choices: Vec<Choice>,
    pub initial_value: String,
    pub notification: Option<EmailNotification>,
    /// Index in the flattened tree
    pub position: usize,
}

impl FieldDescriptor {
    /// Descriptor with no constraints, used as a starting point
    pub fn new(plugin_id: PluginId, kind: FieldKind, name: &str) -> Self {
        Self {
            plugin_id,
            kind,
            name: name.to_string(),
            label: name.to_string(),
            required: false,
            required_message: None,
            min_value: None,
            max_value: None,
            accepted_types: AcceptedTypes::default(),
            max_size: None,
            max_files: None,
            max_width: None,
            max_height: None,
            choices: Vec::new(),
            initial_value: String::new(),
            notification: None,
            position: 0,
        }
    }

    pub fn required_message(&self) -> &str {
        match self.required_message.as_deref() {
            Some(message) if !message.trim().is_empty() => message,
            _ => "This field is required.",
        }
    }

    /// Label of the choice with the given value, falling back to the value
    pub fn choice_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.choices
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.label.as_str())
            .unwrap_or(value)
    }
}
