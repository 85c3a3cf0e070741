//! Registry of plugin kinds
//!
//! Maps the kind name stored with every plugin to its configuration schema,
//! runtime validator and serializer.

use std::collections::HashMap;

use super::{FieldConfig, FieldDescriptor, FieldKind, PluginKind, ALIAS_KIND};
use crate::error::ConfigurationError;
use crate::serialize::{self, Audience, SerializedField};
use crate::submission::validators::{self, FieldContext, RawField};
use crate::submission::CleanValue;

/// Validates the raw input of one field, returning every violated constraint
pub type ValidateFn =
    fn(&FieldDescriptor, &RawField<'_>, &FieldContext<'_>) -> Result<CleanValue, Vec<String>>;

/// Renders a clean value for one audience; `None` leaves the field out
pub type SerializeFn = fn(&FieldDescriptor, &CleanValue, Audience) -> Option<SerializedField>;

/// Attributes an editor may change on a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Name,
    Label,
    HelpText,
    PlaceholderText,
    Required,
    RequiredMessage,
    MinValue,
    MaxValue,
    InitialValue,
    AcceptedTypes,
    MaxSize,
    MaxFiles,
    MaxWidth,
    MaxHeight,
    EmailNotification,
    OptionValue,
    CustomClasses,
}

use Attribute::*;

const BASIC: &[Attribute] = &[Name, Label, HelpText, Required, RequiredMessage, CustomClasses];
const TEXT: &[Attribute] = &[
    Name,
    Label,
    PlaceholderText,
    HelpText,
    MinValue,
    MaxValue,
    Required,
    RequiredMessage,
    CustomClasses,
];
const EMAIL: &[Attribute] = &[
    Name,
    Label,
    PlaceholderText,
    HelpText,
    MinValue,
    MaxValue,
    Required,
    RequiredMessage,
    EmailNotification,
    CustomClasses,
];
const HIDDEN: &[Attribute] = &[Name, InitialValue];
const MULTIPLE_CHOICE: &[Attribute] = &[Name, Label, HelpText, MinValue, MaxValue, CustomClasses];
const FILE: &[Attribute] = &[
    Name,
    Label,
    HelpText,
    Required,
    RequiredMessage,
    CustomClasses,
    AcceptedTypes,
    MaxSize,
];
const MULTIPLE_FILES: &[Attribute] = &[
    Name,
    Label,
    HelpText,
    Required,
    RequiredMessage,
    CustomClasses,
    AcceptedTypes,
    MaxSize,
    MaxFiles,
];
const IMAGE: &[Attribute] = &[
    Name,
    Label,
    HelpText,
    Required,
    RequiredMessage,
    CustomClasses,
    AcceptedTypes,
    MaxSize,
    MaxWidth,
    MaxHeight,
];
const OPTION: &[Attribute] = &[Label, OptionValue];
const CONTAINER: &[Attribute] = &[Label, CustomClasses];
const NONE: &[Attribute] = &[];

/// Which attributes the admin form of a kind exposes
#[derive(Debug, Clone, Copy)]
pub struct ConfigSchema {
    pub attributes: &'static [Attribute],
    pub min_label: &'static str,
    pub max_label: &'static str,
}

impl ConfigSchema {
    const fn new(attributes: &'static [Attribute]) -> Self {
        Self {
            attributes,
            min_label: "Min value",
            max_label: "Max value",
        }
    }

    const fn with_bounds(mut self, min_label: &'static str, max_label: &'static str) -> Self {
        self.min_label = min_label;
        self.max_label = max_label;
        self
    }

    pub fn allows(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }

    /// Copy of `config` keeping only the attributes this schema exposes
    pub fn restrict(&self, config: &FieldConfig) -> FieldConfig {
        let mut out = FieldConfig::default();
        for attribute in self.attributes {
            match attribute {
                Name => out.name = config.name.trim().to_string(),
                Label => out.label = config.label.clone(),
                HelpText => out.help_text = config.help_text.clone(),
                PlaceholderText => out.placeholder_text = config.placeholder_text.clone(),
                Required => out.required = config.required,
                RequiredMessage => out.required_message = config.required_message.clone(),
                MinValue => out.min_value = config.min_value,
                MaxValue => out.max_value = config.max_value,
                InitialValue => out.initial_value = config.initial_value.clone(),
                AcceptedTypes => out.accepted_types = config.accepted_types.clone(),
                MaxSize => out.max_size = config.max_size,
                MaxFiles => out.max_files = config.max_files,
                MaxWidth => out.max_width = config.max_width,
                MaxHeight => out.max_height = config.max_height,
                EmailNotification => {
                    out.email_send_notification = config.email_send_notification;
                    out.email_subject = config.email_subject.clone();
                    out.email_body = config.email_body.clone();
                }
                OptionValue => {
                    out.value = config.value.clone();
                    out.default_value = config.default_value;
                }
                CustomClasses => out.custom_classes = config.custom_classes.clone(),
            }
        }
        out
    }
}

/// Registered behaviour of one plugin kind
#[derive(Debug, Clone, Copy)]
pub struct FieldPlugin {
    pub name: &'static str,
    pub kind: PluginKind,
    pub schema: ConfigSchema,
    pub validate: Option<ValidateFn>,
    pub serialize: SerializeFn,
}

impl FieldPlugin {
    fn structural(name: &'static str, kind: PluginKind, attributes: &'static [Attribute]) -> Self {
        Self {
            name,
            kind,
            schema: ConfigSchema::new(attributes),
            validate: None,
            serialize: serialize::skip,
        }
    }

    fn input(
        name: &'static str,
        kind: FieldKind,
        schema: ConfigSchema,
        validate: ValidateFn,
    ) -> Self {
        Self {
            name,
            kind: PluginKind::Field(kind),
            schema,
            validate: Some(validate),
            serialize: serialize::serialize_value,
        }
    }
}

/// Plugin kind name to behaviour
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    plugins: HashMap<&'static str, FieldPlugin>,
    fields: HashMap<FieldKind, &'static str>,
}

impl FieldRegistry {
    /// Registry with every built-in kind
    pub fn builtin() -> Self {
        let text_bounds = ConfigSchema::new(TEXT).with_bounds("Min length", "Max length");
        let choice_bounds =
            ConfigSchema::new(MULTIPLE_CHOICE).with_bounds("Min choices", "Max choices");

        let mut registry = Self::default();
        registry.register(FieldPlugin::structural("Form", PluginKind::Form, CONTAINER));
        registry.register(FieldPlugin::structural("Fieldset", PluginKind::Fieldset, CONTAINER));
        registry.register(FieldPlugin::structural(
            "SubmitButton",
            PluginKind::SubmitButton,
            CONTAINER,
        ));
        registry.register(FieldPlugin::structural("Text", PluginKind::Text, NONE));
        registry.register(FieldPlugin::structural(ALIAS_KIND, PluginKind::Alias, NONE));
        registry.register(FieldPlugin::structural(
            "SelectOption",
            PluginKind::SelectOption,
            OPTION,
        ));

        registry.register(FieldPlugin::input(
            "TextField",
            FieldKind::Text,
            text_bounds,
            validators::validate_text,
        ));
        registry.register(FieldPlugin::input(
            "TextAreaField",
            FieldKind::TextArea,
            text_bounds,
            validators::validate_text,
        ));
        registry.register(FieldPlugin::input(
            "EmailField",
            FieldKind::Email,
            ConfigSchema::new(EMAIL).with_bounds("Min length", "Max length"),
            validators::validate_email,
        ));
        registry.register(FieldPlugin::input(
            "PhoneField",
            FieldKind::Phone,
            text_bounds,
            validators::validate_text,
        ));
        registry.register(FieldPlugin::input(
            "NumberField",
            FieldKind::Number,
            ConfigSchema::new(TEXT),
            validators::validate_number,
        ));
        registry.register(FieldPlugin {
            serialize: serialize::serialize_admin_only,
            ..FieldPlugin::input(
                "HiddenField",
                FieldKind::Hidden,
                ConfigSchema::new(HIDDEN),
                validators::validate_hidden,
            )
        });
        registry.register(FieldPlugin::input(
            "BooleanField",
            FieldKind::Boolean,
            ConfigSchema::new(BASIC),
            validators::validate_boolean,
        ));
        registry.register(FieldPlugin::input(
            "SelectField",
            FieldKind::Select,
            ConfigSchema::new(BASIC),
            validators::validate_choice,
        ));
        registry.register(FieldPlugin::input(
            "RadioSelectField",
            FieldKind::RadioSelect,
            ConfigSchema::new(BASIC),
            validators::validate_choice,
        ));
        registry.register(FieldPlugin::input(
            "MultipleSelectField",
            FieldKind::MultipleSelect,
            choice_bounds,
            validators::validate_multiple_choice,
        ));
        registry.register(FieldPlugin::input(
            "MultipleCheckboxSelectField",
            FieldKind::MultipleCheckbox,
            choice_bounds,
            validators::validate_multiple_choice,
        ));
        registry.register(FieldPlugin::input(
            "FileField",
            FieldKind::File,
            ConfigSchema::new(FILE),
            validators::validate_file,
        ));
        registry.register(FieldPlugin::input(
            "MultipleFilesField",
            FieldKind::MultipleFiles,
            ConfigSchema::new(MULTIPLE_FILES),
            validators::validate_multiple_files,
        ));
        registry.register(FieldPlugin::input(
            "ImageField",
            FieldKind::Image,
            ConfigSchema::new(IMAGE),
            validators::validate_image,
        ));
        registry
    }

    /// Register a kind, replacing any previous entry with the same name
    pub fn register(&mut self, plugin: FieldPlugin) {
        if let PluginKind::Field(kind) = plugin.kind {
            self.fields.insert(kind, plugin.name);
        }
        self.plugins.insert(plugin.name, plugin);
    }

    /// Look up a kind by its stored name
    pub fn resolve(&self, name: &str) -> Result<&FieldPlugin, ConfigurationError> {
        self.plugins
            .get(name)
            .ok_or_else(|| ConfigurationError::UnregisteredKind(name.to_string()))
    }

    /// Look up the plugin registered for an input kind
    pub fn field(&self, kind: FieldKind) -> Result<&FieldPlugin, ConfigurationError> {
        self.fields
            .get(&kind)
            .and_then(|name| self.plugins.get(name))
            .ok_or_else(|| ConfigurationError::UnregisteredKind(kind.slug().to_string()))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
