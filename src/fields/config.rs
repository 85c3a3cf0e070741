//! Configuration-time checks run when an editor saves a plugin

use indexmap::IndexMap;

use super::registry::{Attribute, FieldPlugin};
use super::{AcceptedTypes, FieldConfig, FieldKind, FormPluginConfig, PluginKind, RedirectType};
use crate::actions::{ActionBackend, ActionRegistry};

/// Messages keyed by the attribute they concern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigErrors {
    errors: IndexMap<String, Vec<String>>,
}

impl ConfigErrors {
    pub fn add(&mut self, attribute: &str, message: impl Into<String>) {
        self.errors
            .entry(attribute.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.errors.get(attribute).map(Vec::as_slice)
    }

    /// All messages in the order they were added
    pub fn messages(&self) -> Vec<String> {
        self.errors.values().flatten().cloned().collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, ConfigErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Validate the attributes of a field plugin, returning the cleaned configuration
pub fn validate_field_config(
    plugin: &FieldPlugin,
    config: &FieldConfig,
    backend: Option<&dyn ActionBackend>,
) -> Result<FieldConfig, ConfigErrors> {
    let schema = plugin.schema;
    let cleaned = schema.restrict(config);
    let mut errors = ConfigErrors::default();

    if let (Some(min), Some(max)) = (cleaned.min_value, cleaned.max_value) {
        if min > max {
            errors.add("min_value", "Min value can not be greater than max value.");
        }
    }

    if let PluginKind::Field(kind) = plugin.kind {
        let min_below_one = cleaned.min_value.is_some_and(|min| min < 1);
        if kind.is_multiple_choice() && config.required && min_below_one {
            errors.add(
                "min_value",
                format!(
                    "If checkbox \"Field is required\" is set, \"{}\" must be at least 1.",
                    schema.min_label
                ),
            );
        }

        if kind == FieldKind::Hidden && cleaned.name.is_empty() {
            errors.add("name", "Hidden fields need a name.");
        }

        if kind == FieldKind::Email {
            if let Some(message) = backend.and_then(|b| b.clean_field(&cleaned)) {
                errors.add("name", message);
            }
        }
    }

    if schema.allows(Attribute::AcceptedTypes) {
        if let Some(types) = cleaned.accepted_types.as_deref() {
            if let Err(invalid) = AcceptedTypes::parse(types) {
                errors.add(
                    "accepted_types",
                    format!("Invalid accepted types: {}.", invalid.join(", ")),
                );
            }
        }
    }

    errors.into_result(cleaned)
}

/// Validate the settings of the form plugin itself
pub fn validate_form_config(
    config: &FormPluginConfig,
    backends: &ActionRegistry,
) -> Result<FormPluginConfig, ConfigErrors> {
    let mut cleaned = config.clone();
    let mut errors = ConfigErrors::default();

    match cleaned.redirect_type {
        Some(RedirectType::RedirectToPage) => {
            if cleaned.redirect_page.as_deref().map_or(true, str::is_empty) {
                errors.add("redirect_page", "Please provide CMS page for redirect.");
            }
            cleaned.url = None;
        }
        Some(RedirectType::RedirectToUrl) => {
            if cleaned.url.as_deref().map_or(true, str::is_empty) {
                errors.add("url", "Please provide an absolute URL for redirect.");
            }
            cleaned.redirect_page = None;
        }
        None => {
            cleaned.url = None;
            cleaned.redirect_page = None;
        }
    }

    match backends.get(&cleaned.action_backend) {
        Some(backend) => {
            if let Some(message) = backend.clean_form(&cleaned) {
                errors.add("action_backend", message);
            }
        }
        None => errors.add(
            "action_backend",
            format!(
                "Select a valid choice. {} is not one of the available choices.",
                cleaned.action_backend
            ),
        ),
    }

    errors.into_result(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionContext, BackendCatalog};
    use crate::fields::FieldRegistry;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    fn plugin(name: &str) -> FieldPlugin {
        *FieldRegistry::builtin().resolve(name).unwrap()
    }

    mod field_config {
        use super::*;

        #[test]
        fn test_min_greater_than_max_is_rejected() {
            let config = FieldConfig {
                min_value: Some(10),
                max_value: Some(5),
                ..Default::default()
            };
            let errors = validate_field_config(&plugin("TextField"), &config, None).unwrap_err();
            assert_eq!(
                errors.get("min_value").unwrap(),
                ["Min value can not be greater than max value."]
            );
        }

        #[test]
        fn test_min_equal_to_max_is_accepted() {
            let config = FieldConfig {
                min_value: Some(5),
                max_value: Some(5),
                ..Default::default()
            };
            assert!(validate_field_config(&plugin("TextField"), &config, None).is_ok());
        }

        #[test]
        fn test_required_multiple_choice_needs_min_of_one() {
            let config = FieldConfig {
                required: true,
                min_value: Some(0),
                ..Default::default()
            };
            let errors =
                validate_field_config(&plugin("MultipleSelectField"), &config, None).unwrap_err();
            assert_eq!(
                errors.messages(),
                vec![
                    "If checkbox \"Field is required\" is set, \"Min choices\" must be at least 1."
                ]
            );
        }

        #[test]
        fn test_bounds_ignored_for_kinds_without_them() {
            let config = FieldConfig {
                min_value: Some(10),
                max_value: Some(1),
                ..Default::default()
            };
            let cleaned = validate_field_config(&plugin("BooleanField"), &config, None).unwrap();
            assert_eq!(cleaned.min_value, None);
        }

        #[test]
        fn test_invalid_accepted_types_are_named() {
            let config = FieldConfig {
                accepted_types: Some(".pdf pdf".to_string()),
                ..Default::default()
            };
            let errors = validate_field_config(&plugin("FileField"), &config, None).unwrap_err();
            assert_eq!(
                errors.get("accepted_types").unwrap(),
                ["Invalid accepted types: pdf."]
            );
        }

        #[test]
        fn test_hidden_field_needs_name() {
            let errors =
                validate_field_config(&plugin("HiddenField"), &FieldConfig::default(), None)
                    .unwrap_err();
            assert_eq!(errors.get("name").unwrap(), ["Hidden fields need a name."]);
        }

        #[test]
        fn test_backend_clean_field_hook_attaches_to_name() {
            #[derive(Default)]
            struct Picky;

            #[async_trait]
            impl ActionBackend for Picky {
                fn verbose_name(&self) -> &'static str {
                    "Picky"
                }

                fn clean_field(&self, config: &FieldConfig) -> Option<String> {
                    (config.name != "email").then(|| "Name the field \"email\".".to_string())
                }

                async fn form_valid(&self, _ctx: &ActionContext<'_>) -> crate::error::Result<()> {
                    Ok(())
                }
            }

            let config = FieldConfig {
                name: "contact".to_string(),
                ..Default::default()
            };
            let backend: &dyn ActionBackend = &Picky;
            let errors = validate_field_config(&plugin("EmailField"), &config, Some(backend))
                .unwrap_err();
            assert_eq!(errors.get("name").unwrap(), ["Name the field \"email\"."]);
        }
    }

    mod form_config {
        use super::*;

        fn backends() -> ActionRegistry {
            let mut mapping = BTreeMap::new();
            mapping.insert(
                "default".to_string(),
                "cms_forms::actions::DefaultAction".to_string(),
            );
            ActionRegistry::load_from(&mapping, &BackendCatalog::builtin()).unwrap()
        }

        #[test]
        fn test_redirect_to_page_requires_page() {
            let config = FormPluginConfig {
                redirect_type: Some(RedirectType::RedirectToPage),
                url: Some("https://example.com".to_string()),
                ..Default::default()
            };
            let errors = validate_form_config(&config, &backends()).unwrap_err();
            assert_eq!(
                errors.get("redirect_page").unwrap(),
                ["Please provide CMS page for redirect."]
            );
        }

        #[test]
        fn test_redirect_to_url_clears_page() {
            let config = FormPluginConfig {
                redirect_type: Some(RedirectType::RedirectToUrl),
                url: Some("https://example.com".to_string()),
                redirect_page: Some("/thanks/".to_string()),
                ..Default::default()
            };
            let cleaned = validate_form_config(&config, &backends()).unwrap();
            assert_eq!(cleaned.redirect_page, None);
            assert_eq!(cleaned.redirect_target(), Some("https://example.com"));
        }

        #[test]
        fn test_no_redirect_clears_both_targets() {
            let config = FormPluginConfig {
                url: Some("https://example.com".to_string()),
                redirect_page: Some("/thanks/".to_string()),
                ..Default::default()
            };
            let cleaned = validate_form_config(&config, &backends()).unwrap();
            assert_eq!(cleaned.url, None);
            assert_eq!(cleaned.redirect_page, None);
        }

        #[test]
        fn test_unknown_backend_is_rejected() {
            let config = FormPluginConfig {
                action_backend: "fax".to_string(),
                ..Default::default()
            };
            let errors = validate_form_config(&config, &backends()).unwrap_err();
            assert_eq!(
                errors.get("action_backend").unwrap(),
                ["Select a valid choice. fax is not one of the available choices."]
            );
        }
    }
}
