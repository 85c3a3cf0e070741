//! Per-request submission form built from a loaded form definition

use indexmap::IndexMap;
use serde::Serialize;

use super::validators::{FieldContext, RawField};
use super::{CleanValue, SubmissionData};
use crate::error::ConfigurationError;
use crate::fields::{FieldDescriptor, FieldRegistry, SerializeFn, ValidateFn};
use crate::storage::ImageInspector;
use crate::tree::FormDefinition;

const REQUIRED: &str = "This field is required.";

/// Validation messages of a rejected submission
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormErrors {
    pub fields: IndexMap<String, Vec<String>>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    /// Attach `message` to `field`, or to the whole form when `field` is `None`
    pub fn add(&mut self, field: Option<&str>, message: impl Into<String>) {
        match field {
            Some(field) => self
                .fields
                .entry(field.to_string())
                .or_default()
                .push(message.into()),
            None => self.non_field.push(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }
}

struct Input<'a> {
    field: &'a FieldDescriptor,
    validate: ValidateFn,
    serialize: SerializeFn,
}

/// Validators of every field of one form, in tree order
pub struct SubmissionForm<'a> {
    definition: &'a FormDefinition,
    inputs: Vec<Input<'a>>,
}

impl<'a> SubmissionForm<'a> {
    pub fn assemble(
        definition: &'a FormDefinition,
        registry: &FieldRegistry,
    ) -> Result<Self, ConfigurationError> {
        let mut inputs = Vec::with_capacity(definition.fields.len());
        for field in &definition.fields {
            let plugin = registry.field(field.kind)?;
            let validate = plugin
                .validate
                .ok_or_else(|| ConfigurationError::UnregisteredKind(plugin.name.to_string()))?;
            inputs.push(Input {
                field,
                validate,
                serialize: plugin.serialize,
            });
        }
        Ok(Self { definition, inputs })
    }

    pub fn definition(&self) -> &'a FormDefinition {
        self.definition
    }

    /// Run every validator once, collecting all messages before failing
    pub fn validate(
        &self,
        data: &SubmissionData,
        languages: &[String],
        images: &dyn ImageInspector,
    ) -> Result<ValidatedForm<'a>, FormErrors> {
        let mut errors = FormErrors::default();
        let language = self.check_language(data, languages, &mut errors);
        self.check_plugin_id(data, &mut errors);

        let ctx = FieldContext { images };
        let mut values = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let name = input.field.name.as_str();
            let raw = RawField::new(data.values(name), data.files(name));
            match (input.validate)(input.field, &raw, &ctx) {
                Ok(value) => values.push(value),
                Err(messages) => errors.add(Some(name), messages.join(" ")),
            }
        }

        if !errors.is_empty() {
            tracing::debug!(
                "Submission of form {} rejected with {} field errors",
                self.definition.plugin_id,
                errors.fields.len()
            );
            return Err(errors);
        }

        Ok(ValidatedForm {
            definition: self.definition,
            language: language.unwrap_or_default(),
            values,
            serializers: self.inputs.iter().map(|i| i.serialize).collect(),
        })
    }

    fn check_language(
        &self,
        data: &SubmissionData,
        languages: &[String],
        errors: &mut FormErrors,
    ) -> Option<String> {
        let submitted = data.values("language").first().map(|v| v.trim());
        match submitted {
            None | Some("") => {
                errors.add(Some("language"), REQUIRED);
                None
            }
            Some(code) if languages.iter().any(|l| l == code) => Some(code.to_string()),
            Some(code) => {
                errors.add(
                    Some("language"),
                    format!("Select a valid choice. {code} is not one of the available choices."),
                );
                None
            }
        }
    }

    fn check_plugin_id(&self, data: &SubmissionData, errors: &mut FormErrors) {
        let submitted = data.values("form_plugin_id").first().map(|v| v.trim());
        match submitted {
            None | Some("") => errors.add(Some("form_plugin_id"), REQUIRED),
            Some(id) => match id.parse::<u64>() {
                Ok(id) if id == self.definition.plugin_id => {}
                Ok(_) => errors.add(None, "The submitted data belongs to another form."),
                Err(_) => errors.add(Some("form_plugin_id"), "Enter a whole number."),
            },
        }
    }
}

/// Clean values of an accepted submission
#[derive(Debug, Clone)]
pub struct ValidatedForm<'a> {
    pub definition: &'a FormDefinition,
    pub language: String,
    /// One per definition field, same order
    values: Vec<CleanValue>,
    serializers: Vec<SerializeFn>,
}

impl<'a> ValidatedForm<'a> {
    pub fn value(&self, name: &str) -> Option<&CleanValue> {
        let index = self
            .definition
            .fields
            .iter()
            .position(|field| field.name == name)?;
        self.values.get(index)
    }

    /// Every field with its clean value, in tree order
    pub fn fields(&self) -> impl Iterator<Item = (&'a FieldDescriptor, &CleanValue)> + '_ {
        self.definition
            .fields
            .iter()
            .zip(self.values.iter())
    }

    pub(crate) fn entries(
        &self,
    ) -> impl Iterator<Item = (&'a FieldDescriptor, &CleanValue, SerializeFn)> + '_ {
        self.fields()
            .zip(self.serializers.iter().copied())
            .map(|((field, value), serialize)| (field, value, serialize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldKind, FormPluginConfig};
    use crate::storage::{HeaderImageInspector, MockImageInspector};
    use crate::submission::UploadedFile;
    use crate::tree::{PluginNode, PluginRecord};

    fn definition(fields: Vec<FieldDescriptor>) -> FormDefinition {
        FormDefinition {
            plugin_id: 7,
            settings: FormPluginConfig {
                name: "Contact".to_string(),
                ..Default::default()
            },
            fields,
            tree: PluginNode::leaf(PluginRecord::new(7, None, 0, "Form")),
        }
    }

    fn contact_fields() -> Vec<FieldDescriptor> {
        let mut name = FieldDescriptor::new(2, FieldKind::Text, "name");
        name.required = true;
        let mut email = FieldDescriptor::new(3, FieldKind::Email, "email");
        email.required = true;
        email.position = 1;
        let mut age = FieldDescriptor::new(4, FieldKind::Number, "age");
        age.min_value = Some(18);
        age.position = 2;
        vec![name, email, age]
    }

    fn base() -> SubmissionData {
        SubmissionData::default()
            .with_value("language", "en")
            .with_value("form_plugin_id", "7")
    }

    fn languages() -> Vec<String> {
        vec!["en".to_string(), "de".to_string()]
    }

    mod assemble {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_every_field_gets_a_validator() {
            let definition = definition(contact_fields());
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();
            assert_eq!(form.inputs.len(), 3);
            assert_eq!(form.definition().plugin_id, 7);
        }

        #[test]
        fn test_missing_registration_is_configuration_error() {
            let definition = definition(contact_fields());
            let err = SubmissionForm::assemble(&definition, &FieldRegistry::default())
                .err()
                .unwrap();
            assert!(matches!(err, ConfigurationError::UnregisteredKind(_)));
        }
    }

    mod validate {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_valid_submission_keeps_tree_order() {
            let definition = definition(contact_fields());
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();
            let data = base()
                .with_value("age", "30")
                .with_value("email", "ada@example.com")
                .with_value("name", "Ada");

            let validated = form.validate(&data, &languages(), &HeaderImageInspector).unwrap();
            let names: Vec<&str> = validated.fields().map(|(f, _)| f.name.as_str()).collect();
            assert_eq!(names, vec!["name", "email", "age"]);
            assert_eq!(validated.language, "en");
            assert_eq!(validated.value("age"), Some(&CleanValue::Number(30)));
        }

        #[test]
        fn test_all_field_errors_are_reported_together() {
            let definition = definition(contact_fields());
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();
            let data = base().with_value("email", "nope").with_value("age", "12");

            let errors = form.validate(&data, &languages(), &HeaderImageInspector).unwrap_err();
            assert_eq!(errors.field("name").unwrap(), ["This field is required."]);
            assert_eq!(errors.field("email").unwrap(), ["Enter a valid email address."]);
            assert_eq!(
                errors.field("age").unwrap(),
                ["Ensure this value is greater than or equal to 18."]
            );
            assert!(errors.non_field.is_empty());
        }

        #[test]
        fn test_messages_of_one_field_are_joined() {
            let mut email = FieldDescriptor::new(3, FieldKind::Email, "email");
            email.max_value = Some(3);
            let definition = definition(vec![email]);
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();

            let errors = form
                .validate(&base().with_value("email", "bogus"), &languages(), &HeaderImageInspector)
                .unwrap_err();
            assert_eq!(
                errors.field("email").unwrap(),
                [concat!(
                    "Enter a valid email address. ",
                    "Ensure this value has at most 3 characters (it has 5)."
                )]
            );
        }

        #[test]
        fn test_values_stay_paired_when_names_repeat() {
            let first = FieldDescriptor::new(2, FieldKind::Text, "note");
            let mut second = FieldDescriptor::new(3, FieldKind::Hidden, "note");
            second.initial_value = "fallback".to_string();
            second.position = 1;
            let mut age = FieldDescriptor::new(4, FieldKind::Number, "age");
            age.position = 2;
            let definition = definition(vec![first, second, age]);
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();
            let data = base().with_value("age", "30");

            let validated = form.validate(&data, &languages(), &HeaderImageInspector).unwrap();
            let pairs: Vec<(u64, &CleanValue)> =
                validated.fields().map(|(f, v)| (f.plugin_id, v)).collect();
            assert_eq!(
                pairs,
                vec![
                    (2, &CleanValue::Empty),
                    (3, &CleanValue::Text("fallback".to_string())),
                    (4, &CleanValue::Number(30)),
                ]
            );
            assert_eq!(validated.value("note"), Some(&CleanValue::Empty));
            assert_eq!(validated.value("age"), Some(&CleanValue::Number(30)));
        }

        #[test]
        fn test_language_must_be_configured() {
            let definition = definition(Vec::new());
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();
            let data = SubmissionData::default()
                .with_value("language", "fr")
                .with_value("form_plugin_id", "7");

            let errors = form.validate(&data, &languages(), &HeaderImageInspector).unwrap_err();
            assert_eq!(
                errors.field("language").unwrap(),
                ["Select a valid choice. fr is not one of the available choices."]
            );
        }

        #[test]
        fn test_reserved_inputs_are_required() {
            let definition = definition(Vec::new());
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();

            let errors = form
                .validate(&SubmissionData::default(), &languages(), &HeaderImageInspector)
                .unwrap_err();
            assert_eq!(errors.field("language").unwrap(), ["This field is required."]);
            assert_eq!(errors.field("form_plugin_id").unwrap(), ["This field is required."]);
        }

        #[test]
        fn test_plugin_id_of_another_form() {
            let definition = definition(Vec::new());
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();
            let data = SubmissionData::default()
                .with_value("language", "en")
                .with_value("form_plugin_id", "8");

            let errors = form.validate(&data, &languages(), &HeaderImageInspector).unwrap_err();
            assert_eq!(errors.non_field, vec!["The submitted data belongs to another form."]);
        }

        #[test]
        fn test_images_are_measured_by_the_inspector() {
            let mut photo = FieldDescriptor::new(5, FieldKind::Image, "photo");
            photo.max_width = Some(100);
            let definition = definition(vec![photo]);
            let form = SubmissionForm::assemble(&definition, &FieldRegistry::builtin()).unwrap();

            let mut inspector = MockImageInspector::new();
            inspector
                .expect_dimensions()
                .times(1)
                .returning(|_| Ok((101, 50)));
            let data = base().with_file("photo", UploadedFile::with_size("p.png", "image/png", 1));

            let errors = form.validate(&data, &languages(), &inspector).unwrap_err();
            assert_eq!(
                errors.field("photo").unwrap(),
                ["Image width must be under 100 pixels. Current width is 101 pixels."]
            );
        }
    }

    mod errors {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_add_appends_per_field() {
            let mut errors = FormErrors::default();
            assert!(errors.is_empty());
            errors.add(Some("email"), "First.");
            errors.add(Some("email"), "Second.");
            errors.add(None, "Form wide.");
            assert_eq!(errors.field("email").unwrap(), ["First.", "Second."]);
            assert_eq!(errors.non_field, vec!["Form wide."]);
        }
    }
}
