//! Request-level handling of one submission

use serde::Serialize;

use crate::actions::{ActionContext, ActionRegistry};
use crate::error::Result;
use crate::fields::FieldRegistry;
use crate::serialize::{Audience, SerializedField, SerializedFields};
use crate::storage::{ImageInspector, Mailer, SubmissionStore};
use crate::submission::{FormErrors, SubmissionData, SubmissionForm};
use crate::tree::FormDefinition;

/// Result of processing a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing was stored or sent
    Invalid(FormErrors),
    /// The backend ran; `fields` is what the visitor may see
    Accepted {
        redirect: Option<String>,
        fields: Vec<SerializedField>,
    },
}

/// Collaborators shared by every submission
pub struct FormProcessor<'a> {
    pub registry: &'a FieldRegistry,
    pub backends: &'a ActionRegistry,
    pub submissions: &'a dyn SubmissionStore,
    pub mailer: &'a dyn Mailer,
    pub images: &'a dyn ImageInspector,
    pub languages: &'a [String],
}

impl FormProcessor<'_> {
    pub async fn process(
        &self,
        definition: &FormDefinition,
        data: &SubmissionData,
        form_url: &str,
    ) -> Result<Outcome> {
        let form = SubmissionForm::assemble(definition, self.registry)?;
        let validated = match form.validate(data, self.languages, self.images) {
            Ok(validated) => validated,
            Err(errors) => return Ok(Outcome::Invalid(errors)),
        };

        let backend = self.backends.resolve(&definition.settings.action_backend);
        if let Some(rejection) = backend.clean(&validated) {
            tracing::debug!("{} backend rejected submission", backend.verbose_name());
            let mut errors = FormErrors::default();
            errors.add(rejection.field.as_deref(), rejection.message);
            return Ok(Outcome::Invalid(errors));
        }

        let ctx = ActionContext {
            form: &validated,
            form_url,
            submissions: self.submissions,
            mailer: self.mailer,
        };
        backend.form_valid(&ctx).await?;

        Ok(Outcome::Accepted {
            redirect: definition.settings.redirect_target().map(str::to_string),
            fields: SerializedFields::new(&validated, Audience::Confirmation)
                .iter()
                .collect(),
        })
    }
}
