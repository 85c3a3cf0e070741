//! Action backends: what happens to an accepted submission
//!
//! A form names its backend by key. Keys map to handler references in the
//! configuration; the references are resolved once at startup.

mod builtin;
mod registry;

pub use builtin::{DefaultAction, EmailAction, NoAction};
pub use registry::{construct, ActionRegistry, BackendCatalog, BackendFactory, MAX_KEY_LENGTH};

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::fields::{FieldConfig, FormPluginConfig};
use crate::notifications::{admin_notification, confirmation_notifications};
use crate::storage::{Mailer, SubmissionStore};
use crate::submission::{Submission, ValidatedForm};

/// Backend key to handler reference used when nothing is configured
pub fn default_backend_mapping() -> BTreeMap<String, String> {
    [
        ("default", "cms_forms::actions::DefaultAction"),
        ("email_only", "cms_forms::actions::EmailAction"),
        ("none", "cms_forms::actions::NoAction"),
    ]
    .into_iter()
    .map(|(key, reference)| (key.to_string(), reference.to_string()))
    .collect()
}

/// Rejection raised by a backend after field validation passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// Field to attach the message to; `None` for a form-wide error
    pub field: Option<String>,
    pub message: String,
}

/// Everything a backend may touch while handling an accepted submission
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    pub form: &'a ValidatedForm<'a>,
    pub form_url: &'a str,
    pub submissions: &'a dyn SubmissionStore,
    pub mailer: &'a dyn Mailer,
}

impl ActionContext<'_> {
    /// Persist the submission
    pub async fn save(&self) -> Result<Submission> {
        let submission = Submission::new(self.form, self.form_url)?;
        self.submissions
            .create(&submission)
            .await
            .map_err(Error::Storage)?;
        tracing::info!(
            "Stored submission {} of form {}",
            submission.id,
            submission.name
        );
        Ok(submission)
    }

    /// Send the staff notification and every requested confirmation
    pub async fn send_notifications(&self) -> Result<usize> {
        let mut messages = confirmation_notifications(self.form);
        if let Some(message) = admin_notification(self.form, self.form_url) {
            messages.insert(0, message);
        }
        for message in &messages {
            self.mailer.send(message).await.map_err(Error::Delivery)?;
        }
        tracing::debug!("Sent {} notifications", messages.len());
        Ok(messages.len())
    }
}

/// Strategy invoked for forms that select it
#[async_trait]
pub trait ActionBackend: Send + Sync {
    /// Name shown in the backend choice list
    fn verbose_name(&self) -> &'static str;

    /// Check the form plugin settings when an editor saves them
    fn clean_form(&self, _config: &FormPluginConfig) -> Option<String> {
        None
    }

    /// Check an e-mail field's settings when an editor saves them
    fn clean_field(&self, _config: &FieldConfig) -> Option<String> {
        None
    }

    /// Last check of an accepted submission before side effects run
    fn clean(&self, _form: &ValidatedForm<'_>) -> Option<BackendError> {
        None
    }

    /// Side effects of an accepted submission
    async fn form_valid(&self, ctx: &ActionContext<'_>) -> Result<()>;
}
