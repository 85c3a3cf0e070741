//! Persisted submission record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidatedForm;
use crate::serialize::{Audience, SerializedFields};

/// One field of the stored data blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredField {
    pub name: String,
    pub label: String,
    pub value: String,
}

/// A stored submission; created once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub name: String,
    pub language: String,
    pub form_url: String,
    /// JSON array of `{name, label, value}`
    pub data: String,
    /// JSON array of notified addresses
    pub recipients: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Record of `form` with the data rendered for site staff
    pub fn new(form: &ValidatedForm<'_>, form_url: &str) -> serde_json::Result<Self> {
        let fields = SerializedFields::new(form, Audience::Admin);
        Ok(Self {
            id: Uuid::new_v4(),
            name: form.definition.name().to_string(),
            language: form.language.clone(),
            form_url: form_url.to_string(),
            data: fields.to_blob()?,
            recipients: serde_json::to_string(&form.definition.settings.recipients)?,
            created_at: Utc::now(),
        })
    }

    pub fn form_data(&self) -> serde_json::Result<Vec<StoredField>> {
        serde_json::from_str(&self.data)
    }

    pub fn recipients(&self) -> serde_json::Result<Vec<String>> {
        serde_json::from_str(&self.recipients)
    }
}
