//! Ordered `(name, label, value)` rendering of a validated submission
//!
//! The same validated form is rendered for two audiences: the visitor's
//! confirmation mail and the stored record shown to site staff. Hidden
//! fields only reach the latter.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::fields::{FieldDescriptor, FieldKind};
use crate::submission::{CleanValue, ValidatedForm};

/// Who the serialized data is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Confirmation,
    Admin,
}

impl Audience {
    pub fn is_confirmation(self) -> bool {
        self == Self::Confirmation
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedField {
    pub name: String,
    pub label: String,
    pub value: String,
    #[serde(skip)]
    pub is_confirmation: bool,
}

/// Human readable text of a clean value
pub fn render(field: &FieldDescriptor, value: &CleanValue) -> String {
    match value {
        CleanValue::Empty => String::new(),
        CleanValue::Text(text) if field.kind.has_choices() => field.choice_label(text).to_string(),
        CleanValue::Text(text) => text.clone(),
        CleanValue::Number(number) => number.to_string(),
        CleanValue::Bool(true) => "Yes".to_string(),
        CleanValue::Bool(false) => "No".to_string(),
        CleanValue::Choices(values) => values
            .iter()
            .map(|v| field.choice_label(v))
            .collect::<Vec<_>>()
            .join(", "),
        CleanValue::Files(files) => files
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

pub fn serialize_value(
    field: &FieldDescriptor,
    value: &CleanValue,
    audience: Audience,
) -> Option<SerializedField> {
    Some(SerializedField {
        name: field.name.clone(),
        label: field.label.clone(),
        value: render(field, value),
        is_confirmation: audience.is_confirmation(),
    })
}

/// Hidden inputs are shown to staff but never echoed back to the visitor
pub fn serialize_admin_only(
    field: &FieldDescriptor,
    value: &CleanValue,
    audience: Audience,
) -> Option<SerializedField> {
    if audience.is_confirmation() {
        return None;
    }
    serialize_value(field, value, audience)
}

pub fn skip(_: &FieldDescriptor, _: &CleanValue, _: Audience) -> Option<SerializedField> {
    None
}

/// Lazy view over the serialized fields of a validated form
///
/// Nothing is rendered until iterated, and `iter` may be called again to
/// walk the same sequence.
#[derive(Clone, Copy)]
pub struct SerializedFields<'f> {
    form: &'f ValidatedForm<'f>,
    audience: Audience,
}

impl<'f> SerializedFields<'f> {
    pub fn new(form: &'f ValidatedForm<'f>, audience: Audience) -> Self {
        Self { form, audience }
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn iter(&self) -> impl Iterator<Item = SerializedField> + 'f {
        let audience = self.audience;
        self.form
            .entries()
            .filter_map(move |(field, value, serialize)| serialize(field, value, audience))
    }

    /// `(label, value)` pairs in tree order
    pub fn choices(&self) -> Vec<(String, String)> {
        self.iter().map(|f| (f.label, f.value)).collect()
    }

    /// Field name to rendered value
    pub fn cleaned_data(&self) -> IndexMap<String, String> {
        self.iter().map(|f| (f.name, f.value)).collect()
    }

    /// Rendered values of the e-mail fields, used as confirmation recipients
    pub fn email_addresses(&self) -> Vec<(&'f FieldDescriptor, String)> {
        self.form
            .fields()
            .filter(|(field, _)| field.kind == FieldKind::Email)
            .filter_map(|(field, value)| value.as_text().map(|v| (field, v.to_string())))
            .collect()
    }

    /// JSON array of `{name, label, value}` as persisted with a submission
    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.iter().collect::<Vec<_>>())
    }
}
