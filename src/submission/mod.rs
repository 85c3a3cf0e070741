//! Visitor submissions: raw input, validation and the persisted record

mod files;
mod form;
mod record;
pub mod validators;

pub use files::check_files;
pub use form::{FormErrors, SubmissionForm, ValidatedForm};
pub use record::{StoredField, Submission};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An uploaded file as received from the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: &str, content_type: &str, content: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            content_type: content_type.to_string(),
            size: content.len() as u64,
            content,
        }
    }

    /// File known only by its metadata
    pub fn with_size(name: &str, content_type: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            content_type: content_type.to_string(),
            size,
            content: Vec::new(),
        }
    }
}

/// Raw submitted values keyed by input name
#[derive(Debug, Clone, Default)]
pub struct SubmissionData {
    pub values: IndexMap<String, Vec<String>>,
    pub files: IndexMap<String, Vec<UploadedFile>>,
}

impl SubmissionData {
    pub fn with_value(mut self, name: &str, value: &str) -> Self {
        self.values
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.entry(name.to_string()).or_default().push(file);
        self
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn files(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// A validated field value
#[derive(Debug, Clone, PartialEq)]
pub enum CleanValue {
    Empty,
    Text(String),
    Number(i64),
    Bool(bool),
    Choices(Vec<String>),
    Files(Vec<UploadedFile>),
}

impl CleanValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}
