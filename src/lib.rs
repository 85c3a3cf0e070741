//! cms-forms - form plugin core for a content management system
//!
//! Editors build forms as plugin trees; visitor submissions are validated
//! against the configured fields, serialized in tree order and handed to
//! the action backend chosen for the form.

pub mod actions;
pub mod config;
pub mod error;
pub mod fields;
pub mod notifications;
pub mod pipeline;
pub mod serialize;
pub mod storage;
pub mod submission;
pub mod tree;

pub use actions::{ActionBackend, ActionRegistry};
pub use config::FormsConfig;
pub use error::{ConfigurationError, Error, Result};
pub use fields::FieldRegistry;
pub use pipeline::{FormProcessor, Outcome};
pub use submission::{FormErrors, SubmissionData, UploadedFile};
pub use tree::FormDefinition;
