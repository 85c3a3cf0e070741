//! Storage, delivery and decoding collaborators
//!
//! The pipeline talks to the plugin table, the submission table, the mail
//! transport and the image decoder through the traits defined here.

mod images;
mod memory;
mod traits;

pub use images::HeaderImageInspector;
pub use memory::{MemoryMailer, MemoryPluginStore, MemorySubmissionStore};
pub use traits::{ImageInspector, Mailer, PluginStore, SubmissionStore};

#[cfg(test)]
pub use traits::{MockImageInspector, MockMailer, MockPluginStore, MockSubmissionStore};
