//! Trait abstraction for external collaborators to enable mocking in tests

use anyhow::Result;
use async_trait::async_trait;

use crate::notifications::EmailMessage;
use crate::submission::{Submission, UploadedFile};
use crate::tree::{PluginId, PluginRecord};

/// Read access to the CMS plugin table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PluginStore: Send + Sync {
    /// Fetch a single plugin
    async fn get(&self, id: PluginId) -> Result<Option<PluginRecord>>;

    /// Fetch every plugin whose parent is one of `parents`
    async fn children_of(&self, parents: &[PluginId]) -> Result<Vec<PluginRecord>>;
}

/// Write access to the submission table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission
    async fn create(&self, submission: &Submission) -> Result<()>;
}

/// Outgoing mail transport
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Reads the pixel dimensions of an uploaded image
#[cfg_attr(test, mockall::automock)]
pub trait ImageInspector: Send + Sync {
    /// Width and height decoded from the file content
    fn dimensions(&self, file: &UploadedFile) -> Result<(u32, u32)>;
}
