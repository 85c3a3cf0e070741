//! In-memory collaborators used by the command-line driver and tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use super::traits::{Mailer, PluginStore, SubmissionStore};
use crate::notifications::EmailMessage;
use crate::submission::Submission;
use crate::tree::{PluginId, PluginRecord};

/// Plugin table held in a vector
#[derive(Debug, Clone, Default)]
pub struct MemoryPluginStore {
    records: Vec<PluginRecord>,
}

impl MemoryPluginStore {
    pub fn new(records: Vec<PluginRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl PluginStore for MemoryPluginStore {
    async fn get(&self, id: PluginId) -> Result<Option<PluginRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    async fn children_of(&self, parents: &[PluginId]) -> Result<Vec<PluginRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.parent.is_some_and(|p| parents.contains(&p)))
            .cloned()
            .collect())
    }
}

/// Submissions kept in creation order
#[derive(Debug, Default)]
pub struct MemorySubmissionStore {
    submissions: Mutex<Vec<Submission>>,
}

impl MemorySubmissionStore {
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn create(&self, submission: &Submission) -> Result<()> {
        let mut submissions = self
            .submissions
            .lock()
            .map_err(|_| anyhow!("Submission store lock poisoned"))?;
        if submissions.iter().any(|s| s.id == submission.id) {
            return Err(anyhow!("Submission {} already exists", submission.id));
        }
        submissions.push(submission.clone());
        Ok(())
    }
}

/// Mailer that logs every message and keeps it in an outbox
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl MemoryMailer {
    pub fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(
            "Sending \"{}\" to {}",
            message.subject,
            message.to.join(", ")
        );
        self.outbox
            .lock()
            .map_err(|_| anyhow!("Outbox lock poisoned"))?
            .push(message.clone());
        Ok(())
    }
}
