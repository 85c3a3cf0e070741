//! Backends shipped with the crate

use async_trait::async_trait;

use super::{ActionBackend, ActionContext};
use crate::error::Result;

/// Store the submission, then notify
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAction;

#[async_trait]
impl ActionBackend for DefaultAction {
    fn verbose_name(&self) -> &'static str {
        "Default"
    }

    async fn form_valid(&self, ctx: &ActionContext<'_>) -> Result<()> {
        ctx.save().await?;
        ctx.send_notifications().await?;
        Ok(())
    }
}

/// Notify without storing anything
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailAction;

#[async_trait]
impl ActionBackend for EmailAction {
    fn verbose_name(&self) -> &'static str {
        "Email only"
    }

    async fn form_valid(&self, ctx: &ActionContext<'_>) -> Result<()> {
        ctx.send_notifications().await?;
        Ok(())
    }
}

/// Accept and discard
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAction;

#[async_trait]
impl ActionBackend for NoAction {
    fn verbose_name(&self) -> &'static str {
        "None"
    }

    async fn form_valid(&self, _ctx: &ActionContext<'_>) -> Result<()> {
        tracing::debug!("Discarding submission");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::{definition, submit};
    use crate::storage::{MemoryMailer, MemorySubmissionStore};

    async fn run(backend: &dyn ActionBackend) -> (MemorySubmissionStore, MemoryMailer) {
        let definition = definition();
        let form = submit(&definition);
        let submissions = MemorySubmissionStore::default();
        let mailer = MemoryMailer::default();
        let ctx = ActionContext {
            form: &form,
            form_url: "https://example.com/contact/",
            submissions: &submissions,
            mailer: &mailer,
        };
        backend.form_valid(&ctx).await.unwrap();
        (submissions, mailer)
    }

    #[tokio::test]
    async fn test_default_action_saves_and_notifies() {
        let (submissions, mailer) = run(&DefaultAction).await;
        assert_eq!(submissions.submissions().len(), 1);
        assert_eq!(mailer.outbox().len(), 2);
    }

    #[tokio::test]
    async fn test_email_action_only_notifies() {
        let (submissions, mailer) = run(&EmailAction).await;
        assert!(submissions.submissions().is_empty());
        assert_eq!(mailer.outbox().len(), 2);
    }

    #[tokio::test]
    async fn test_no_action_does_nothing() {
        let (submissions, mailer) = run(&NoAction).await;
        assert!(submissions.submissions().is_empty());
        assert!(mailer.outbox().is_empty());
    }
}
