//! E-mail messages sent after an accepted submission

use crate::serialize::{Audience, SerializedFields};
use crate::submission::ValidatedForm;

const DEFAULT_CONFIRMATION_SUBJECT: &str = "Thank you for your submission";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

fn render_fields(fields: &SerializedFields<'_>) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.label, f.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Notification for the form's recipients, `None` when nobody is configured
pub fn admin_notification(form: &ValidatedForm<'_>, form_url: &str) -> Option<EmailMessage> {
    let recipients = &form.definition.settings.recipients;
    if recipients.is_empty() {
        return None;
    }
    let fields = SerializedFields::new(form, Audience::Admin);
    Some(EmailMessage {
        to: recipients.clone(),
        subject: format!("[Form submission] {}", form.definition.name()),
        body: format!(
            "Form: {}\nLanguage: {}\nPage: {}\n\n{}",
            form.definition.name(),
            form.language,
            form_url,
            render_fields(&fields)
        ),
    })
}

/// Confirmation for every filled e-mail field that asks for one
pub fn confirmation_notifications(form: &ValidatedForm<'_>) -> Vec<EmailMessage> {
    let fields = SerializedFields::new(form, Audience::Confirmation);
    fields
        .email_addresses()
        .into_iter()
        .filter_map(|(field, address)| {
            let notification = field.notification.as_ref()?;
            let subject = notification
                .subject
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONFIRMATION_SUBJECT.to_string());
            let body = match notification.body.as_deref() {
                Some(intro) if !intro.trim().is_empty() => {
                    format!("{}\n\n{}", intro.trim_end(), render_fields(&fields))
                }
                _ => render_fields(&fields),
            };
            Some(EmailMessage {
                to: vec![address],
                subject,
                body,
            })
        })
        .collect()
}
