//! Type and size checks shared by every upload field

use super::UploadedFile;
use crate::fields::filesize::format_size;
use crate::fields::AcceptedTypes;

/// Messages for every type and size violation of the files of one field
pub fn check_files(
    accepted: &AcceptedTypes,
    max_size: Option<u64>,
    files: &[UploadedFile],
) -> Vec<String> {
    let mut messages = Vec::new();
    if files.is_empty() {
        return messages;
    }

    let rejected: Vec<String> = files
        .iter()
        .filter(|f| !accepted.accepts(&f.name, &f.content_type))
        .map(|f| format!("\"{}\" is not of accepted file type.", f.name))
        .collect();
    if !rejected.is_empty() {
        messages.push(format!(
            "{} Accepted file types are: {}.",
            rejected.join(" "),
            accepted.display()
        ));
    }

    if let Some(limit) = max_size {
        let total: u64 = files.iter().map(|f| f.size).sum();
        if total > limit {
            let message = if files.len() > 1 {
                format!(
                    "The total file size has exceeded the specified limit {}.",
                    format_size(limit)
                )
            } else {
                format!("File size exceeded the specified limit {}.", format_size(limit))
            };
            messages.push(message);
        }
    }

    messages
}
