//! Runtime validators, one per field kind
//!
//! Every validator returns all violated constraints of its field so the
//! form can report them together.

use validator::ValidateEmail;

use super::files::check_files;
use super::{CleanValue, UploadedFile};
use crate::fields::FieldDescriptor;
use crate::storage::ImageInspector;

const CHECKED: &[&str] = &["on", "true", "1", "yes"];

const INVALID_IMAGE: &str = "Upload a valid image. \
    The file you uploaded was either not an image or a corrupted image.";

/// Submitted input of one field
#[derive(Debug, Clone, Copy)]
pub struct RawField<'a> {
    pub values: &'a [String],
    pub files: &'a [UploadedFile],
}

impl<'a> RawField<'a> {
    pub fn new(values: &'a [String], files: &'a [UploadedFile]) -> Self {
        Self { values, files }
    }

    /// First submitted value with surrounding whitespace removed
    fn first(&self) -> Option<&'a str> {
        self.values
            .first()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Services validators may need
#[derive(Clone, Copy)]
pub struct FieldContext<'a> {
    pub images: &'a dyn ImageInspector,
}

type Outcome = Result<CleanValue, Vec<String>>;

fn missing(field: &FieldDescriptor) -> Outcome {
    if field.required {
        Err(vec![field.required_message().to_string()])
    } else {
        Ok(CleanValue::Empty)
    }
}

fn length_messages(field: &FieldDescriptor, value: &str) -> Vec<String> {
    let length = value.chars().count() as u64;
    let mut messages = Vec::new();
    if let Some(min) = field.min_value.filter(|&min| length < min) {
        messages.push(format!(
            "Ensure this value has at least {min} characters (it has {length})."
        ));
    }
    if let Some(max) = field.max_value.filter(|&max| length > max) {
        messages.push(format!(
            "Ensure this value has at most {max} characters (it has {length})."
        ));
    }
    messages
}

fn finish(messages: Vec<String>, value: CleanValue) -> Outcome {
    if messages.is_empty() {
        Ok(value)
    } else {
        Err(messages)
    }
}

pub fn validate_text(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    let Some(value) = raw.first() else {
        return missing(field);
    };
    finish(length_messages(field, value), CleanValue::Text(value.to_string()))
}

pub fn validate_email(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    let Some(value) = raw.first() else {
        return missing(field);
    };
    let mut messages = Vec::new();
    if !value.validate_email() {
        messages.push("Enter a valid email address.".to_string());
    }
    messages.extend(length_messages(field, value));
    finish(messages, CleanValue::Text(value.to_string()))
}

pub fn validate_number(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    let Some(value) = raw.first() else {
        return missing(field);
    };
    let Ok(number) = value.parse::<i64>() else {
        return Err(vec!["Enter a whole number.".to_string()]);
    };
    let mut messages = Vec::new();
    if let Some(min) = field
        .min_value
        .filter(|&min| i128::from(number) < i128::from(min))
    {
        messages.push(format!(
            "Ensure this value is greater than or equal to {min}."
        ));
    }
    if let Some(max) = field
        .max_value
        .filter(|&max| i128::from(number) > i128::from(max))
    {
        messages.push(format!("Ensure this value is less than or equal to {max}."));
    }
    finish(messages, CleanValue::Number(number))
}

pub fn validate_hidden(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    let value = raw.first().unwrap_or(field.initial_value.as_str());
    if value.is_empty() {
        Ok(CleanValue::Empty)
    } else {
        Ok(CleanValue::Text(value.to_string()))
    }
}

pub fn validate_boolean(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    let checked = raw
        .first()
        .is_some_and(|v| CHECKED.contains(&v.to_lowercase().as_str()));
    if !checked && field.required {
        return Err(vec![field.required_message().to_string()]);
    }
    Ok(CleanValue::Bool(checked))
}

fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

pub fn validate_choice(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    let Some(value) = raw.first() else {
        return missing(field);
    };
    if !field.choices.iter().any(|c| c.value == value) {
        return Err(vec![invalid_choice(value)]);
    }
    Ok(CleanValue::Text(value.to_string()))
}

pub fn validate_multiple_choice(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    let chosen: Vec<String> = raw
        .values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if chosen.is_empty() {
        return missing(field);
    }

    let mut messages: Vec<String> = chosen
        .iter()
        .filter(|v| !field.choices.iter().any(|c| &c.value == *v))
        .map(|v| invalid_choice(v))
        .collect();
    let count = chosen.len() as u64;
    if let Some(min) = field.min_value.filter(|&min| count < min) {
        messages.push(format!(
            "You have to choose at least {min} options (chosen {count})."
        ));
    }
    if let Some(max) = field.max_value.filter(|&max| count > max) {
        messages.push(format!(
            "You can't choose more than {max} options (chosen {count})."
        ));
    }
    finish(messages, CleanValue::Choices(chosen))
}

pub fn validate_file(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    let Some(file) = raw.files.first() else {
        return missing(field);
    };
    let files = std::slice::from_ref(file);
    finish(
        check_files(&field.accepted_types, field.max_size, files),
        CleanValue::Files(files.to_vec()),
    )
}

pub fn validate_multiple_files(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    _ctx: &FieldContext<'_>,
) -> Outcome {
    if raw.files.is_empty() {
        return missing(field);
    }
    let mut messages = check_files(&field.accepted_types, field.max_size, raw.files);
    if let Some(limit) = field.max_files {
        if raw.files.len() > limit as usize {
            messages.push(format!(
                "The number of uploaded files exceeded the set limit of {limit}."
            ));
        }
    }
    finish(messages, CleanValue::Files(raw.files.to_vec()))
}

pub fn validate_image(
    field: &FieldDescriptor,
    raw: &RawField<'_>,
    ctx: &FieldContext<'_>,
) -> Outcome {
    let Some(file) = raw.files.first() else {
        return missing(field);
    };
    let files = std::slice::from_ref(file);
    let mut messages = check_files(&field.accepted_types, field.max_size, files);
    if field.max_width.is_none() && field.max_height.is_none() {
        return finish(messages, CleanValue::Files(files.to_vec()));
    }

    match ctx.images.dimensions(file) {
        Ok((width, height)) => {
            if let Some(max) = field.max_width.filter(|&max| width > max) {
                messages.push(format!(
                    "Image width must be under {max} pixels. Current width is {width} pixels."
                ));
            }
            if let Some(max) = field.max_height.filter(|&max| height > max) {
                messages.push(format!(
                    "Image height must be under {max} pixels. Current height is {height} pixels."
                ));
            }
        }
        Err(err) => {
            tracing::debug!("Could not measure {}: {err}", file.name);
            messages.push(INVALID_IMAGE.to_string());
        }
    }
    finish(messages, CleanValue::Files(files.to_vec()))
}
