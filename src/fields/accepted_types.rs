//! Accepted upload types: `.ext`, `type/subtype` or `type/*` tokens

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\.\w+|[\w.+-]+/(\*|[\w.+-]+))$").expect("valid accepted type pattern")
});

static EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\.\w+)$").expect("valid extension pattern"));

/// Parsed list of accepted types; empty means no restriction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedTypes {
    tokens: Vec<String>,
}

impl AcceptedTypes {
    /// Parse a whitespace-delimited list, returning the invalid tokens on failure
    pub fn parse(input: &str) -> Result<Self, Vec<String>> {
        let mut tokens = Vec::new();
        let mut invalid = Vec::new();
        for token in input.split_whitespace() {
            if TOKEN.is_match(token) {
                tokens.push(token.to_lowercase());
            } else {
                invalid.push(token.to_string());
            }
        }
        if invalid.is_empty() {
            Ok(Self { tokens })
        } else {
            Err(invalid)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether a file with this name and MIME type may be uploaded
    pub fn accepts(&self, file_name: &str, content_type: &str) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let file_name = file_name.to_lowercase();
        let extension = EXTENSION
            .captures(&file_name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        let content_type = content_type.to_lowercase();
        let main_type = content_type.split('/').next().unwrap_or_default();

        self.tokens.iter().any(|token| {
            if let Some(wildcard) = token.strip_suffix("/*") {
                return wildcard == main_type;
            }
            Some(token.as_str()) == extension || *token == content_type
        })
    }

    /// Human readable list, e.g. `.pdf, image/*`
    pub fn display(&self) -> String {
        self.tokens.join(", ")
    }
}
