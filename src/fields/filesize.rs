//! File size parsing and formatting
//!
//! Sizes may be configured as plain byte counts or with a 1024-based suffix
//! (`512k`, `10MB`, `1.5 GiB`).

use once_cell::sync::Lazy;
use regex::Regex;

const KB: u64 = 1024;
const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

static SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(?:([kmgt])i?)?b?\s*$").expect("valid size pattern")
});

/// Parse a size such as `10MB` into bytes
pub fn parse_size(input: &str) -> Result<u64, String> {
    let captures = SIZE
        .captures(input)
        .ok_or_else(|| format!("`{input}` is not a valid file size"))?;
    let number: f64 = captures[1]
        .parse()
        .map_err(|_| format!("`{input}` is not a valid file size"))?;
    let exponent = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        None => 0,
        Some(unit) => match unit.as_str() {
            "k" => 1,
            "m" => 2,
            "g" => 3,
            _ => 4,
        },
    };
    Ok((number * (KB as f64).powi(exponent)).round() as u64)
}

/// Render a byte count the way limits are shown to visitors
pub fn format_size(bytes: u64) -> String {
    if bytes == 1 {
        return "1 byte".to_string();
    }
    if bytes < KB {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64 / KB as f64;
    let mut unit = 0;
    while value >= KB as f64 && unit < UNITS.len() - 1 {
        value /= KB as f64;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Serde adapter accepting either a byte count or a suffixed string
pub mod serde_opt {
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Bytes(u64),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawSize>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawSize::Bytes(bytes)) => Ok(Some(bytes)),
            Some(RawSize::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(RawSize::Text(text)) => super::parse_size(&text)
                .map(Some)
                .map_err(D::Error::custom),
        }
    }
}
