//! Field rules attached to type descriptors

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::core::error::FieldValidationError;

/// Textual formats a string field can be required to follow
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    Url,
    /// Two comma-separated decimal numbers, `"lat,lng"`
    LatLng,
    Custom(Regex),
}

impl FieldFormat {
    /// Check a value against this format. Non-string values never match.
    pub fn matches(&self, value: &Value) -> bool {
        let Some(text) = value.as_str() else {
            return false;
        };

        match self {
            FieldFormat::Email => email_regex().is_match(text),
            FieldFormat::Url => url_regex().is_match(text),
            FieldFormat::LatLng => is_lat_lng(text),
            FieldFormat::Custom(regex) => regex.is_match(text),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldFormat::Email => "must be a valid email address",
            FieldFormat::Url => "must be a valid URL",
            FieldFormat::LatLng => "must be in the form 'lat,lng'",
            FieldFormat::Custom(_) => "has an invalid format",
        }
    }
}

/// One field constraint of a type descriptor
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub format: Option<FieldFormat>,
}

impl FieldRule {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            format: None,
        }
    }

    pub fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            format: None,
        }
    }

    pub fn with_format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Check a (possibly absent) value, reporting at most one error
    pub fn check(&self, value: Option<&Value>) -> Option<FieldValidationError> {
        let present = match value {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };

        if !present {
            return self.required.then(|| FieldValidationError {
                field: self.name.to_string(),
                message: "is required".to_string(),
            });
        }

        match (&self.format, value) {
            (Some(format), Some(v)) if !format.matches(v) => Some(FieldValidationError {
                field: self.name.to_string(),
                message: format.describe().to_string(),
            }),
            _ => None,
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    })
}

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap())
}

fn is_lat_lng(text: &str) -> bool {
    let mut parts = text.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(lat), Some(lng), None) => {
            lat.trim().parse::<f64>().is_ok() && lng.trim().parse::<f64>().is_ok()
        }
        _ => false,
    }
}
