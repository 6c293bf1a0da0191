//! Options validation with detailed error reporting.
//!
//! The [`validate`] function checks parsed [`Options`] for values the
//! middleware would otherwise silently replace at construction time:
//! header names that are not valid HTTP tokens and custom identifiers
//! that cannot be sent as a header value.

use http::{HeaderName, HeaderValue};

use super::model::{IdType, Options};
use crate::error::ValidationError;

/// Validate a header name. Empty is allowed and means the default header.
pub fn validate_header_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Ok(());
    }
    HeaderName::try_from(name)
        .map(|_| ())
        .map_err(|_| format!("'{name}' is not a valid HTTP header name"))
}

/// Validate a literal identifier for the `custom` strategy.
pub fn validate_custom_string(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("custom_string is required when id_type is 'custom'".into());
    }
    HeaderValue::from_str(value)
        .map(|_| ())
        .map_err(|_| "custom_string contains characters not allowed in a header value".into())
}

pub fn validate(options: &Options) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(message) = validate_header_name(&options.header_name) {
        let cleaned: String = options
            .header_name
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect();
        errors.push(ValidationError {
            field: "header_name".into(),
            message,
            suggestion: (cleaned != options.header_name && validate_header_name(&cleaned).is_ok())
                .then(|| format!("did you mean '{cleaned}'?")),
        });
    }

    match options.id_type {
        IdType::Custom => {
            if let Err(message) = validate_custom_string(&options.custom_string) {
                errors.push(ValidationError {
                    field: "custom_string".into(),
                    message,
                    suggestion: None,
                });
            }
        }
        other if !options.custom_string.is_empty() => {
            errors.push(ValidationError {
                field: "custom_string".into(),
                message: format!("custom_string is ignored when id_type is '{other}'"),
                suggestion: Some("set id_type to 'custom' or remove custom_string".into()),
            });
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
