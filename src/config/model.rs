//! Serde data structure for the middleware options.
//!
//! [`Options`] derives `Serialize` and `Deserialize` with
//! `deny_unknown_fields` for strict parsing. Every field has a default,
//! so an empty document is valid and yields the default behaviour
//! (`X-Correlation-ID` header, UUID identifiers).

use serde::{Deserialize, Serialize};

use crate::error::{CorrelationError, ValidationError};
pub use crate::id::IdType;

pub const ENV_HEADER_NAME: &str = "CORRELATION_HEADER_NAME";
pub const ENV_ID_TYPE: &str = "CORRELATION_ID_TYPE";
pub const ENV_CUSTOM_STRING: &str = "CORRELATION_CUSTOM_STRING";

fn is_default_id_type(v: &IdType) -> bool {
    *v == IdType::default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Header carrying the identifier. Empty means [`DEFAULT_HEADER`](crate::DEFAULT_HEADER).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub header_name: String,

    #[serde(default, skip_serializing_if = "is_default_id_type")]
    pub id_type: IdType,

    /// Literal identifier, only read when `id_type` is [`IdType::Custom`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_string: String,
}

impl Options {
    /// Options producing `value` verbatim for every request.
    #[must_use]
    pub fn custom(value: impl Into<String>) -> Self {
        Self {
            id_type: IdType::Custom,
            custom_string: value.into(),
            ..Self::default()
        }
    }

    /// Apply `CORRELATION_HEADER_NAME`, `CORRELATION_ID_TYPE` and
    /// `CORRELATION_CUSTOM_STRING` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), CorrelationError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::apply_env_overrides`] with an arbitrary lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), CorrelationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(header_name) = lookup(ENV_HEADER_NAME) {
            self.header_name = header_name;
        }
        if let Some(id_type) = lookup(ENV_ID_TYPE) {
            self.id_type = id_type.parse().map_err(|message| CorrelationError::ConfigValidation {
                errors: vec![ValidationError {
                    field: ENV_ID_TYPE.into(),
                    message,
                    suggestion: None,
                }],
            })?;
        }
        if let Some(custom_string) = lookup(ENV_CUSTOM_STRING) {
            self.custom_string = custom_string;
        }
        Ok(())
    }
}
