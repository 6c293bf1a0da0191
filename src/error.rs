//! Unified error types for the correlation middleware.
//!
//! Defines [`CorrelationError`] (the main crate error enum) and
//! [`ValidationError`] for options validation failures. Both use
//! `thiserror` for `Display` and `Error` derives where possible.
//!
//! Generation errors ([`CorrelationError::Entropy`],
//! [`CorrelationError::Clock`]) never leave the middleware: the request
//! proceeds with a degraded identifier instead.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CorrelationError {
    #[error("Random source unavailable: {0}")]
    Entropy(#[from] rand::Error),

    #[error("System clock is set before the Unix epoch")]
    Clock,

    #[error("Generated identifier is not a valid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("Options file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Options parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Options validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported options format: '{0}'")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
