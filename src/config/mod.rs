//! Options loading and validation.
//!
//! [`parse_options_str`] deserialises [`Options`](model::Options) from a
//! YAML, JSON or TOML string (each format behind its cargo feature),
//! [`load`] reads, parses and validates an options file, and [`discover`]
//! resolves an explicit path or auto-detects `correlation.{yaml,yml,json,toml}`
//! in the working directory. Hosts that build options in code can skip this
//! module entirely.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::CorrelationError;
use model::Options;
use validation::validate;

/// File names checked by [`discover`], in priority order.
pub const CANDIDATES: [&str; 4] = [
    "correlation.yaml",
    "correlation.yml",
    "correlation.json",
    "correlation.toml",
];

/// Parse an options string based on file extension.
pub fn parse_options_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Options, CorrelationError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| CorrelationError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| CorrelationError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| CorrelationError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(CorrelationError::UnsupportedFormat(other.to_string())),
    }
}

/// Read, parse and validate an options file. The format follows the extension.
pub async fn load(path: impl AsRef<Path>) -> Result<Options, CorrelationError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CorrelationError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CorrelationError::Io(e)
        }
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let options = parse_options_str(&ext, &content, &path.display().to_string())?;

    validate(&options).map_err(|errors| CorrelationError::ConfigValidation { errors })?;

    tracing::debug!(
        path = %path.display(),
        header = %options.header_name,
        id_type = %options.id_type,
        "loaded correlation options"
    );
    Ok(options)
}

/// Load `explicit` if given, else the first [`CANDIDATES`] file present in
/// the working directory, else default options. Environment overrides are
/// applied last.
pub async fn discover(explicit: Option<&Path>) -> Result<Options, CorrelationError> {
    discover_with(explicit, |key| std::env::var(key).ok()).await
}

/// Same as [`discover`], reading overrides through `lookup` instead of the
/// process environment.
pub async fn discover_with<F>(
    explicit: Option<&Path>,
    lookup: F,
) -> Result<Options, CorrelationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut options = if let Some(path) = explicit {
        load(path).await?
    } else {
        let mut found = None;
        for name in &CANDIDATES {
            let path = PathBuf::from(name);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tracing::info!(path = %path.display(), "auto-detected correlation options file");
                found = Some(load(&path).await?);
                break;
            }
        }
        found.unwrap_or_default()
    };

    options.apply_overrides_from(lookup)?;
    validate(&options).map_err(|errors| CorrelationError::ConfigValidation { errors })?;
    Ok(options)
}
