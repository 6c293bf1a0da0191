//! Correlation identifier strategies.
//!
//! [`IdType`] is the serialisable selector found in [`Options`](crate::config::model::Options).
//! [`Strategy`] is its normalised form held by the middleware: the `Custom`
//! case carries the already-validated literal, the others carry nothing.
//!
//! Every generator is fallible internally (OS entropy, wall clock). The
//! public entry point [`Strategy::generate`] never fails: on error it logs
//! and substitutes a degraded identifier that still honours the strategy's
//! format, so a request is never blocked by an observability feature.

mod cuid;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use http::HeaderValue;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CorrelationError;

/// Last-resort value if even the degraded identifier is not a valid header value.
const FALLBACK_ID: &str = "00000000-0000-4000-8000-000000000000";

static FALLBACK_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// Random UUID v4 (default).
    #[default]
    Uuid,
    /// Collision-resistant, roughly sortable `c`-prefixed identifier.
    Cuid,
    /// Random non-negative 63-bit integer in decimal.
    Random,
    /// Unix epoch seconds in decimal.
    Time,
    /// The configured `custom_string`, verbatim.
    Custom,
}

impl IdType {
    pub const ALL: [Self; 5] = [Self::Uuid, Self::Cuid, Self::Random, Self::Time, Self::Custom];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Cuid => "cuid",
            Self::Random => "random",
            Self::Time => "time",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("'{s}' is not a valid id type (expected uuid, cuid, random, time or custom)")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Strategy {
    Uuid,
    Cuid,
    Random,
    Time,
    Custom(HeaderValue),
}

impl Strategy {
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Cuid => "cuid",
            Self::Random => "random",
            Self::Time => "time",
            Self::Custom(_) => "custom",
        }
    }

    /// Produce an identifier, falling back to a degraded one on failure.
    pub(crate) fn generate(&self) -> HeaderValue {
        self.generate_with(&mut OsRng)
    }

    /// [`Self::generate`] drawing randomness from `rng`.
    pub(crate) fn generate_with<R: RngCore>(&self, rng: &mut R) -> HeaderValue {
        match self.try_generate_with(rng) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    strategy = self.name(),
                    error = %e,
                    "correlation id generation failed, using degraded id"
                );
                self.fallback()
            }
        }
    }

    pub(crate) fn try_generate_with<R: RngCore>(
        &self,
        rng: &mut R,
    ) -> Result<HeaderValue, CorrelationError> {
        let id = match self {
            Self::Uuid => uuid_v4(rng)?,
            Self::Cuid => cuid::generate(rng)?,
            Self::Random => random(rng)?,
            Self::Time => unix_seconds()?,
            Self::Custom(value) => return Ok(value.clone()),
        };
        Ok(HeaderValue::from_str(&id)?)
    }

    /// Entropy-free identifier with the same shape as [`Self::try_generate_with`].
    pub(crate) fn fallback(&self) -> HeaderValue {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
        let seq = FALLBACK_SEQ.fetch_add(1, Ordering::Relaxed);
        let seed = nanos ^ seq.rotate_left(32);

        let id = match self {
            Self::Uuid => {
                let mut bytes = [0u8; 16];
                bytes[..8].copy_from_slice(&nanos.to_be_bytes());
                bytes[8..].copy_from_slice(&seq.to_be_bytes());
                uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
            }
            Self::Cuid => cuid::degraded(seed),
            Self::Random => (seed >> 1).to_string(),
            Self::Time => (nanos / 1_000_000_000).to_string(),
            Self::Custom(value) => return value.clone(),
        };
        HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_ID))
    }
}

fn uuid_v4<R: RngCore>(rng: &mut R) -> Result<String, CorrelationError> {
    let mut bytes = [0u8; 16];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
}

fn random<R: RngCore>(rng: &mut R) -> Result<String, CorrelationError> {
    let mut bytes = [0u8; 8];
    rng.try_fill_bytes(&mut bytes)?;
    // Drop the top bit so the value always fits an i64.
    Ok((u64::from_be_bytes(bytes) >> 1).to_string())
}

fn unix_seconds() -> Result<String, CorrelationError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .map_err(|_| CorrelationError::Clock)
}
