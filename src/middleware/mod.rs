//! The correlation middleware.
//!
//! [`Correlation`] owns the normalised options and performs the per-request
//! work: forward an inbound identifier or generate one, write it to the
//! request headers and extensions, and (in full mode) to the response
//! headers. It is exposed to hosts in three shapes:
//!
//! - [`Correlation::wrap`] / [`Correlation::wrap_request_only`] wrap a
//!   `tower::Service` directly;
//! - [`Correlation::layer`] / [`Correlation::request_only_layer`] return a
//!   [`CorrelationLayer`] for `ServiceBuilder` or `Router::layer`;
//! - [`with_next`] / [`with_next_request_only`] are chain functions for
//!   `axum::middleware::from_fn_with_state`.

mod layer;

use std::fmt;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::request::Parts;
use http::{HeaderName, HeaderValue, StatusCode};
use tower::Layer;

pub use layer::{CorrelationLayer, CorrelationService};

use crate::config::model::{IdType, Options};
use crate::config::validation::validate_custom_string;
use crate::id::Strategy;

/// Header used when [`Options::header_name`] is empty.
pub const DEFAULT_HEADER: &str = "X-Correlation-ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Full,
    RequestOnly,
}

#[derive(Debug)]
struct Inner {
    header_name: HeaderName,
    strategy: Strategy,
}

/// Correlation ID middleware. Cheap to clone; holds only immutable config.
#[derive(Debug, Clone)]
pub struct Correlation {
    inner: Arc<Inner>,
}

impl Default for Correlation {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Correlation {
    /// Build the middleware, normalising `options`. Never fails: invalid
    /// values are replaced by the defaults and reported with `warn!`.
    #[must_use]
    pub fn new(options: Options) -> Self {
        let header_name = if options.header_name.is_empty() {
            HeaderName::from_static("x-correlation-id")
        } else if let Ok(name) = HeaderName::try_from(options.header_name.as_str()) {
            name
        } else {
            tracing::warn!(
                header = %options.header_name,
                default = DEFAULT_HEADER,
                "invalid correlation header name, using default"
            );
            HeaderName::from_static("x-correlation-id")
        };

        let strategy = match options.id_type {
            IdType::Uuid => Strategy::Uuid,
            IdType::Cuid => Strategy::Cuid,
            IdType::Random => Strategy::Random,
            IdType::Time => Strategy::Time,
            IdType::Custom => match validate_custom_string(&options.custom_string)
                .and_then(|()| {
                    HeaderValue::from_str(&options.custom_string).map_err(|e| e.to_string())
                }) {
                Ok(value) => Strategy::Custom(value),
                Err(reason) => {
                    tracing::warn!(reason = %reason, "unusable custom correlation id, using uuid");
                    Strategy::Uuid
                }
            },
        };

        Self {
            inner: Arc::new(Inner {
                header_name,
                strategy,
            }),
        }
    }

    /// The header read and written by this middleware (lowercase).
    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.inner.header_name
    }

    /// Generate one identifier with the configured strategy.
    #[must_use]
    pub fn generate(&self) -> HeaderValue {
        self.inner.strategy.generate()
    }

    /// Layer setting the identifier on both request and response.
    #[must_use]
    pub fn layer(&self) -> CorrelationLayer {
        CorrelationLayer::new(self.clone(), Mode::Full)
    }

    /// Layer setting the identifier on the request only.
    #[must_use]
    pub fn request_only_layer(&self) -> CorrelationLayer {
        CorrelationLayer::new(self.clone(), Mode::RequestOnly)
    }

    /// Wrap `service`, tagging both request and response.
    pub fn wrap<S>(&self, service: S) -> CorrelationService<S> {
        self.layer().layer(service)
    }

    /// Wrap `service`, tagging the request only.
    pub fn wrap_request_only<S>(&self, service: S) -> CorrelationService<S> {
        self.request_only_layer().layer(service)
    }

    /// Forward or generate the identifier and write it into `request`.
    pub(crate) fn tag_request<B>(&self, request: &mut http::Request<B>) -> HeaderValue {
        let name = &self.inner.header_name;
        let id = match request.headers().get(name) {
            Some(existing) if !existing.is_empty() => {
                tracing::debug!(header = %name, "forwarding inbound correlation id");
                existing.clone()
            }
            _ => {
                let id = self.generate();
                tracing::debug!(
                    header = %name,
                    strategy = self.inner.strategy.name(),
                    "generated correlation id"
                );
                id
            }
        };

        request.headers_mut().insert(name.clone(), id.clone());
        request.extensions_mut().insert(CorrelationId(id.clone()));
        id
    }

    pub(crate) fn tag_response<B>(&self, response: &mut http::Response<B>, id: HeaderValue) {
        response
            .headers_mut()
            .insert(self.inner.header_name.clone(), id);
    }
}

/// Chain function tagging request and response, for
/// `axum::middleware::from_fn_with_state(correlation, with_next)`.
pub async fn with_next(
    State(correlation): State<Correlation>,
    mut request: Request,
    next: Next,
) -> Response {
    let id = correlation.tag_request(&mut request);
    let mut response = next.run(request).await;
    correlation.tag_response(&mut response, id);
    response
}

/// Chain function tagging the request only.
pub async fn with_next_request_only(
    State(correlation): State<Correlation>,
    mut request: Request,
    next: Next,
) -> Response {
    correlation.tag_request(&mut request);
    next.run(request).await
}

/// The identifier of the current exchange.
///
/// Inserted into request extensions by the middleware and usable as an axum
/// extractor. Without the middleware, the extractor falls back to the
/// default header and rejects with `500` when that is absent too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(HeaderValue);

impl CorrelationId {
    /// The identifier exactly as sent in the header.
    #[must_use]
    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }

    /// The identifier as text, or `None` if it holds bytes outside visible ASCII.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.to_str().ok()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.0.as_bytes()))
    }
}

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(id.clone());
        }
        parts
            .headers
            .get(DEFAULT_HEADER)
            .filter(|v| !v.is_empty())
            .cloned()
            .map(Self)
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "correlation id middleware is not installed",
            ))
    }
}
