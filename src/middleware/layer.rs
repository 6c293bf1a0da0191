//! Tower [`Layer`] and [`Service`] wrapping a downstream service.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{Request, Response};
use tower::{Layer, Service};

use super::{Correlation, Mode};

/// Tower layer produced by [`Correlation::layer`] and [`Correlation::request_only_layer`].
#[derive(Debug, Clone)]
pub struct CorrelationLayer {
    correlation: Correlation,
    mode: Mode,
}

impl CorrelationLayer {
    pub(crate) const fn new(correlation: Correlation, mode: Mode) -> Self {
        Self { correlation, mode }
    }
}

impl<S> Layer<S> for CorrelationLayer {
    type Service = CorrelationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationService {
            inner,
            correlation: self.correlation.clone(),
            mode: self.mode,
        }
    }
}

/// Service tagging each request (and, in full mode, its response) before delegating to `S`.
#[derive(Debug, Clone)]
pub struct CorrelationService<S> {
    inner: S,
    correlation: Correlation,
    mode: Mode,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorrelationService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;

    type Error = S::Error;

    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let id = self.correlation.tag_request(&mut req);
        let future = self.inner.call(req);
        let respond = (self.mode == Mode::Full).then(|| (self.correlation.clone(), id));

        Box::pin(async move {
            let mut resp = future.await?;
            if let Some((correlation, id)) = respond {
                correlation.tag_response(&mut resp, id);
            }
            Ok(resp)
        })
    }
}
