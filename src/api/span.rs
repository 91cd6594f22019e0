use reqwest::{Request, Response};
use reqwest_tracing::{default_on_request_end, reqwest_otel_span, ReqwestOtelSpanBackend};
use std::time::Instant;
use task_local_extensions::Extensions;

/// Names spans after the API endpoint and records how long each request took.
pub struct ApiSpanBackend;

impl ReqwestOtelSpanBackend for ApiSpanBackend {
    fn on_request_start(req: &Request, extension: &mut Extensions) -> tracing::Span {
        extension.insert(Instant::now());
        reqwest_otel_span!(
            name = format!("api {} {}", req.method(), req.url().path()),
            req,
            time_elapsed_ms = tracing::field::Empty
        )
    }

    fn on_request_end(
        span: &tracing::Span,
        outcome: &reqwest_middleware::Result<Response>,
        extension: &mut Extensions,
    ) {
        default_on_request_end(span, outcome);
        if let Some(start) = extension.get::<Instant>() {
            span.record("time_elapsed_ms", start.elapsed().as_millis() as i64);
        }
    }
}
