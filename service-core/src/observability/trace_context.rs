//! W3C trace context propagation for outbound HTTP calls.
//!
//! See: https://www.w3.org/TR/trace-context/

use http::HeaderMap;
use opentelemetry::trace::TraceContextExt;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Header name for W3C traceparent
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header name for request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `traceparent` value for the current span, if it belongs to a sampled or
/// remote OpenTelemetry trace.
pub fn current_traceparent() -> Option<String> {
    let context = Span::current().context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if !span_context.is_valid() {
        return None;
    }

    // version-trace_id-span_id-trace_flags
    Some(format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    ))
}

/// Add `traceparent` (when a trace is active) and `x-request-id` to outbound
/// headers.
pub fn inject_trace_headers(headers: &mut HeaderMap, request_id: Option<&str>) {
    if let Some(value) = current_traceparent().and_then(|tp| tp.parse().ok()) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    if let Some(value) = request_id.and_then(|id| id.parse().ok()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
}

/// Request ID carried by inbound headers.
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Attach trace propagation headers to a `reqwest` request.
pub trait TracedRequestExt {
    fn with_trace_context(self, request_id: Option<&str>) -> Self;
}

impl TracedRequestExt for reqwest::RequestBuilder {
    fn with_trace_context(self, request_id: Option<&str>) -> Self {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, request_id);
        self.headers(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_traceparent_without_active_trace() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, None);
        assert!(headers.is_empty());
    }

    #[test]
    fn request_id_is_propagated() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("abc-123"));
        assert_eq!(extract_request_id(&headers), Some("abc-123".to_string()));
        assert!(!headers.contains_key(TRACEPARENT_HEADER));
    }

    #[test]
    fn unrepresentable_request_id_is_dropped() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("bad\nid"));
        assert!(headers.is_empty());
    }
}
