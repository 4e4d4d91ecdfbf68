pub mod logging;
pub mod trace_context;

pub use logging::init_tracing;
pub use trace_context::{
    REQUEST_ID_HEADER, TRACEPARENT_HEADER, TracedRequestExt, current_traceparent,
    extract_request_id, inject_trace_headers,
};
