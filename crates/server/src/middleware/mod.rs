//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the span, echoed in the response)
//! 4. Panic catcher (500 JSON instead of a dropped connection)
//! 5. CORS
//! 6. Security headers

pub mod cors;
pub mod request_id;
pub mod security_headers;

pub use cors::cors_layer;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
