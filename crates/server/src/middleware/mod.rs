//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)

pub mod credential;
pub mod request_id;

pub use credential::AuthorizationHeader;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
