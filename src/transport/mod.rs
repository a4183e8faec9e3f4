//! Request/response transport to the clinic service
//!
//! The workflow only ever talks to the service through the [`Transport`] trait,
//! so steps can be driven by the real HTTP client or by test doubles.

pub mod request;
pub mod http;

pub use request::{call, ApiRequest, Method, Transport, TransportError};
pub use http::HttpTransport;
