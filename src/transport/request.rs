//! Transport abstraction
//!
//! Provides the foundational trait for issuing requests against the clinic
//! service, enabling dependency injection for testing.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A single call against the service: method, path and optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// Non-2xx answer. `message` is the response body, or the status reason
    /// phrase when the body was empty.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Network error: {message}")]
    Network { message: String },
    #[error("Invalid response from service: {message}")]
    InvalidResponse { message: String },
    /// The request could not be built; nothing was sent
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

/// Trait for issuing requests against the clinic service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the parsed payload. Empty or non-JSON success
    /// bodies come back as `Value::Null` or `Value::String`.
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

/// Send `request` and decode the payload into `T`.
///
/// Shape mismatches surface here as [`TransportError::InvalidResponse`], so
/// callers never pick fields out of untyped JSON.
pub async fn call<T, R>(transport: &R, request: ApiRequest) -> Result<T, TransportError>
where
    T: DeserializeOwned,
    R: Transport + ?Sized,
{
    let label = format!("{} {}", request.method, request.path);
    let payload = transport.send(request).await?;
    debug!(request = %label, "Decoding service response");

    serde_json::from_value(payload).map_err(|e| TransportError::InvalidResponse {
        message: format!("{label}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LabTest;
    use serde::de::IgnoredAny;
    use serde_json::json;

    struct FixedTransport(Value);

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(&self, _request: ApiRequest) -> Result<Value, TransportError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_call_decodes_typed_payload() {
        let transport = FixedTransport(json!({"id": 100, "testName": "CBC", "price": 150, "status": "ORDERED"}));
        let test: LabTest = call(&transport, ApiRequest::get("/api/lab/100")).await.unwrap();

        assert_eq!(test.id, 100);
        assert_eq!(test.test_name, "CBC");
    }

    #[tokio::test]
    async fn test_call_reports_shape_mismatch() {
        let transport = FixedTransport(json!({"unexpected": true}));
        let result: Result<LabTest, _> = call(&transport, ApiRequest::post("/api/lab/10/order", json!({}))).await;

        match result {
            Err(TransportError::InvalidResponse { message }) => {
                assert!(message.starts_with("POST /api/lab/10/order"));
            }
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_acknowledgement_accepts_any_payload() {
        for payload in [Value::Null, json!("ok"), json!({"id": 10})] {
            let transport = FixedTransport(payload);
            let ack: Result<IgnoredAny, _> = call(&transport, ApiRequest::get("/ack")).await;
            assert!(ack.is_ok());
        }
    }

    #[test]
    fn test_status_error_displays_service_message_verbatim() {
        let err = TransportError::Status {
            status: 400,
            message: "Patient not found".to_string(),
        };
        assert_eq!(err.to_string(), "Patient not found");
    }
}
