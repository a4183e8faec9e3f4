//! Typed request bodies and endpoint constructors for the clinic service
//!
//! Each endpoint gets one request struct and one function producing the
//! [`ApiRequest`]; paths live here and nowhere else.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::model::{Department, LabTestStatus, RecordId, VitalsRecord};
use crate::transport::{ApiRequest, TransportError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub rfid_uid: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartVisitRequest {
    pub rfid_uid: String,
    pub department: Department,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    pub diagnosis: String,
    pub medications: String,
    pub tests_needed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLabTestRequest {
    pub test_name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLabStatusRequest {
    pub status: LabTestStatus,
    pub result_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub rfid_uid: String,
    pub billing_id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DischargeRequest {
    pub rfid_uid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTopUpRequest {
    pub rfid_uid: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

fn body<T: Serialize>(payload: &T) -> Result<Value, TransportError> {
    serde_json::to_value(payload).map_err(|e| TransportError::InvalidRequest {
        message: format!("could not encode request body: {e}"),
    })
}

/// `prefix` followed by `segment` as one percent-encoded path segment
fn path_with_segment(prefix: &str, segment: &str) -> Result<String, TransportError> {
    let invalid = |message: String| TransportError::InvalidRequest { message };

    let mut url = Url::parse("http://service.invalid")
        .and_then(|base| base.join(prefix))
        .map_err(|e| invalid(format!("bad route {prefix}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| invalid(format!("bad route {prefix}")))?
        .pop_if_empty()
        .push(segment);
    Ok(url.path().to_string())
}

pub fn register(request: &RegisterRequest) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post("/api/registration", body(request)?))
}

pub fn start_visit(request: &StartVisitRequest) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post("/api/visits/start", body(request)?))
}

pub fn record_vitals(visit_id: RecordId, vitals: &VitalsRecord) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post(format!("/api/visits/{visit_id}/vitals"), body(vitals)?))
}

pub fn consultation(visit_id: RecordId, request: &ConsultationRequest) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post(format!("/api/visits/{visit_id}/consultation"), body(request)?))
}

pub fn order_lab_test(visit_id: RecordId, request: &OrderLabTestRequest) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post(format!("/api/lab/{visit_id}/order"), body(request)?))
}

pub fn update_lab_status(test_id: RecordId, request: &UpdateLabStatusRequest) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post(format!("/api/lab/tests/{test_id}/status"), body(request)?))
}

pub fn bills_for_visit(visit_id: RecordId) -> ApiRequest {
    ApiRequest::get(format!("/api/billing/visit/{visit_id}"))
}

pub fn pay_bill(request: &PaymentRequest) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post("/api/billing/pay", body(request)?))
}

pub fn discharge(request: &DischargeRequest) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post("/api/visits/discharge", body(request)?))
}

pub fn visit_summary(visit_id: RecordId) -> ApiRequest {
    ApiRequest::get(format!("/api/visits/{visit_id}/summary"))
}

pub fn wallet_top_up(request: &WalletTopUpRequest) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::post("/api/wallet/topup", body(request)?))
}

/// The token is opaque; reserved characters are escaped, never routed on.
pub fn wallet_by_token(identity_token: &str) -> Result<ApiRequest, TransportError> {
    Ok(ApiRequest::get(path_with_segment("/api/wallet/rfid/", identity_token)?))
}
