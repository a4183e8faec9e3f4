//! Operator-supplied step inputs
//!
//! Inputs arrive as raw text the way an operator typed them. Blank text means
//! "use the default" or "not measured"; it is never coerced to zero.

use std::str::FromStr;

use crate::api::{ConsultationRequest, OrderLabTestRequest};
use crate::model::VitalsRecord;

use super::WorkflowError;

pub const DEFAULT_PATIENT_NAME: &str = "Demo Patient";
pub const DEFAULT_DIAGNOSIS: &str = "OK";
pub const DEFAULT_MEDICATIONS: &str = "N/A";
pub const DEFAULT_TEST_NAME: &str = "CBC";
pub const DEFAULT_TEST_PRICE: f64 = 150.0;
pub const DEFAULT_RESULT_TEXT: &str = "Normal";

/// Numeric types an operator can type into a form field
pub trait FieldNumber: FromStr {
    /// `false` for values that parse but cannot go on the wire (NaN, infinities)
    fn is_finite_number(&self) -> bool;
}

impl FieldNumber for f64 {
    fn is_finite_number(&self) -> bool {
        self.is_finite()
    }
}

impl FieldNumber for i32 {
    fn is_finite_number(&self) -> bool {
        true
    }
}

/// Parse an optional numeric field. Blank text yields `None`.
pub fn parse_optional<T: FieldNumber>(field: &str, text: &str) -> Result<Option<T>, WorkflowError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<T>() {
        Ok(value) if value.is_finite_number() => Ok(Some(value)),
        _ => Err(WorkflowError::validation(format!("{field} must be a number, got '{trimmed}'"))),
    }
}

fn text_or(text: &str, default: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitalsForm {
    pub temperature: String,
    pub bp_systolic: String,
    pub bp_diastolic: String,
    pub heart_rate: String,
}

impl VitalsForm {
    pub fn parse(&self) -> Result<VitalsRecord, WorkflowError> {
        Ok(VitalsRecord {
            temperature_celsius: parse_optional("temperature", &self.temperature)?,
            bp_systolic: parse_optional("systolic pressure", &self.bp_systolic)?,
            bp_diastolic: parse_optional("diastolic pressure", &self.bp_diastolic)?,
            heart_rate: parse_optional("heart rate", &self.heart_rate)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsultForm {
    pub diagnosis: String,
    pub medications: String,
    pub tests_needed: bool,
}

impl ConsultForm {
    pub fn to_request(&self) -> ConsultationRequest {
        ConsultationRequest {
            diagnosis: text_or(&self.diagnosis, DEFAULT_DIAGNOSIS),
            medications: text_or(&self.medications, DEFAULT_MEDICATIONS),
            tests_needed: self.tests_needed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderTestForm {
    pub test_name: String,
    pub price: String,
}

impl OrderTestForm {
    pub fn to_request(&self) -> Result<OrderLabTestRequest, WorkflowError> {
        Ok(OrderLabTestRequest {
            test_name: text_or(&self.test_name, DEFAULT_TEST_NAME),
            price: parse_optional("price", &self.price)?.unwrap_or(DEFAULT_TEST_PRICE),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopUpForm {
    pub amount: String,
    pub payment_method: Option<String>,
}

impl TopUpForm {
    pub fn amount(&self) -> Result<f64, WorkflowError> {
        match parse_optional::<f64>("amount", &self.amount)? {
            None => Err(WorkflowError::validation("Enter an amount")),
            Some(amount) if amount <= 0.0 => {
                Err(WorkflowError::validation("Amount must be greater than zero"))
            }
            Some(amount) => Ok(amount),
        }
    }

    pub fn payment_method(&self) -> Option<String> {
        self.payment_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }
}

pub(crate) fn patient_name(full_name: Option<&str>) -> String {
    text_or(full_name.unwrap_or_default(), DEFAULT_PATIENT_NAME)
}

pub(crate) fn result_text(text: Option<&str>) -> String {
    text_or(text.unwrap_or_default(), DEFAULT_RESULT_TEXT)
}
