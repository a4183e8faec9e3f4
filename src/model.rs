//! Domain records returned by the clinic service.
//!
//! The service owns these records; the client only decodes them and keeps the
//! identifiers it needs to drive the next workflow step.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type RecordId = u64;

/// Department a visit is booked into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "GENERAL")]
    General,
    #[serde(rename = "ER")]
    Emergency,
    #[serde(rename = "CARDIOLOGY")]
    Cardiology,
    #[serde(rename = "ORTHOPEDICS")]
    Orthopedics,
    #[serde(rename = "PEDIATRICS")]
    Pediatrics,
    #[serde(rename = "NEUROLOGY")]
    Neurology,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::General,
        Department::Emergency,
        Department::Cardiology,
        Department::Orthopedics,
        Department::Pediatrics,
        Department::Neurology,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Department::General => "GENERAL",
            Department::Emergency => "ER",
            Department::Cardiology => "CARDIOLOGY",
            Department::Orthopedics => "ORTHOPEDICS",
            Department::Pediatrics => "PEDIATRICS",
            Department::Neurology => "NEUROLOGY",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Department::ALL
            .into_iter()
            .find(|d| d.code() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Department::ALL.iter().map(|d| d.code()).collect();
                format!("Unknown department '{}' (expected one of: {})", s.trim(), known.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitStatus {
    Registered,
    Vitals,
    Consultation,
    LabPending,
    LabInProgress,
    LabCompleted,
    BillingPending,
    Completed,
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VisitStatus::Registered => "REGISTERED",
            VisitStatus::Vitals => "VITALS",
            VisitStatus::Consultation => "CONSULTATION",
            VisitStatus::LabPending => "LAB_PENDING",
            VisitStatus::LabInProgress => "LAB_IN_PROGRESS",
            VisitStatus::LabCompleted => "LAB_COMPLETED",
            VisitStatus::BillingPending => "BILLING_PENDING",
            VisitStatus::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: RecordId,
    #[serde(rename = "rfidUid", default)]
    pub identity_token: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: RecordId,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub status: Option<VisitStatus>,
    #[serde(default)]
    pub temperature_celsius: Option<f64>,
    #[serde(default)]
    pub bp_systolic: Option<i32>,
    #[serde(default)]
    pub bp_diastolic: Option<i32>,
    #[serde(default)]
    pub heart_rate: Option<i32>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
}

/// Vital signs for a visit. `None` means "not measured", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp_systolic: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp_diastolic: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i32>,
}

impl VitalsRecord {
    pub fn is_empty(&self) -> bool {
        self.temperature_celsius.is_none()
            && self.bp_systolic.is_none()
            && self.bp_diastolic.is_none()
            && self.heart_rate.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub diagnosis: String,
    pub medications: String,
    pub tests_needed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabTestStatus {
    Ordered,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub id: RecordId,
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub price: f64,
    pub status: LabTestStatus,
    #[serde(default)]
    pub result_text: Option<String>,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

/// Payment state of a bill. The service reports unpaid items as `PENDING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    #[serde(alias = "PENDING")]
    Unpaid,
    Paid,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillStatus::Unpaid => f.write_str("UNPAID"),
            BillStatus::Paid => f.write_str("PAID"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillType {
    Consultation,
    LabTest,
    #[serde(other)]
    Other,
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillType::Consultation => f.write_str("CONSULTATION"),
            BillType::LabTest => f.write_str("LAB_TEST"),
            BillType::Other => f.write_str("OTHER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: RecordId,
    #[serde(default)]
    pub item_description: String,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub amount: f64,
    pub status: BillStatus,
    #[serde(default)]
    pub paid_at: Option<NaiveDateTime>,
}

impl Bill {
    pub fn is_payable(&self) -> bool {
        self.status == BillStatus::Unpaid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: RecordId,
    pub balance: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTestLine {
    pub id: RecordId,
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub result_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingLine {
    pub id: RecordId,
    #[serde(rename = "type", default)]
    pub bill_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    #[serde(default)]
    pub items: Vec<BillingLine>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub total_paid: f64,
    #[serde(default)]
    pub total_due: f64,
    #[serde(default)]
    pub fully_paid: bool,
}

/// Consolidated view of one visit, returned by discharge and summary lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    pub visit_id: RecordId,
    #[serde(default)]
    pub status: Option<VisitStatus>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub vitals: Option<VitalsRecord>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub lab_tests: Vec<LabTestLine>,
    #[serde(default)]
    pub billing: Option<BillingSummary>,
    #[serde(default)]
    pub discharged_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_department_parsing_is_case_insensitive() {
        assert_eq!("er".parse::<Department>().unwrap(), Department::Emergency);
        assert_eq!(" Cardiology ".parse::<Department>().unwrap(), Department::Cardiology);
        assert!("DENTAL".parse::<Department>().is_err());
    }

    #[test]
    fn test_bill_accepts_pending_as_unpaid() {
        let bill: Bill = serde_json::from_value(json!({
            "id": 5,
            "itemDescription": "Consultation fee",
            "type": "CONSULTATION",
            "amount": 300.0,
            "status": "PENDING"
        }))
        .unwrap();

        assert_eq!(bill.status, BillStatus::Unpaid);
        assert!(bill.is_payable());
    }

    #[test]
    fn test_unknown_bill_type_maps_to_other() {
        let bill: Bill = serde_json::from_value(json!({
            "id": 6,
            "itemDescription": "Bed charge",
            "type": "WARD",
            "amount": 80,
            "status": "PAID"
        }))
        .unwrap();

        assert_eq!(bill.bill_type, BillType::Other);
        assert!(!bill.is_payable());
    }

    #[test]
    fn test_empty_vitals_serialize_to_empty_object() {
        let body = serde_json::to_value(VitalsRecord::default()).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_visit_status_displays_wire_name() {
        assert_eq!(VisitStatus::LabPending.to_string(), "LAB_PENDING");
        for status in [VisitStatus::LabInProgress, VisitStatus::BillingPending, VisitStatus::Completed] {
            assert_eq!(serde_json::to_value(&status).unwrap(), serde_json::json!(status.to_string()));
        }
    }
}
