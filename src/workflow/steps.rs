// Guarded workflow transitions
//
// Every step checks its session preconditions before touching the transport,
// and only mutates the session after the service accepted the request.

use serde::de::IgnoredAny;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{self, DischargeRequest, PaymentRequest, RegisterRequest, StartVisitRequest, UpdateLabStatusRequest, WalletTopUpRequest};
use crate::model::{Bill, Department, LabTest, LabTestStatus, Patient, RecordId, Visit, VisitSummary, Wallet};
use crate::session::SessionState;
use crate::transport::{self, Transport};

use super::inputs::{self, ConsultForm, OrderTestForm, TopUpForm, VitalsForm};
use super::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Register,
    StartVisit,
    RecordVitals,
    Consult,
    OrderTest,
    CompleteTest,
    ListBills,
    PayBill,
    Discharge,
    VisitSummary,
    TopUpWallet,
    WalletBalance,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Register => "register",
            Step::StartVisit => "start_visit",
            Step::RecordVitals => "record_vitals",
            Step::Consult => "consult",
            Step::OrderTest => "order_test",
            Step::CompleteTest => "complete_test",
            Step::ListBills => "list_bills",
            Step::PayBill => "pay_bill",
            Step::Discharge => "discharge",
            Step::VisitSummary => "visit_summary",
            Step::TopUpWallet => "top_up_wallet",
            Step::WalletBalance => "wallet_balance",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bills for one visit. An empty listing is a valid result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct BillListing {
    pub visit_id: RecordId,
    pub bills: Vec<Bill>,
}

impl BillListing {
    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepSuccess {
    Registered { patient: Patient },
    VisitStarted { visit: Visit },
    VitalsRecorded { visit: Visit },
    ConsultationSaved { visit_id: RecordId, tests_needed: bool },
    TestOrdered { test: LabTest },
    TestCompleted { test: LabTest },
    Bills(BillListing),
    /// Payment accepted; `refresh` is the follow-up bill listing
    BillPaid {
        billing_id: RecordId,
        refresh: Result<BillListing, WorkflowError>,
    },
    Discharged(VisitSummary),
    Summary(VisitSummary),
    WalletToppedUp(Wallet),
    WalletBalance(Wallet),
}

/// Drives workflow steps against the clinic service.
///
/// The workflow itself is stateless; the caller owns the [`SessionState`] and
/// lends it to each step. The exclusive borrow means two steps can never run
/// against the same session at once.
#[derive(Clone)]
pub struct ClinicWorkflow {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ClinicWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClinicWorkflow").finish_non_exhaustive()
    }
}

impl ClinicWorkflow {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn register(
        &self,
        session: &mut SessionState,
        identity_token: &str,
        full_name: Option<&str>,
    ) -> Result<StepSuccess, WorkflowError> {
        let token = identity_token.trim();
        if token.is_empty() {
            return Err(WorkflowError::validation("Enter RFID UID"));
        }

        let request = RegisterRequest {
            rfid_uid: token.to_string(),
            full_name: inputs::patient_name(full_name),
        };
        let patient: Patient = transport::call(self.transport.as_ref(), api::register(&request)?).await?;

        session.registered(request.rfid_uid, patient.id);
        info!(patient_id = patient.id, "Patient registered");
        Ok(StepSuccess::Registered { patient })
    }

    pub async fn start_visit(
        &self,
        session: &mut SessionState,
        department: Department,
    ) -> Result<StepSuccess, WorkflowError> {
        let request = StartVisitRequest {
            rfid_uid: session.require_token()?.to_string(),
            department,
        };
        let visit: Visit = transport::call(self.transport.as_ref(), api::start_visit(&request)?).await?;

        session.visit_started(visit.id);
        info!(visit_id = visit.id, department = %department, "Visit started");
        Ok(StepSuccess::VisitStarted { visit })
    }

    pub async fn record_vitals(
        &self,
        session: &mut SessionState,
        form: &VitalsForm,
    ) -> Result<StepSuccess, WorkflowError> {
        let visit_id = session.require_visit()?;
        let vitals = form.parse()?;
        if vitals.is_empty() {
            warn!(visit_id, "Recording vitals with no measured fields");
        }

        let visit: Visit = transport::call(self.transport.as_ref(), api::record_vitals(visit_id, &vitals)?).await?;
        info!(visit_id = visit.id, "Vitals recorded");
        Ok(StepSuccess::VitalsRecorded { visit })
    }

    pub async fn consult(
        &self,
        session: &mut SessionState,
        form: &ConsultForm,
    ) -> Result<StepSuccess, WorkflowError> {
        let visit_id = session.require_visit()?;
        let request = form.to_request();

        let _: IgnoredAny = transport::call(self.transport.as_ref(), api::consultation(visit_id, &request)?).await?;
        info!(visit_id, tests_needed = request.tests_needed, "Consultation saved");
        Ok(StepSuccess::ConsultationSaved {
            visit_id,
            tests_needed: request.tests_needed,
        })
    }

    pub async fn order_test(
        &self,
        session: &mut SessionState,
        form: &OrderTestForm,
    ) -> Result<StepSuccess, WorkflowError> {
        let visit_id = session.require_visit()?;
        let request = form.to_request()?;

        let test: LabTest = transport::call(self.transport.as_ref(), api::order_lab_test(visit_id, &request)?).await?;
        session.test_ordered(test.id);
        info!(visit_id, test_id = test.id, test_name = %test.test_name, "Lab test ordered");
        Ok(StepSuccess::TestOrdered { test })
    }

    pub async fn complete_test(
        &self,
        session: &mut SessionState,
        result_text: Option<&str>,
    ) -> Result<StepSuccess, WorkflowError> {
        let test_id = session.require_lab_test()?;
        let request = UpdateLabStatusRequest {
            status: LabTestStatus::Completed,
            result_text: inputs::result_text(result_text),
        };

        let test: LabTest = transport::call(self.transport.as_ref(), api::update_lab_status(test_id, &request)?).await?;
        info!(test_id = test.id, "Lab test completed");
        Ok(StepSuccess::TestCompleted { test })
    }

    pub async fn list_bills(&self, session: &mut SessionState) -> Result<StepSuccess, WorkflowError> {
        self.fetch_bills(session).await.map(StepSuccess::Bills)
    }

    async fn fetch_bills(&self, session: &mut SessionState) -> Result<BillListing, WorkflowError> {
        let visit_id = session.require_visit()?;
        let mut bills: Vec<Bill> = transport::call(self.transport.as_ref(), api::bills_for_visit(visit_id)).await?;

        for bill_id in session.reconcile_bills(&mut bills) {
            warn!(visit_id, bill_id, "Service reported a paid bill as unpaid; keeping PAID");
        }
        info!(visit_id, count = bills.len(), "Bills fetched");
        Ok(BillListing { visit_id, bills })
    }

    pub async fn pay_bill(
        &self,
        session: &mut SessionState,
        billing_id: RecordId,
    ) -> Result<StepSuccess, WorkflowError> {
        let request = PaymentRequest {
            rfid_uid: session.require_token()?.to_string(),
            billing_id,
        };
        if session.is_known_paid(billing_id) {
            return Err(WorkflowError::validation("Bill already paid"));
        }

        let _: IgnoredAny = transport::call(self.transport.as_ref(), api::pay_bill(&request)?).await?;
        session.bill_paid(billing_id);
        info!(billing_id, "Bill paid");

        let refresh = self.fetch_bills(session).await;
        Ok(StepSuccess::BillPaid { billing_id, refresh })
    }

    pub async fn discharge(&self, session: &mut SessionState) -> Result<StepSuccess, WorkflowError> {
        let request = DischargeRequest {
            rfid_uid: session.require_token()?.to_string(),
        };

        let summary: VisitSummary = transport::call(self.transport.as_ref(), api::discharge(&request)?).await?;
        info!(visit_id = summary.visit_id, "Patient discharged");
        Ok(StepSuccess::Discharged(summary))
    }

    pub async fn visit_summary(&self, session: &mut SessionState) -> Result<StepSuccess, WorkflowError> {
        let visit_id = session.require_visit()?;
        let summary: VisitSummary = transport::call(self.transport.as_ref(), api::visit_summary(visit_id)).await?;
        Ok(StepSuccess::Summary(summary))
    }

    pub async fn top_up_wallet(
        &self,
        session: &mut SessionState,
        form: &TopUpForm,
    ) -> Result<StepSuccess, WorkflowError> {
        let token = session.require_token()?.to_string();
        let request = WalletTopUpRequest {
            rfid_uid: token,
            amount: form.amount()?,
            payment_method: form.payment_method(),
        };

        let wallet: Wallet = transport::call(self.transport.as_ref(), api::wallet_top_up(&request)?).await?;
        info!(wallet_id = wallet.id, amount = request.amount, "Wallet topped up");
        Ok(StepSuccess::WalletToppedUp(wallet))
    }

    pub async fn wallet_balance(&self, session: &mut SessionState) -> Result<StepSuccess, WorkflowError> {
        let token = session.require_token()?;
        let wallet: Wallet = transport::call(self.transport.as_ref(), api::wallet_by_token(token)?).await?;
        Ok(StepSuccess::WalletBalance(wallet))
    }
}
