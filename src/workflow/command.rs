use tracing::{error, warn, Instrument};

use crate::model::{Department, RecordId};
use crate::session::SessionState;
use crate::telemetry::{create_step_span, generate_correlation_id};

use super::inputs::{ConsultForm, OrderTestForm, TopUpForm, VitalsForm};
use super::steps::{ClinicWorkflow, Step, StepSuccess};
use super::WorkflowError;

/// One externally triggered workflow step with its operator input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register {
        identity_token: String,
        full_name: Option<String>,
    },
    StartVisit {
        department: Department,
    },
    RecordVitals(VitalsForm),
    Consult(ConsultForm),
    OrderTest(OrderTestForm),
    CompleteTest {
        result_text: Option<String>,
    },
    ListBills,
    PayBill {
        billing_id: RecordId,
    },
    Discharge,
    VisitSummary,
    TopUpWallet(TopUpForm),
    WalletBalance,
}

impl Command {
    pub fn step(&self) -> Step {
        match self {
            Command::Register { .. } => Step::Register,
            Command::StartVisit { .. } => Step::StartVisit,
            Command::RecordVitals(_) => Step::RecordVitals,
            Command::Consult(_) => Step::Consult,
            Command::OrderTest(_) => Step::OrderTest,
            Command::CompleteTest { .. } => Step::CompleteTest,
            Command::ListBills => Step::ListBills,
            Command::PayBill { .. } => Step::PayBill,
            Command::Discharge => Step::Discharge,
            Command::VisitSummary => Step::VisitSummary,
            Command::TopUpWallet(_) => Step::TopUpWallet,
            Command::WalletBalance => Step::WalletBalance,
        }
    }
}

/// Result of one dispatched step, ready for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: Step,
    pub correlation_id: String,
    pub outcome: Result<StepSuccess, WorkflowError>,
}

impl StepReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl ClinicWorkflow {
    /// Run one command against `session`. Failures are captured in the report;
    /// nothing propagates past the step boundary.
    pub async fn run(&self, session: &mut SessionState, command: Command) -> StepReport {
        let step = command.step();
        let correlation_id = generate_correlation_id();
        let span = create_step_span(step.name(), &correlation_id, session.visit_id());

        let outcome = self.execute(session, command).instrument(span).await;
        match &outcome {
            Err(WorkflowError::Validation { message }) => {
                warn!(step = %step, correlation_id = %correlation_id, "Step refused: {}", message);
            }
            Err(WorkflowError::Remote { source }) => {
                error!(step = %step, correlation_id = %correlation_id, "Step failed: {}", source);
            }
            Ok(_) => {}
        }

        StepReport {
            step,
            correlation_id,
            outcome,
        }
    }

    async fn execute(&self, session: &mut SessionState, command: Command) -> Result<StepSuccess, WorkflowError> {
        match command {
            Command::Register {
                identity_token,
                full_name,
            } => self.register(session, &identity_token, full_name.as_deref()).await,
            Command::StartVisit { department } => self.start_visit(session, department).await,
            Command::RecordVitals(form) => self.record_vitals(session, &form).await,
            Command::Consult(form) => self.consult(session, &form).await,
            Command::OrderTest(form) => self.order_test(session, &form).await,
            Command::CompleteTest { result_text } => self.complete_test(session, result_text.as_deref()).await,
            Command::ListBills => self.list_bills(session).await,
            Command::PayBill { billing_id } => self.pay_bill(session, billing_id).await,
            Command::Discharge => self.discharge(session).await,
            Command::VisitSummary => self.visit_summary(session).await,
            Command::TopUpWallet(form) => self.top_up_wallet(session, &form).await,
            Command::WalletBalance => self.wallet_balance(session).await,
        }
    }
}
