//! Text rendering of step outcomes
//!
//! Pure formatting over [`StepReport`] values; no workflow decisions are made
//! here. Bill listings become a [`BillBoard`] whose rows say whether the pay
//! action is offered.

use std::fmt;

use crate::model::{Bill, RecordId, VisitSummary, Wallet};
use crate::session::{SessionPhase, SessionState};
use crate::workflow::{BillListing, StepReport, StepSuccess, WorkflowError};

pub const NO_BILLS: &str = "No bills.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayAction {
    Available,
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillRow {
    pub bill: Bill,
    pub pay_action: PayAction,
}

/// View model for a bill listing
#[derive(Debug, Clone, PartialEq)]
pub struct BillBoard {
    pub visit_id: RecordId,
    pub rows: Vec<BillRow>,
}

impl BillBoard {
    pub fn from_listing(listing: &BillListing) -> Self {
        let rows = listing
            .bills
            .iter()
            .map(|bill| BillRow {
                bill: bill.clone(),
                pay_action: if bill.is_payable() {
                    PayAction::Available
                } else {
                    PayAction::Disabled
                },
            })
            .collect();

        Self {
            visit_id: listing.visit_id,
            rows,
        }
    }

    /// Pay action for `bill_id`, or `None` when the bill is not on the board
    pub fn pay_action(&self, bill_id: RecordId) -> Option<PayAction> {
        self.rows
            .iter()
            .find(|row| row.bill.id == bill_id)
            .map(|row| row.pay_action)
    }

    pub fn payable_ids(&self) -> Vec<RecordId> {
        self.rows
            .iter()
            .filter(|row| row.pay_action == PayAction::Available)
            .map(|row| row.bill.id)
            .collect()
    }
}

impl fmt::Display for BillBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return f.write_str(NO_BILLS);
        }

        writeln!(
            f,
            "{:>6}  {:<32}  {:<14}  {:>10}  {:<7}  {}",
            "ID", "Item", "Type", "Amount", "Status", "Action"
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            let action = match row.pay_action {
                PayAction::Available => format!("pay {}", row.bill.id),
                PayAction::Disabled => "-".to_string(),
            };
            write!(
                f,
                "{:>6}  {:<32}  {:<14}  {:>10.2}  {:<7}  {}",
                row.bill.id,
                row.bill.item_description,
                row.bill.bill_type.to_string(),
                row.bill.amount,
                row.bill.status.to_string(),
                action
            )?;
            if i + 1 < self.rows.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

fn render_error(error: &WorkflowError) -> String {
    format!("Error: {error}")
}

fn render_summary(summary: &VisitSummary) -> String {
    let mut lines = vec![format!("Visit {}", summary.visit_id)];
    if let Some(status) = &summary.status {
        lines.push(format!("  status: {status}"));
    }
    if let Some(name) = &summary.patient_name {
        lines.push(format!("  patient: {name}"));
    }
    if let Some(doctor) = &summary.doctor_name {
        lines.push(format!("  doctor: {doctor}"));
    }
    if let Some(department) = &summary.department {
        lines.push(format!("  department: {department}"));
    }
    if let Some(diagnosis) = &summary.diagnosis {
        lines.push(format!("  diagnosis: {diagnosis}"));
    }
    for test in &summary.lab_tests {
        lines.push(format!(
            "  lab {} {} [{}] {}",
            test.id,
            test.test_name,
            test.status,
            test.result_text.as_deref().unwrap_or("")
        ));
    }
    if let Some(billing) = &summary.billing {
        lines.push(format!(
            "  billed {:.2}, paid {:.2}, due {:.2}{}",
            billing.total_amount,
            billing.total_paid,
            billing.total_due,
            if billing.fully_paid { " (settled)" } else { "" }
        ));
    }
    lines.join("\n")
}

fn render_wallet(wallet: &Wallet) -> String {
    let state = if wallet.active { "" } else { " (inactive)" };
    format!("Wallet {} balance {:.2}{}", wallet.id, wallet.balance, state)
}

fn render_success(success: &StepSuccess) -> String {
    match success {
        StepSuccess::Registered { patient } => format!("Registered patientId={}", patient.id),
        StepSuccess::VisitStarted { visit } => format!("Visit started id={}", visit.id),
        StepSuccess::VitalsRecorded { visit } => format!("Vitals saved for visit={}", visit.id),
        StepSuccess::ConsultationSaved { tests_needed, .. } => {
            format!("Consultation saved. testsNeeded={tests_needed}")
        }
        StepSuccess::TestOrdered { test } => format!("Ordered test id={}", test.id),
        StepSuccess::TestCompleted { test } => format!("Completed test id={}", test.id),
        StepSuccess::Bills(listing) => BillBoard::from_listing(listing).to_string(),
        StepSuccess::BillPaid { billing_id, refresh } => {
            let listing = match refresh {
                Ok(listing) => BillBoard::from_listing(listing).to_string(),
                Err(err) => render_error(err),
            };
            format!("Paid bill {billing_id}\n{listing}")
        }
        StepSuccess::Discharged(summary) => format!("Discharged.\n{}", render_summary(summary)),
        StepSuccess::Summary(summary) => render_summary(summary),
        StepSuccess::WalletToppedUp(wallet) => format!("Topped up. {}", render_wallet(wallet)),
        StepSuccess::WalletBalance(wallet) => render_wallet(wallet),
    }
}

/// Render one step report. A failure replaces the step's result text.
pub fn render(report: &StepReport) -> String {
    match &report.outcome {
        Ok(success) => render_success(success),
        Err(err) => render_error(err),
    }
}

pub fn render_session(session: &SessionState) -> String {
    let phase = match session.phase() {
        SessionPhase::Empty => "not registered",
        SessionPhase::Registered => "registered",
        SessionPhase::VisitActive => "visit active",
        SessionPhase::TestOrdered => "lab test ordered",
    };
    let show = |id: Option<RecordId>| id.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string());

    format!(
        "Session: {phase}\n  token: {}\n  patient: {}\n  visit: {}\n  last lab test: {}",
        if session.identity_token().is_empty() { "-" } else { session.identity_token() },
        show(session.subject_id()),
        show(session.visit_id()),
        show(session.last_lab_test_id()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BillStatus, BillType};
    use crate::workflow::Step;

    fn bill(id: RecordId, status: BillStatus) -> Bill {
        Bill {
            id,
            item_description: "Complete blood count".to_string(),
            bill_type: BillType::LabTest,
            amount: 150.0,
            status,
            paid_at: None,
        }
    }

    fn report(outcome: Result<StepSuccess, WorkflowError>) -> StepReport {
        StepReport {
            step: Step::ListBills,
            correlation_id: "test".to_string(),
            outcome,
        }
    }

    #[test]
    fn test_paid_bill_offers_no_pay_action() {
        let listing = BillListing {
            visit_id: 10,
            bills: vec![bill(5, BillStatus::Paid), bill(6, BillStatus::Unpaid)],
        };
        let board = BillBoard::from_listing(&listing);

        assert_eq!(board.pay_action(5), Some(PayAction::Disabled));
        assert_eq!(board.pay_action(6), Some(PayAction::Available));
        assert_eq!(board.pay_action(99), None);
        assert_eq!(board.payable_ids(), vec![6]);
        assert!(!board.to_string().contains("pay 5"));
        assert!(board.to_string().contains("pay 6"));
    }

    #[test]
    fn test_empty_listing_renders_no_bills() {
        let listing = BillListing {
            visit_id: 10,
            bills: vec![],
        };
        let text = render(&report(Ok(StepSuccess::Bills(listing))));
        assert_eq!(text, NO_BILLS);
    }

    #[test]
    fn test_error_is_distinct_from_empty_listing() {
        let text = render(&report(Err(WorkflowError::validation("Start visit first"))));
        assert_eq!(text, "Error: Start visit first");
        assert_ne!(text, NO_BILLS);
    }

    #[test]
    fn test_payment_rendering_includes_refreshed_board() {
        let listing = BillListing {
            visit_id: 10,
            bills: vec![bill(5, BillStatus::Paid)],
        };
        let text = render(&report(Ok(StepSuccess::BillPaid {
            billing_id: 5,
            refresh: Ok(listing),
        })));

        assert!(text.starts_with("Paid bill 5\n"));
        assert!(text.contains("PAID"));
    }

    #[test]
    fn test_summary_uses_wire_status_names() {
        let summary = VisitSummary {
            visit_id: 10,
            status: Some(crate::model::VisitStatus::LabPending),
            patient_name: None,
            doctor_name: None,
            department: None,
            vitals: None,
            diagnosis: None,
            medications: None,
            lab_tests: vec![],
            billing: None,
            discharged_at: None,
        };
        let text = render(&report(Ok(StepSuccess::Summary(summary))));

        assert!(text.contains("status: LAB_PENDING"));
    }

    #[test]
    fn test_session_rendering() {
        let session = SessionState::new();
        let text = render_session(&session);
        assert!(text.starts_with("Session: not registered"));
        assert!(text.contains("visit: -"));
    }
}
