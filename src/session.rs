//! Per-session workflow state
//!
//! Holds the identifiers produced by earlier steps. Only successful workflow
//! steps mutate it, and it is never persisted.

use std::collections::BTreeSet;

use crate::model::{Bill, BillStatus, RecordId};
use crate::workflow::WorkflowError;

/// Coarse position of a session in the visit workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Registered,
    VisitActive,
    TestOrdered,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    identity_token: String,
    subject_id: Option<RecordId>,
    visit_id: Option<RecordId>,
    last_lab_test_id: Option<RecordId>,
    observed_paid: BTreeSet<RecordId>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity_token(&self) -> &str {
        &self.identity_token
    }

    pub fn subject_id(&self) -> Option<RecordId> {
        self.subject_id
    }

    pub fn visit_id(&self) -> Option<RecordId> {
        self.visit_id
    }

    pub fn last_lab_test_id(&self) -> Option<RecordId> {
        self.last_lab_test_id
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.subject_id, self.visit_id, self.last_lab_test_id) {
            (_, Some(_), Some(_)) => SessionPhase::TestOrdered,
            (_, Some(_), None) => SessionPhase::VisitActive,
            (Some(_), None, _) => SessionPhase::Registered,
            (None, None, _) => SessionPhase::Empty,
        }
    }

    pub(crate) fn require_token(&self) -> Result<&str, WorkflowError> {
        if self.identity_token.is_empty() {
            return Err(WorkflowError::validation("Register first"));
        }
        Ok(&self.identity_token)
    }

    pub(crate) fn require_visit(&self) -> Result<RecordId, WorkflowError> {
        self.visit_id
            .ok_or_else(|| WorkflowError::validation("Start visit first"))
    }

    pub(crate) fn require_lab_test(&self) -> Result<RecordId, WorkflowError> {
        self.last_lab_test_id
            .ok_or_else(|| WorkflowError::validation("Order a test first"))
    }

    /// A new registration starts a fresh visit chain.
    pub(crate) fn registered(&mut self, identity_token: String, subject_id: RecordId) {
        self.identity_token = identity_token;
        self.subject_id = Some(subject_id);
        self.visit_id = None;
        self.last_lab_test_id = None;
    }

    pub(crate) fn visit_started(&mut self, visit_id: RecordId) {
        self.visit_id = Some(visit_id);
        self.last_lab_test_id = None;
    }

    pub(crate) fn test_ordered(&mut self, test_id: RecordId) {
        self.last_lab_test_id = Some(test_id);
    }

    pub(crate) fn bill_paid(&mut self, bill_id: RecordId) {
        self.observed_paid.insert(bill_id);
    }

    pub fn is_known_paid(&self, bill_id: RecordId) -> bool {
        self.observed_paid.contains(&bill_id)
    }

    /// Fold a fresh bill listing into the session.
    ///
    /// Bills reported PAID are remembered; bills already seen PAID keep that
    /// status even if the service reports them unpaid again. Returns the ids
    /// whose reported status regressed.
    pub(crate) fn reconcile_bills(&mut self, bills: &mut [Bill]) -> Vec<RecordId> {
        let mut regressed = Vec::new();
        for bill in bills.iter_mut() {
            match bill.status {
                BillStatus::Paid => {
                    self.observed_paid.insert(bill.id);
                }
                BillStatus::Unpaid if self.observed_paid.contains(&bill.id) => {
                    bill.status = BillStatus::Paid;
                    regressed.push(bill.id);
                }
                BillStatus::Unpaid => {}
            }
        }
        regressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BillType;

    fn bill(id: RecordId, status: BillStatus) -> Bill {
        Bill {
            id,
            item_description: format!("item {id}"),
            bill_type: BillType::Consultation,
            amount: 300.0,
            status,
            paid_at: None,
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = SessionState::new();
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.require_token().is_err());
        assert!(session.require_visit().is_err());
        assert!(session.require_lab_test().is_err());
    }

    #[test]
    fn test_phase_progression() {
        let mut session = SessionState::new();
        session.registered("TAG-1".to_string(), 1);
        assert_eq!(session.phase(), SessionPhase::Registered);

        session.visit_started(10);
        assert_eq!(session.phase(), SessionPhase::VisitActive);

        session.test_ordered(100);
        assert_eq!(session.phase(), SessionPhase::TestOrdered);
    }

    #[test]
    fn test_new_visit_clears_last_lab_test() {
        let mut session = SessionState::new();
        session.registered("TAG-1".to_string(), 1);
        session.visit_started(10);
        session.test_ordered(100);

        session.visit_started(11);
        assert_eq!(session.visit_id(), Some(11));
        assert_eq!(session.last_lab_test_id(), None);
    }

    #[test]
    fn test_reregistration_clears_visit_chain() {
        let mut session = SessionState::new();
        session.registered("TAG-1".to_string(), 1);
        session.visit_started(10);
        session.test_ordered(100);

        session.registered("TAG-2".to_string(), 2);
        assert_eq!(session.identity_token(), "TAG-2");
        assert_eq!(session.subject_id(), Some(2));
        assert_eq!(session.visit_id(), None);
        assert_eq!(session.last_lab_test_id(), None);
    }

    #[test]
    fn test_paid_bills_never_regress() {
        let mut session = SessionState::new();
        let mut first = vec![bill(5, BillStatus::Paid), bill(6, BillStatus::Unpaid)];
        assert!(session.reconcile_bills(&mut first).is_empty());

        let mut second = vec![bill(5, BillStatus::Unpaid), bill(6, BillStatus::Unpaid)];
        let regressed = session.reconcile_bills(&mut second);

        assert_eq!(regressed, vec![5]);
        assert_eq!(second[0].status, BillStatus::Paid);
        assert_eq!(second[1].status, BillStatus::Unpaid);
    }
}
