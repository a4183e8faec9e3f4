use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::session::SessionState;

use super::command::{Command, StepReport};
use super::steps::ClinicWorkflow;

/// Shared handle to one session for triggers that run on separate tasks.
///
/// Steps queue on the session lock and run one at a time, in the order they
/// acquired it. A second OrderTest therefore always observes the first one's
/// result, and `last_lab_test_id` ends up pointing at the last issued order.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    workflow: ClinicWorkflow,
    session: Arc<Mutex<SessionState>>,
}

impl SessionHandle {
    pub fn new(workflow: ClinicWorkflow) -> Self {
        Self::with_session(workflow, SessionState::new())
    }

    pub fn with_session(workflow: ClinicWorkflow, session: SessionState) -> Self {
        Self {
            workflow,
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn dispatch(&self, command: Command) -> StepReport {
        let step = command.step();
        let mut session = self.session.lock().await;
        debug!(step = %step, "Acquired session");
        self.workflow.run(&mut session, command).await
    }

    /// Copy of the current session, taken between steps
    pub async fn snapshot(&self) -> SessionState {
        self.session.lock().await.clone()
    }
}
