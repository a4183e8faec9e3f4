// meditrack - clinical visit workflow client
// This exposes the core components for testing and integration

pub mod api;
pub mod cli;
pub mod config;
pub mod model;
pub mod presentation;
pub mod session;
pub mod telemetry;
pub mod transport;
pub mod workflow;

// Re-export key types for easy access
pub use config::MeditrackConfig;
pub use model::{Bill, BillStatus, Department, LabTest, LabTestStatus, Patient, RecordId, Visit, VisitSummary, Wallet};
pub use presentation::{BillBoard, PayAction};
pub use session::{SessionPhase, SessionState};
pub use telemetry::{create_step_span, generate_correlation_id, init_telemetry};
pub use transport::{ApiRequest, HttpTransport, Method, Transport, TransportError};
pub use workflow::{ClinicWorkflow, Command, SessionHandle, StepReport, StepSuccess, WorkflowError};
