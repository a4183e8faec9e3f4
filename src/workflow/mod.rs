// Clinical visit workflow
//
// Guarded steps over an explicitly owned session: register, start a visit,
// record vitals and consultation, order and complete lab tests, settle bills.

pub mod errors;
pub mod inputs;
pub mod steps;
pub mod command;
pub mod handle;

#[cfg(test)]
pub mod mocks;


pub use errors::WorkflowError;
pub use inputs::{ConsultForm, OrderTestForm, TopUpForm, VitalsForm};
pub use steps::{BillListing, ClinicWorkflow, Step, StepSuccess};
pub use command::{Command, StepReport};
pub use handle::SessionHandle;
