use thiserror::Error;

use crate::transport::TransportError;

/// Failure of a single workflow step
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    /// Session precondition unmet or operator input missing/unusable.
    /// Always raised before anything is sent to the service.
    #[error("{message}")]
    Validation { message: String },
    /// The service (or the network in between) rejected the request
    #[error(transparent)]
    Remote {
        #[from]
        source: TransportError,
    },
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, WorkflowError::Validation { .. })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, WorkflowError::Remote { .. })
    }
}
