//! Boot failure causes

use hal_abstractions::{AgentError, SpawnError, StoreError};

/// First failure of a boot run. Terminal for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// Configuration store did not come online
    StoreInit(StoreError),
    /// Communication agent could not be stood up
    AgentInit(AgentError),
    /// Scheduler refused to create a worker
    WorkerCreate {
        name: &'static str,
        cause: SpawnError,
    },
}

impl core::fmt::Display for BootError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StoreInit(e) => write!(f, "Store initialization failed: {}", e),
            Self::AgentInit(e) => write!(f, "Agent initialization failed: {}", e),
            Self::WorkerCreate { name, cause } => {
                write!(f, "Worker {} creation failed: {}", name, cause)
            }
        }
    }
}

impl core::error::Error for BootError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::StoreInit(e) => Some(e),
            Self::AgentInit(e) => Some(e),
            Self::WorkerCreate { cause, .. } => Some(cause),
        }
    }
}

impl From<StoreError> for BootError {
    fn from(e: StoreError) -> Self {
        Self::StoreInit(e)
    }
}

impl From<AgentError> for BootError {
    fn from(e: AgentError) -> Self {
        Self::AgentInit(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::error::Error;

    #[test]
    fn test_display() {
        let e = BootError::WorkerCreate {
            name: "DEFENDER",
            cause: SpawnError::OutOfMemory,
        };
        assert_eq!(
            e.to_string(),
            "Worker DEFENDER creation failed: Out of memory for task stack"
        );
        assert_eq!(
            BootError::from(StoreError::Corrupt).to_string(),
            "Store initialization failed: Store contents corrupt"
        );
    }

    #[test]
    fn test_source_is_collaborator_error() {
        let e = BootError::from(AgentError::OutOfMemory);
        assert!(e.source().is_some());
    }
}
