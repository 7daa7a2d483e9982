#![deny(unsafe_code)]
//! Communication agent initialization contract
//!
//! The agent serializes message traffic for several tasks through one
//! managed connection. It must be running before any task that publishes
//! through it is created.

use crate::sched::{Priority, SpawnError, StackSize};

/// Agent initialization errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AgentError {
    /// Not enough memory for the agent's stack or command queue
    OutOfMemory,
    /// The scheduler cannot run the agent at the requested priority
    PriorityMismatch,
    /// The agent has already been started
    AlreadyRunning,
}

impl core::fmt::Display for AgentError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "Out of memory for agent"),
            Self::PriorityMismatch => write!(f, "Agent priority not available"),
            Self::AlreadyRunning => write!(f, "Agent already running"),
        }
    }
}

impl core::error::Error for AgentError {}

/// The agent is a task too; its creation fails the same ways
impl From<SpawnError> for AgentError {
    fn from(e: SpawnError) -> Self {
        match e {
            SpawnError::OutOfMemory => Self::OutOfMemory,
            SpawnError::PriorityMismatch => Self::PriorityMismatch,
            SpawnError::AlreadyRunning => Self::AlreadyRunning,
        }
    }
}

/// Communication agent infrastructure
pub trait AgentRuntime {
    /// Stand up the agent's queue and task with the given stack and priority
    fn init(&mut self, stack: StackSize, priority: Priority) -> Result<(), AgentError>;
}

impl<T: AgentRuntime + ?Sized> AgentRuntime for &mut T {
    fn init(&mut self, stack: StackSize, priority: Priority) -> Result<(), AgentError> {
        (**self).init(stack, priority)
    }
}
