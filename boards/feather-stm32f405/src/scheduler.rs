#![deny(unsafe_code)]
#![deny(warnings)]
//! RTIC scheduler adapter
//!
//! RTIC fixes task priorities in the `#[app]` attributes and allocates task
//! storage statically, so creating a task here means: admit it against its
//! declared priority and the fixed stack pool (`StackPool::admit`), then
//! `spawn()` it. The spawn functions themselves are generated inside the
//! app module and handed in as [`TaskLaunchers`].

use core::cell::{Cell, RefCell};

use bootstrap_core::{StackPool, WorkerEntry};
use hal_abstractions::{
    AgentError, AgentRuntime, Priority, SpawnError, StackSize, TaskSpawner, TaskSpec,
};

use crate::agent::{self, AgentReceiver};
use crate::config;

/// Spawn hooks generated by the RTIC app
pub struct TaskLaunchers {
    /// Spawn the agent task with its command queue
    pub agent: fn(AgentReceiver) -> Result<(), AgentReceiver>,
    /// Spawn the worker task bound to an entry point
    pub worker: fn(WorkerEntry, Option<u32>) -> Result<(), ()>,
}

/// Scheduler collaborator for the boot sequencer
///
/// Used by shared reference so the agent and worker steps draw on one
/// stack pool.
pub struct RticScheduler {
    pool: RefCell<StackPool>,
    agent_started: Cell<bool>,
    launchers: TaskLaunchers,
}

impl RticScheduler {
    pub fn new(stack_pool: StackSize, launchers: TaskLaunchers) -> Self {
        Self {
            pool: RefCell::new(StackPool::new(stack_pool)),
            agent_started: Cell::new(false),
            launchers,
        }
    }

    fn admit(
        &self,
        name: &'static str,
        requested: Priority,
        declared: Priority,
        stack: StackSize,
    ) -> Result<(), SpawnError> {
        self.pool
            .borrow_mut()
            .admit(name, requested, declared, stack)
    }
}

impl AgentRuntime for &RticScheduler {
    fn init(&mut self, stack: StackSize, priority: Priority) -> Result<(), AgentError> {
        if self.agent_started.get() {
            return Err(AgentError::AlreadyRunning);
        }
        self.admit(
            "MQTT-AGENT",
            priority,
            Priority::new(config::AGENT_TASK_PRIORITY),
            stack,
        )?;

        let commands = agent::create_queue();
        self.agent_started.set(true);
        (self.launchers.agent)(commands).map_err(|_| AgentError::AlreadyRunning)
    }
}

impl TaskSpawner<WorkerEntry> for &RticScheduler {
    fn spawn(&mut self, spec: &TaskSpec<WorkerEntry>) -> Result<(), SpawnError> {
        self.admit(
            spec.name,
            spec.priority,
            config::task_priority(spec.entry),
            spec.stack,
        )?;

        (self.launchers.worker)(spec.entry, spec.parameter)
            .map_err(|()| SpawnError::AlreadyRunning)
    }
}
