//! Boot step lists
//!
//! Each build mode maps to one fixed, ordered list of steps. The mapping is
//! pure so every mode's list can be checked on the host without building
//! an image per mode.

use heapless::Vec;
use hal_abstractions::{Priority, StackSize};

use crate::mode::BuildMode;
use crate::workers::{self, WorkerSpec};

/// Longest step list any mode produces, with headroom
pub const MAX_STEPS: usize = 8;

/// One externally visible boot action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceStep {
    /// Bring the configuration store online
    InitStore,
    /// Stand up the communication agent
    InitAgent { stack: StackSize, priority: Priority },
    /// Create one worker under the scheduler
    Spawn(&'static WorkerSpec),
}

impl SequenceStep {
    /// Short label for diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            Self::InitStore => "store",
            Self::InitAgent { .. } => "agent",
            Self::Spawn(spec) => spec.name,
        }
    }
}

pub type StepList = Vec<SequenceStep, MAX_STEPS>;

const AGENT_STEP: SequenceStep = SequenceStep::InitAgent {
    stack: workers::AGENT_STACK,
    priority: workers::AGENT_PRIORITY,
};

/// Ordered steps for `mode`
pub fn steps_for(mode: BuildMode) -> StepList {
    match mode {
        BuildMode::Provisioning => table(&[
            SequenceStep::InitStore,
            SequenceStep::Spawn(&workers::CLI_WORKER),
        ]),
        BuildMode::Operational { ota_update: true } => table(&[
            SequenceStep::InitStore,
            AGENT_STEP,
            SequenceStep::Spawn(&workers::OTA_UPDATE_WORKER),
            SequenceStep::Spawn(&workers::DEFENDER_WORKER),
        ]),
        BuildMode::Operational { ota_update: false } => table(&[
            SequenceStep::InitStore,
            AGENT_STEP,
            SequenceStep::Spawn(&workers::DEFENDER_WORKER),
        ]),
        BuildMode::QualificationTest => table(&[
            SequenceStep::InitStore,
            SequenceStep::Spawn(&workers::QUALIFICATION_TEST_WORKER),
        ]),
        BuildMode::DeviceAdvisorTest => table(&[
            SequenceStep::InitStore,
            AGENT_STEP,
            SequenceStep::Spawn(&workers::SUBSCRIBE_PUBLISH_TEST_WORKER),
        ]),
        BuildMode::OtaEndToEndTest => table(&[SequenceStep::InitStore]),
    }
}

fn table(steps: &[SequenceStep]) -> StepList {
    let list = StepList::from_slice(steps);
    debug_assert!(list.is_ok(), "step table longer than MAX_STEPS");
    list.unwrap_or_default()
}

/// Check the ordering invariants of a step list
///
/// The store must be initialized first, and every worker that publishes
/// through the agent must come after the agent step.
pub fn respects_dependencies(steps: &[SequenceStep]) -> bool {
    if steps.first() != Some(&SequenceStep::InitStore) {
        return false;
    }

    let mut agent_ready = false;
    for step in &steps[1..] {
        match step {
            SequenceStep::InitStore => return false,
            SequenceStep::InitAgent { .. } => agent_ready = true,
            SequenceStep::Spawn(spec) if spec.entry.requires_agent() && !agent_ready => {
                return false
            }
            SequenceStep::Spawn(_) => {}
        }
    }
    true
}
