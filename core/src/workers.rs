//! Worker catalogue
//!
//! Static descriptors for every long-running task the sequencer may start.
//! Stack budgets are in scheduler words. Application tasks run one level
//! above idle; the communication agent runs one level above them so it can
//! drain its queue as work is produced.

use hal_abstractions::{Priority, StackSize, TaskSpec};

/// Entry points the board binds to its tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkerEntry {
    /// Provisioning command line
    Cli,
    /// Firmware update state machine
    OtaUpdate,
    /// Device defender metrics reporting
    DeviceDefender,
    /// Qualification test runner
    QualificationTest,
    /// Device Advisor subscribe/publish test
    SubscribePublishTest,
}

impl WorkerEntry {
    /// Whether the worker publishes through the communication agent
    pub const fn requires_agent(self) -> bool {
        matches!(
            self,
            Self::OtaUpdate | Self::DeviceDefender | Self::SubscribePublishTest
        )
    }
}

pub type WorkerSpec = TaskSpec<WorkerEntry>;

/// Communication agent stack, sized for a TLS handshake
pub const AGENT_STACK: StackSize = StackSize::words(6144);
pub const AGENT_PRIORITY: Priority = Priority::above_idle(2);

pub static CLI_WORKER: WorkerSpec = TaskSpec::new(
    "CLI",
    WorkerEntry::Cli,
    StackSize::words(6144),
    Priority::above_idle(1),
);

pub static OTA_UPDATE_WORKER: WorkerSpec = TaskSpec::new(
    "OTA",
    WorkerEntry::OtaUpdate,
    StackSize::words(4096),
    Priority::above_idle(1),
);

pub static DEFENDER_WORKER: WorkerSpec = TaskSpec::new(
    "DEFENDER",
    WorkerEntry::DeviceDefender,
    StackSize::words(2048),
    Priority::above_idle(1),
);

pub static QUALIFICATION_TEST_WORKER: WorkerSpec = TaskSpec::new(
    "TEST",
    WorkerEntry::QualificationTest,
    StackSize::words(6144),
    Priority::above_idle(1),
);

pub static SUBSCRIBE_PUBLISH_TEST_WORKER: WorkerSpec = TaskSpec::new(
    "TEST",
    WorkerEntry::SubscribePublishTest,
    StackSize::words(6144),
    Priority::above_idle(1),
);

/// Every worker in the catalogue
pub static ALL_WORKERS: [&WorkerSpec; 5] = [
    &CLI_WORKER,
    &OTA_UPDATE_WORKER,
    &DEFENDER_WORKER,
    &QUALIFICATION_TEST_WORKER,
    &SUBSCRIBE_PUBLISH_TEST_WORKER,
];
