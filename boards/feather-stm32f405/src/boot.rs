#![deny(unsafe_code)]
#![deny(warnings)]
//! Boot mode selection and the application entry point
//!
//! The mode is picked with Cargo features and resolved at compile time:
//!
//! ```text
//! (none)                 operational
//! ota-update             operational + OTA update task (default)
//! provisioning           provisioning CLI
//! qualification-test     qualification test suite
//! device-advisor-test    Device Advisor subscribe/publish test
//! ota-e2e-test           OTA end-to-end suite (store only, no worker)
//! ```
//!
//! Selecting two modes, or `ota-update` with a non-operational mode, fails
//! the build. Use `--no-default-features` for the non-operational modes.

use bootstrap_core::{
    BuildFlags, BuildMode, FlagError, SequenceResult, Sequencer, WorkerEntry,
};
use defmt::{error, info, warn};
use hal_abstractions::{AgentRuntime, ConfigStore, TaskSpawner};

use crate::config::BootConfig;

pub const BOOT_FLAGS: BuildFlags = BuildFlags {
    provisioning_mode: cfg!(feature = "provisioning"),
    include_ota_update_task: cfg!(feature = "ota-update"),
    run_qualification_test_suite: cfg!(feature = "qualification-test"),
    run_device_advisor_test_suite: cfg!(feature = "device-advisor-test"),
    run_ota_end_to_end_test_suite: cfg!(feature = "ota-e2e-test"),
};

pub const BOOT_MODE: BuildMode = match BOOT_FLAGS.resolve() {
    Ok(mode) => mode,
    Err(FlagError::ConflictingModes) => panic!("select at most one boot mode feature"),
    Err(FlagError::OtaUpdateRequiresOperational) => {
        panic!("`ota-update` only applies to operational builds")
    }
};

/// Run the boot sequence for this image's mode
///
/// Called exactly once, from `init`. The result is only logged: once
/// `init` returns the device free-runs under RTIC whatever happened here.
pub fn app_main<S, A, T>(store: S, agent: A, spawner: T, config: &BootConfig) -> SequenceResult
where
    S: ConfigStore,
    A: AgentRuntime,
    T: TaskSpawner<WorkerEntry>,
{
    let result = Sequencer::new(store, agent, spawner)
        .with_policy(config.report_policy)
        .run(BOOT_MODE);

    match &result {
        Ok(report) if report.is_success() => {
            info!("Boot complete: {:?}", report.mode)
        }
        Ok(report) => warn!(
            "Boot incomplete ({} of {} steps), reported as passed: {:?}",
            report.executed,
            report.planned,
            report.failure
        ),
        Err(e) => error!("Boot failed: {:?}", e),
    }
    result
}
