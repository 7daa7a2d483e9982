//! Bootstrap sequencer
//!
//! Runs once at power-on. Walks the step list for the build mode strictly
//! in order, one collaborator call per step, and stops at the first
//! failure. Nothing is retried and nothing already started is torn down:
//! after a failure some workers may be running while later ones never
//! start.
//!
//! # Example
//!
//! ```ignore
//! let mut sequencer = Sequencer::new(store, agent, spawner);
//! match sequencer.run(BuildMode::Provisioning) {
//!     Ok(report) => info!("boot complete: {} steps", report.executed),
//!     Err(e) => error!("boot failed: {:?}", e),
//! }
//! ```

use hal_abstractions::{AgentRuntime, ConfigStore, TaskSpawner};

use crate::error::BootError;
use crate::mode::BuildMode;
use crate::step::{self, SequenceStep};
use crate::workers::WorkerEntry;

/// What `run` reports when a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportPolicy {
    /// Return the first failure as `Err`
    #[default]
    Aggregate,
    /// Always return `Ok`; the failure is only kept in `BootReport::failure`.
    /// Matches firmware whose boot routine returned a fixed pass status.
    AlwaysPass,
}

/// Outcome of one boot run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    pub mode: BuildMode,
    /// Steps in the mode's list
    pub planned: usize,
    /// Steps that were attempted, including a failing one
    pub executed: usize,
    /// Failure swallowed under `ReportPolicy::AlwaysPass`
    pub failure: Option<BootError>,
}

impl BootReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.executed == self.planned
    }
}

pub type SequenceResult = Result<BootReport, BootError>;

pub struct Sequencer<S, A, T> {
    store: S,
    agent: A,
    spawner: T,
    policy: ReportPolicy,
}

impl<S, A, T> Sequencer<S, A, T>
where
    S: ConfigStore,
    A: AgentRuntime,
    T: TaskSpawner<WorkerEntry>,
{
    pub fn new(store: S, agent: A, spawner: T) -> Self {
        Self {
            store,
            agent,
            spawner,
            policy: ReportPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReportPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the boot steps for `mode`
    ///
    /// Intended to be called exactly once per boot.
    pub fn run(&mut self, mode: BuildMode) -> SequenceResult {
        let steps = step::steps_for(mode);
        debug_assert!(step::respects_dependencies(&steps));
        debug_assert_eq!(
            mode.uses_agent(),
            steps
                .iter()
                .any(|s| matches!(s, SequenceStep::InitAgent { .. }))
        );

        info!("Boot sequence starting: {:?}, {} steps", mode, steps.len());

        let mut executed = 0;
        let outcome = steps.iter().try_for_each(|step| {
            executed += 1;
            self.execute(executed, step)
        });

        let mut report = BootReport {
            mode,
            planned: steps.len(),
            executed,
            failure: None,
        };

        match (outcome, self.policy) {
            (Ok(()), _) => {
                info!("Boot sequence complete: {} steps", executed);
                Ok(report)
            }
            (Err(e), ReportPolicy::Aggregate) => Err(e),
            (Err(e), ReportPolicy::AlwaysPass) => {
                warn!(
                    "Boot stopped after {} of {} steps, reporting pass",
                    executed,
                    report.planned
                );
                report.failure = Some(e);
                Ok(report)
            }
        }
    }

    /// Give the collaborators back
    pub fn into_parts(self) -> (S, A, T) {
        (self.store, self.agent, self.spawner)
    }

    fn execute(&mut self, index: usize, step: &SequenceStep) -> Result<(), BootError> {
        debug!("Boot step {}: {}", index, step.label());

        let result = match *step {
            SequenceStep::InitStore => self.store.init().map_err(BootError::from),
            SequenceStep::InitAgent { stack, priority } => {
                self.agent.init(stack, priority).map_err(BootError::from)
            }
            SequenceStep::Spawn(spec) => {
                self.spawner
                    .spawn(spec)
                    .map_err(|cause| BootError::WorkerCreate {
                        name: spec.name,
                        cause,
                    })
            }
        };

        if let Err(e) = &result {
            error!("Boot step {} ({}) failed: {:?}", index, step.label(), e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use hal_abstractions::{
        AgentError, Priority, SpawnError, StackSize, StoreError, TaskSpec,
    };

    use crate::workers::{AGENT_PRIORITY, AGENT_STACK};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Store,
        Agent(StackSize, Priority),
        Spawn(&'static str, StackSize, Priority),
    }

    /// Fake board: records every collaborator call and fails the
    /// `fail_at`-th call (0-based) if set
    #[derive(Default)]
    struct FakeBoard {
        calls: RefCell<Vec<Call>>,
        fail_at: Option<usize>,
    }

    impl FakeBoard {
        fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::default()
            }
        }

        fn record(&self, call: Call) -> bool {
            let mut calls = self.calls.borrow_mut();
            let index = calls.len();
            calls.push(call);
            self.fail_at != Some(index)
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl ConfigStore for &FakeBoard {
        fn init(&mut self) -> Result<(), StoreError> {
            if self.record(Call::Store) {
                Ok(())
            } else {
                Err(StoreError::Storage)
            }
        }
    }

    impl AgentRuntime for &FakeBoard {
        fn init(&mut self, stack: StackSize, priority: Priority) -> Result<(), AgentError> {
            if self.record(Call::Agent(stack, priority)) {
                Ok(())
            } else {
                Err(AgentError::OutOfMemory)
            }
        }
    }

    impl TaskSpawner<WorkerEntry> for &FakeBoard {
        fn spawn(&mut self, spec: &TaskSpec<WorkerEntry>) -> Result<(), SpawnError> {
            if self.record(Call::Spawn(spec.name, spec.stack, spec.priority)) {
                Ok(())
            } else {
                Err(SpawnError::OutOfMemory)
            }
        }
    }

    const ALL_MODES: [BuildMode; 6] = [
        BuildMode::Provisioning,
        BuildMode::Operational { ota_update: false },
        BuildMode::Operational { ota_update: true },
        BuildMode::QualificationTest,
        BuildMode::DeviceAdvisorTest,
        BuildMode::OtaEndToEndTest,
    ];

    fn boot(board: &FakeBoard, mode: BuildMode) -> SequenceResult {
        Sequencer::new(board, board, board).run(mode)
    }

    fn spawn_call(name: &'static str, stack: u32, above_idle: u8) -> Call {
        Call::Spawn(name, StackSize::words(stack), Priority::above_idle(above_idle))
    }

    #[test]
    fn test_all_steps_succeed_in_declared_order() {
        for mode in ALL_MODES {
            let board = FakeBoard::default();
            let report = boot(&board, mode).unwrap();
            let steps = step::steps_for(mode);

            assert!(report.is_success());
            assert_eq!(report.executed, steps.len());
            assert_eq!(board.calls().len(), steps.len());
            for (call, step) in board.calls().iter().zip(steps.iter()) {
                let matches = match (call, step) {
                    (Call::Store, SequenceStep::InitStore) => true,
                    (Call::Agent(..), SequenceStep::InitAgent { .. }) => true,
                    (Call::Spawn(name, ..), SequenceStep::Spawn(spec)) => *name == spec.name,
                    _ => false,
                };
                assert!(matches, "{:?}: {:?} vs {:?}", mode, call, step);
            }
        }
    }

    #[test]
    fn test_failure_stops_remaining_steps() {
        for mode in ALL_MODES {
            let planned = step::steps_for(mode).len();

            for k in 0..planned {
                let board = FakeBoard::failing_at(k);
                let result = boot(&board, mode);

                assert!(result.is_err(), "{:?}: step {} failure not reported", mode, k);
                assert_eq!(board.calls().len(), k + 1, "{:?}: step {}", mode, k);
            }
        }
    }

    #[test]
    fn test_always_pass_failure_stops_remaining_steps() {
        for mode in ALL_MODES {
            let planned = step::steps_for(mode).len();

            for k in 0..planned {
                let board = FakeBoard::failing_at(k);
                let report = Sequencer::new(&board, &board, &board)
                    .with_policy(ReportPolicy::AlwaysPass)
                    .run(mode)
                    .unwrap();

                assert_eq!(board.calls().len(), k + 1, "{:?}: step {}", mode, k);
                assert_eq!(report.planned, planned);
                assert_eq!(report.executed, k + 1);
                assert!(report.failure.is_some());
                assert!(!report.is_success(), "{:?}: step {}", mode, k);
            }
        }
    }

    #[test]
    fn test_provisioning_boot() {
        let board = FakeBoard::default();
        let report = boot(&board, BuildMode::Provisioning).unwrap();

        assert_eq!(report.planned, 2);
        assert_eq!(report.executed, 2);
        assert_eq!(board.calls(), [Call::Store, spawn_call("CLI", 6144, 1)]);
    }

    #[test]
    fn test_operational_agent_failure_skips_defender() {
        let board = FakeBoard::failing_at(1);
        let result = boot(&board, BuildMode::Operational { ota_update: false });

        assert_eq!(
            result,
            Err(BootError::AgentInit(AgentError::OutOfMemory))
        );
        assert_eq!(
            board.calls(),
            [Call::Store, Call::Agent(AGENT_STACK, AGENT_PRIORITY)]
        );
    }

    #[test]
    fn test_qualification_store_failure_starts_nothing() {
        let board = FakeBoard::failing_at(0);
        let result = boot(&board, BuildMode::QualificationTest);

        assert_eq!(result, Err(BootError::StoreInit(StoreError::Storage)));
        assert_eq!(board.calls(), [Call::Store]);
    }

    #[test]
    fn test_worker_failure_names_worker() {
        let board = FakeBoard::failing_at(2);
        let result = boot(&board, BuildMode::DeviceAdvisorTest);

        assert_eq!(
            result,
            Err(BootError::WorkerCreate {
                name: "TEST",
                cause: SpawnError::OutOfMemory,
            })
        );
    }

    #[test]
    fn test_operational_with_ota_spawns_ota_before_defender() {
        let board = FakeBoard::default();
        boot(&board, BuildMode::Operational { ota_update: true }).unwrap();

        assert_eq!(
            board.calls(),
            [
                Call::Store,
                Call::Agent(AGENT_STACK, AGENT_PRIORITY),
                spawn_call("OTA", 4096, 1),
                spawn_call("DEFENDER", 2048, 1),
            ]
        );
    }

    #[test]
    fn test_always_pass_policy_keeps_failure_in_report() {
        let board = FakeBoard::failing_at(1);
        let report = Sequencer::new(&board, &board, &board)
            .with_policy(ReportPolicy::AlwaysPass)
            .run(BuildMode::Operational { ota_update: true })
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.planned, 4);
        assert_eq!(report.executed, 2);
        assert_eq!(
            report.failure,
            Some(BootError::AgentInit(AgentError::OutOfMemory))
        );
        assert_eq!(board.calls().len(), 2);
    }

    #[test]
    fn test_second_run_does_not_crash() {
        let board = FakeBoard::default();
        let mut sequencer = Sequencer::new(&board, &board, &board);
        assert!(sequencer.run(BuildMode::Provisioning).is_ok());
        let _ = sequencer.run(BuildMode::Provisioning);

        let (store, _, _) = sequencer.into_parts();
        assert_eq!(store.calls().len(), 4);
    }
}
