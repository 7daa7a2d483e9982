//! Platform-agnostic boot sequencing for IoT firmware
//!
//! This crate contains the power-on bootstrap protocol shared by every
//! board: which steps a firmware image runs for its build mode, in which
//! order, and how the first failure stops the rest. It has NO hardware
//! dependencies; boards plug in their store, agent and scheduler through
//! the `hal-abstractions` traits.
//!
//! ## Modules
//! - **`mode`**: build modes and compile-time flag resolution
//! - **`workers`**: static worker catalogue (stack budgets, priorities)
//! - **`step`**: per-mode step lists and the dependency check
//! - **`sequencer`**: the fail-fast runner
//! - **`budget`**: stack budget accounting for static schedulers
//! - **`error`**: boot failure causes

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

#[macro_use]
mod fmt;

pub mod budget;
pub mod error;
pub mod mode;
pub mod sequencer;
pub mod step;
pub mod workers;

pub use budget::StackPool;
pub use error::BootError;
pub use mode::{BuildFlags, BuildMode, FlagError};
pub use sequencer::{BootReport, ReportPolicy, SequenceResult, Sequencer};
pub use step::{respects_dependencies, steps_for, SequenceStep, StepList};
pub use workers::{WorkerEntry, WorkerSpec};
