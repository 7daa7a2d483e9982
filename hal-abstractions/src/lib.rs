//! Hardware abstraction traits for IoT firmware
//!
//! This crate defines the collaborator traits the boot sequencer drives.
//! BSPs implement these traits; host tests implement them with fakes.
//!
//! - **`sched`**: task descriptors and the `TaskSpawner` trait
//! - **`store`**: the configuration store's initialization contract
//! - **`agent`**: the communication agent's initialization contract

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod agent;
pub mod sched;
pub mod store;

pub use agent::{AgentError, AgentRuntime};
pub use sched::{Priority, SpawnError, StackSize, TaskSpawner, TaskSpec};
pub use store::{ConfigStore, StoreError};
