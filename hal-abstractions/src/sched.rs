#![deny(unsafe_code)]
//! Scheduler-facing task descriptors
//!
//! A `TaskSpec` is the static record the scheduler needs to create one
//! long-running task: name, entry point, stack budget, priority and an
//! optional opaque start parameter. The entry type is generic so each
//! firmware can name its own closed set of entry points.

/// Scheduling priority. Higher values are preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(u8);

impl Priority {
    /// Baseline priority of the scheduler's idle context
    pub const IDLE: Priority = Priority(0);

    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    /// Priority `levels` steps above idle
    pub const fn above_idle(levels: u8) -> Self {
        Self(Self::IDLE.0 + levels)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Stack budget in scheduler words
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackSize(u32);

impl StackSize {
    pub const fn words(words: u32) -> Self {
        Self(words)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Static descriptor of one schedulable task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskSpec<E> {
    /// Diagnostic name
    pub name: &'static str,
    /// Entry point the scheduler binds to a task
    pub entry: E,
    /// Stack budget claimed once at creation
    pub stack: StackSize,
    /// Fixed scheduling priority
    pub priority: Priority,
    /// Opaque start parameter handed to the entry point
    pub parameter: Option<u32>,
}

impl<E> TaskSpec<E> {
    /// Descriptor without a start parameter
    pub const fn new(name: &'static str, entry: E, stack: StackSize, priority: Priority) -> Self {
        Self {
            name,
            entry,
            stack,
            priority,
            parameter: None,
        }
    }
}

/// Task creation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpawnError {
    /// Not enough memory left for the requested stack
    OutOfMemory,
    /// The scheduler cannot run this task at the requested priority
    PriorityMismatch,
    /// The task is already running and cannot be created again
    AlreadyRunning,
}

impl core::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "Out of memory for task stack"),
            Self::PriorityMismatch => write!(f, "Priority not available"),
            Self::AlreadyRunning => write!(f, "Task already running"),
        }
    }
}

impl core::error::Error for SpawnError {}

/// Creates tasks under the scheduler
///
/// Once created, a task is owned by the scheduler. Implementors never
/// retry: a failure is reported straight back to the caller.
pub trait TaskSpawner<E> {
    /// Create one task with the spec's stack budget, priority and parameter
    fn spawn(&mut self, spec: &TaskSpec<E>) -> Result<(), SpawnError>;
}

impl<E, T: TaskSpawner<E> + ?Sized> TaskSpawner<E> for &mut T {
    fn spawn(&mut self, spec: &TaskSpec<E>) -> Result<(), SpawnError> {
        (**self).spawn(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_above_idle() {
        assert_eq!(Priority::above_idle(0), Priority::IDLE);
        assert_eq!(Priority::above_idle(2).get(), 2);
        assert!(Priority::above_idle(2) > Priority::above_idle(1));
    }

    #[test]
    fn test_task_spec_has_no_parameter_by_default() {
        let spec = TaskSpec::new("CLI", 7u8, StackSize::words(6144), Priority::above_idle(1));
        assert_eq!(spec.parameter, None);
        assert_eq!(spec.stack.get(), 6144);
    }

    #[test]
    fn test_spawner_forwards_through_mut_ref() {
        struct Counter(usize);
        impl TaskSpawner<u8> for Counter {
            fn spawn(&mut self, _spec: &TaskSpec<u8>) -> Result<(), SpawnError> {
                self.0 += 1;
                Ok(())
            }
        }

        fn spawn_twice<T: TaskSpawner<u8>>(mut spawner: T, spec: &TaskSpec<u8>) {
            spawner.spawn(spec).unwrap();
            spawner.spawn(spec).unwrap();
        }

        let spec = TaskSpec::new("T", 0u8, StackSize::words(16), Priority::IDLE);
        let mut counter = Counter(0);
        spawn_twice(&mut counter, &spec);
        assert_eq!(counter.0, 2);
    }
}
