//! Stack budget accounting
//!
//! Static schedulers (RTIC) allocate task storage at link time, so the
//! "not enough memory for this task" failure of a dynamic RTOS has to be
//! modelled explicitly. A `StackPool` is a fixed word budget that tasks
//! claim from once, at creation. Claims are never returned.
//!
//! Such schedulers also fix each task's priority where the task is
//! declared, so [`StackPool::admit`] checks the requested priority against
//! the declared one before claiming anything.

use hal_abstractions::{Priority, SpawnError, StackSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackPool {
    capacity: u32,
    claimed: u32,
}

impl StackPool {
    pub const fn new(capacity: StackSize) -> Self {
        Self {
            capacity: capacity.get(),
            claimed: 0,
        }
    }

    /// Claim `stack` words. A failed claim leaves the pool unchanged.
    pub fn claim(&mut self, stack: StackSize) -> Result<(), SpawnError> {
        let claimed = self
            .claimed
            .checked_add(stack.get())
            .filter(|total| *total <= self.capacity)
            .ok_or(SpawnError::OutOfMemory)?;
        self.claimed = claimed;
        Ok(())
    }

    /// Admit a task declared at `declared` that asks for `requested`
    /// priority and `stack` words. A refused task consumes nothing.
    pub fn admit(
        &mut self,
        name: &'static str,
        requested: Priority,
        declared: Priority,
        stack: StackSize,
    ) -> Result<(), SpawnError> {
        if requested != declared {
            warn!(
                "{} requested priority {}, task runs at {}",
                name,
                requested.get(),
                declared.get()
            );
            return Err(SpawnError::PriorityMismatch);
        }
        self.claim(stack)?;
        debug!(
            "{} claimed {} stack words, {} remaining",
            name,
            stack.get(),
            self.remaining().get()
        );
        Ok(())
    }

    pub const fn claimed(&self) -> StackSize {
        StackSize::words(self.claimed)
    }

    pub const fn remaining(&self) -> StackSize {
        StackSize::words(self.capacity - self.claimed)
    }
}
