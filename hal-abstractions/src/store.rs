#![deny(unsafe_code)]
//! Configuration store initialization contract
//!
//! Only bringing the store online is covered here. Reads and writes are
//! the store's own business and are synchronized by the store itself.

/// Store initialization errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying storage driver failed
    Storage,
    /// Persisted data is present but not recognised
    Corrupt,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Storage => write!(f, "Storage driver error"),
            Self::Corrupt => write!(f, "Store contents corrupt"),
        }
    }
}

impl core::error::Error for StoreError {}

/// Persistent key/value configuration store
pub trait ConfigStore {
    /// Bring the store online. May block briefly on storage I/O.
    fn init(&mut self) -> Result<(), StoreError>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &mut T {
    fn init(&mut self) -> Result<(), StoreError> {
        (**self).init()
    }
}
