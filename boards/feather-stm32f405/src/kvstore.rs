#![deny(unsafe_code)]
#![deny(warnings)]
//! Key/value configuration store on internal flash
//!
//! Only the bring-up half of the store lives here: the store owns one flash
//! sector and is online once that sector carries a valid header. A blank
//! (erased) sector is formatted on first boot. A sector holding anything
//! else is reported as corrupt and left untouched.
//!
//! # Header layout (16 bytes)
//!
//! ```text
//! 0..8    magic   b"IOTKVCFG"
//! 8..12   version u32 LE
//! 12..16  !version u32 LE
//! ```

use defmt::{error, info, warn};
use embassy_stm32::flash::Flash;
use embassy_stm32::flash::Blocking;
use hal_abstractions::{ConfigStore, StoreError};

use crate::config::KvStoreConfig;

const HEADER_LEN: usize = 16;
const HEADER_MAGIC: [u8; 8] = *b"IOTKVCFG";
const FORMAT_VERSION: u32 = 1;

/// What the first bytes of the store sector hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
enum SectorState {
    Formatted,
    Erased,
    Unrecognised,
}

fn header() -> [u8; HEADER_LEN] {
    let mut bytes = [0u8; HEADER_LEN];
    bytes[..8].copy_from_slice(&HEADER_MAGIC);
    bytes[8..12].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes[12..].copy_from_slice(&(!FORMAT_VERSION).to_le_bytes());
    bytes
}

fn classify(bytes: &[u8; HEADER_LEN]) -> SectorState {
    if bytes.iter().all(|b| *b == 0xFF) {
        SectorState::Erased
    } else if *bytes == header() {
        SectorState::Formatted
    } else {
        SectorState::Unrecognised
    }
}

fn storage_error(e: embassy_stm32::flash::Error) -> StoreError {
    error!("Flash access failed: {:?}", e);
    StoreError::Storage
}

/// Flash-backed configuration store
pub struct FlashKvStore<'d> {
    flash: Flash<'d, Blocking>,
    config: KvStoreConfig,
}

impl<'d> FlashKvStore<'d> {
    pub fn new(flash: Flash<'d, Blocking>, config: KvStoreConfig) -> Self {
        Self { flash, config }
    }

    fn format(&mut self) -> Result<(), StoreError> {
        let start = self.config.sector_offset;
        let end = start + self.config.sector_size;

        warn!("KV store sector blank, formatting");
        self.flash
            .blocking_erase(start, end)
            .map_err(storage_error)?;
        self.flash
            .blocking_write(start, &header())
            .map_err(storage_error)
    }
}

impl ConfigStore for FlashKvStore<'_> {
    fn init(&mut self) -> Result<(), StoreError> {
        let mut bytes = [0u8; HEADER_LEN];
        self.flash
            .blocking_read(self.config.sector_offset, &mut bytes)
            .map_err(storage_error)?;

        match classify(&bytes) {
            SectorState::Formatted => {}
            SectorState::Erased => self.format()?,
            SectorState::Unrecognised => {
                error!("KV store header not recognised");
                return Err(StoreError::Corrupt);
            }
        }

        info!(
            "KV store online at flash offset {=u32:#x}",
            self.config.sector_offset
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(&[0xFF; HEADER_LEN]), SectorState::Erased);
        assert_eq!(classify(&header()), SectorState::Formatted);

        let mut stale = header();
        stale[8] = 2;
        assert_eq!(classify(&stale), SectorState::Unrecognised);
    }
}
