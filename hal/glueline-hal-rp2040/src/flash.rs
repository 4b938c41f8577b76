//! Flash-backed settings region
//!
//! The settings record is kept as one item in a `sequential-storage` map
//! over the last 64 KiB of flash. A commit appends a new copy of the item
//! before the old one is reclaimed, so an interrupted commit leaves the
//! previous record readable, and writes rotate across the partition's
//! sectors.
//!
//! `RecordStorage` is blocking, so the async map operations are driven to
//! completion with `block_on`.

use embassy_futures::block_on;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use glueline_hal::{RecordStorage, StorageError};

/// Flash size on the Pico
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Settings partition size
pub const SETTINGS_PARTITION_SIZE: usize = 64 * 1024;

/// Settings partition offset from the start of flash
pub const SETTINGS_PARTITION_START: usize = FLASH_SIZE - SETTINGS_PARTITION_SIZE;

/// Flash range for the settings partition
pub const SETTINGS_RANGE: core::ops::Range<u32> =
    (SETTINGS_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Largest record the region accepts
pub const RECORD_CAPACITY: usize = 1024;

/// Map key of the settings record
const SETTINGS_KEY: u8 = 0;

/// Scratch space for map operations: the item plus its header
const DATA_BUFFER_SIZE: usize = 2048;

/// RP2040 settings region
pub struct Rp2040RecordStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    /// Record written but not yet committed
    pending: [u8; RECORD_CAPACITY],
    pending_len: usize,
}

impl<'d> Rp2040RecordStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            pending: [0xFF; RECORD_CAPACITY],
            pending_len: 0,
        }
    }
}

impl<'d> RecordStorage for Rp2040RecordStorage<'d> {
    fn capacity(&self) -> usize {
        RECORD_CAPACITY
    }

    /// A region that has never been committed reads as erased flash
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), StorageError> {
        if buffer.len() > RECORD_CAPACITY {
            return Err(StorageError::OutOfBounds);
        }

        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];
        let result = block_on(map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &SETTINGS_KEY,
        ));

        buffer.fill(0xFF);
        match result {
            Ok(Some(data)) => {
                let len = data.len().min(buffer.len());
                buffer[..len].copy_from_slice(&data[..len]);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(_) => Err(StorageError::Device),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > RECORD_CAPACITY {
            return Err(StorageError::OutOfBounds);
        }
        self.pending[..data.len()].copy_from_slice(data);
        self.pending_len = data.len();
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if self.pending_len == 0 {
            return Ok(());
        }

        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];
        let record: &[u8] = &self.pending[..self.pending_len];
        block_on(map::store_item(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &SETTINGS_KEY,
            &record,
        ))
        .map_err(|_| StorageError::Device)?;

        self.pending_len = 0;
        Ok(())
    }
}
