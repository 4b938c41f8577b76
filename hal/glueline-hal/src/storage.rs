//! Persistent storage abstractions
//!
//! The settings record lives in a fixed-capacity, byte-addressable region
//! (EEPROM, or a reserved flash sector). Records are always read and
//! written whole, starting at offset 0.

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Requested length exceeds the region capacity
    OutOfBounds,
    /// The underlying device reported a failure
    Device,
}

/// Fixed-capacity persistent byte region
///
/// Implementations may buffer writes; callers must invoke [`commit`]
/// after [`write`] for the data to survive a power cycle.
///
/// [`commit`]: RecordStorage::commit
/// [`write`]: RecordStorage::write
pub trait RecordStorage {
    /// Total number of bytes available in the region
    fn capacity(&self) -> usize;

    /// Read `buffer.len()` bytes starting at offset 0
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at offset 0
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError>;

    /// Make previously written data durable
    ///
    /// The default implementation is a no-op for storage that writes through.
    fn commit(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// RAM-backed storage region
///
/// Used for host-side simulation and tests. Starts out erased (all `0xFF`),
/// like a fresh EEPROM.
#[derive(Debug, Clone)]
pub struct RamStorage<const N: usize> {
    data: [u8; N],
    commits: u32,
}

impl<const N: usize> Default for RamStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamStorage<N> {
    /// Create an erased region
    pub const fn new() -> Self {
        Self {
            data: [0xFF; N],
            commits: 0,
        }
    }

    /// Raw contents of the region
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw contents, for injecting corruption
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Number of commits performed so far
    pub fn commit_count(&self) -> u32 {
        self.commits
    }
}

impl<const N: usize> RecordStorage for RamStorage<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), StorageError> {
        let src = self
            .data
            .get(..buffer.len())
            .ok_or(StorageError::OutOfBounds)?;
        buffer.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let dst = self
            .data
            .get_mut(..data.len())
            .ok_or(StorageError::OutOfBounds)?;
        dst.copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.commits = self.commits.saturating_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_storage_starts_erased() {
        let storage = RamStorage::<16>::new();
        assert!(storage.bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(storage.capacity(), 16);
    }

    #[test]
    fn test_ram_storage_write_then_read() {
        let mut storage = RamStorage::<16>::new();
        storage.write(&[1, 2, 3]).unwrap();
        storage.commit().unwrap();

        let mut buf = [0u8; 4];
        storage.read(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 0xFF]);
        assert_eq!(storage.commit_count(), 1);
    }

    #[test]
    fn test_ram_storage_rejects_oversized_access() {
        let mut storage = RamStorage::<4>::new();
        assert_eq!(storage.write(&[0u8; 5]), Err(StorageError::OutOfBounds));

        let mut buf = [0u8; 5];
        assert_eq!(storage.read(&mut buf), Err(StorageError::OutOfBounds));
    }
}
