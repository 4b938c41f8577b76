//! Settings persistence
//!
//! The settings are stored as one fixed-size record at offset 0 of a
//! [`RecordStorage`] region:
//!
//! ```text
//! ┌───────────────────────────────────────────────┬─────────┐
//! │ postcard(magic, version, config, pattern × 2) │ crc16   │
//! │ zero-padded to BODY_SIZE                      │ (LE)    │
//! └───────────────────────────────────────────────┴─────────┘
//! ```
//!
//! The CRC covers the whole record with the CRC field zeroed. Any record
//! that fails a check loads as [`Settings::default`].

use glueline_hal::{RecordStorage, StorageError};
use serde::{Deserialize, Serialize};

use crate::config::{Settings, GUN_COUNT};
use crate::pattern::MAX_LINES;

/// Magic number identifying a settings record
pub const SETTINGS_MAGIC: u32 = 0x474C_5545; // "GLUE"

/// Current record layout version
pub const SETTINGS_VERSION: u16 = 1;

/// Worst-case postcard size of one pattern: length prefix plus lines
const PATTERN_MAX_SIZE: usize = 1 + MAX_LINES * 8;

/// Worst-case postcard size of the record body
///
/// Varint u32 is at most 5 bytes, varint u16 at most 3, f32 always 4.
pub const BODY_SIZE: usize = 5 + 3 + (4 + 5 + 4 + 5) + GUN_COUNT * PATTERN_MAX_SIZE;

/// Total record size including the CRC
pub const RECORD_SIZE: usize = BODY_SIZE + 2;

/// Errors from encoding or decoding the settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Storage region cannot hold a record
    CapacityTooSmall,
    /// Storage read/write/commit failed
    Storage(StorageError),
    /// Stored CRC does not match the contents
    CrcMismatch,
    /// Not a settings record
    BadMagic,
    /// Record written by an incompatible layout
    VersionMismatch,
    /// Record body could not be decoded
    Deserialize,
    /// Settings did not fit the record body
    Serialize,
    /// Decoded configuration is out of range
    InvalidConfig,
}

impl From<StorageError> for CodecError {
    fn from(e: StorageError) -> Self {
        CodecError::Storage(e)
    }
}

#[derive(Serialize)]
struct RecordOut<'a> {
    magic: u32,
    version: u16,
    settings: &'a Settings,
}

#[derive(Deserialize)]
struct RecordHeader {
    magic: u32,
    version: u16,
}

/// CRC-16 with the reflected 0xA001 polynomial, seeded with 0xFFFF
pub fn crc16(data: &[u8]) -> u16 {
    crc16_update(0xFFFF, data)
}

fn crc16_update(crc: u16, data: &[u8]) -> u16 {
    const POLY: u16 = 0xA001;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

fn record_crc(record: &[u8; RECORD_SIZE]) -> u16 {
    crc16_update(crc16(&record[..BODY_SIZE]), &[0, 0])
}

/// Encode settings into a complete record
pub fn encode(settings: &Settings, record: &mut [u8; RECORD_SIZE]) -> Result<(), CodecError> {
    record.fill(0);

    let out = RecordOut {
        magic: SETTINGS_MAGIC,
        version: SETTINGS_VERSION,
        settings,
    };
    postcard::to_slice(&out, &mut record[..BODY_SIZE]).map_err(|_| CodecError::Serialize)?;

    let crc = record_crc(record);
    record[BODY_SIZE..].copy_from_slice(&crc.to_le_bytes());
    Ok(())
}

/// Decode and validate a complete record
pub fn decode(record: &[u8; RECORD_SIZE]) -> Result<Settings, CodecError> {
    let stored = u16::from_le_bytes([record[BODY_SIZE], record[BODY_SIZE + 1]]);
    if stored != record_crc(record) {
        return Err(CodecError::CrcMismatch);
    }

    let (header, rest): (RecordHeader, _) =
        postcard::take_from_bytes(&record[..BODY_SIZE]).map_err(|_| CodecError::Deserialize)?;
    if header.magic != SETTINGS_MAGIC {
        return Err(CodecError::BadMagic);
    }
    if header.version != SETTINGS_VERSION {
        return Err(CodecError::VersionMismatch);
    }

    let settings: Settings = postcard::from_bytes(rest).map_err(|_| CodecError::Deserialize)?;
    if !settings.config.is_valid() {
        return Err(CodecError::InvalidConfig);
    }
    Ok(settings)
}

/// Settings record on a storage region
pub struct SettingsStore<S> {
    storage: S,
}

impl<S: RecordStorage> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read and validate the stored settings
    pub fn load(&mut self) -> Result<Settings, CodecError> {
        if self.storage.capacity() < RECORD_SIZE {
            return Err(CodecError::CapacityTooSmall);
        }
        let mut record = [0u8; RECORD_SIZE];
        self.storage.read(&mut record)?;
        decode(&record)
    }

    /// Load the stored settings, substituting defaults on any failure
    ///
    /// The error, if any, is returned alongside for logging only.
    pub fn load_or_default(&mut self) -> (Settings, Option<CodecError>) {
        match self.load() {
            Ok(settings) => (settings, None),
            Err(e) => (Settings::default(), Some(e)),
        }
    }

    /// Write the settings and commit them
    pub fn save(&mut self, settings: &Settings) -> Result<(), CodecError> {
        if self.storage.capacity() < RECORD_SIZE {
            return Err(CodecError::CapacityTooSmall);
        }
        let mut record = [0u8; RECORD_SIZE];
        encode(settings, &mut record)?;
        self.storage.write(&record)?;
        self.storage.commit()?;
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pattern::{Line, Pattern};
    use glueline_hal::RamStorage;
    use proptest::prelude::*;

    type Region = RamStorage<1024>;

    fn sample() -> Settings {
        Settings {
            config: Config {
                pulses_per_mm: 12.34,
                max_ms_per_mm: 250,
                photocell_offset_mm: -17.5,
                debounce_ms: 5,
            },
            patterns: [
                Pattern::from_lines([Line::new(10.0, 40.0), Line::new(120.5, 80.25)]),
                Pattern::from_lines([Line::new(-3.0, 2.0)]),
            ],
        }
    }

    fn full() -> Settings {
        let lines = |offset: f32| (0..MAX_LINES).map(move |i| Line::new(offset + i as f32, -1.0e30));
        Settings {
            config: Config {
                pulses_per_mm: f32::MAX,
                max_ms_per_mm: 60_000,
                photocell_offset_mm: f32::MIN,
                debounce_ms: 1_000,
            },
            patterns: [Pattern::from_lines(lines(0.0)), Pattern::from_lines(lines(0.5))],
        }
    }

    #[test]
    fn test_crc16_check_value() {
        assert_eq!(crc16(b"123456789"), 0x4B37);
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = SettingsStore::new(Region::new());
        store.save(&sample()).unwrap();
        assert_eq!(store.storage().commit_count(), 1);
        assert_eq!(store.load(), Ok(sample()));
    }

    #[test]
    fn test_largest_settings_fit() {
        let mut store = SettingsStore::new(Region::new());
        store.save(&full()).unwrap();
        assert_eq!(store.load(), Ok(full()));
    }

    #[test]
    fn test_erased_region_loads_defaults() {
        let mut store = SettingsStore::new(Region::new());
        let (settings, error) = store.load_or_default();
        assert_eq!(settings, Settings::default());
        assert_eq!(error, Some(CodecError::CrcMismatch));
    }

    #[test]
    fn test_small_region_loads_defaults() {
        let mut store = SettingsStore::new(RamStorage::<128>::new());
        assert_eq!(store.save(&sample()), Err(CodecError::CapacityTooSmall));
        let (settings, error) = store.load_or_default();
        assert_eq!(settings, Settings::default());
        assert_eq!(error, Some(CodecError::CapacityTooSmall));
    }

    #[test]
    fn test_wrong_magic_and_version() {
        let mut record = [0u8; RECORD_SIZE];
        let out = RecordOut {
            magic: 0xDEAD_BEEF,
            version: SETTINGS_VERSION,
            settings: &sample(),
        };
        postcard::to_slice(&out, &mut record[..BODY_SIZE]).unwrap();
        let crc = record_crc(&record);
        record[BODY_SIZE..].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(decode(&record), Err(CodecError::BadMagic));

        record.fill(0);
        let out = RecordOut {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION + 1,
            settings: &sample(),
        };
        postcard::to_slice(&out, &mut record[..BODY_SIZE]).unwrap();
        let crc = record_crc(&record);
        record[BODY_SIZE..].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(decode(&record), Err(CodecError::VersionMismatch));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut settings = sample();
        settings.config.max_ms_per_mm = 0;
        let mut record = [0u8; RECORD_SIZE];
        encode(&settings, &mut record).unwrap();
        assert_eq!(decode(&record), Err(CodecError::InvalidConfig));
    }

    #[test]
    fn test_every_single_bit_flip_loads_defaults() {
        let mut store = SettingsStore::new(Region::new());
        store.save(&sample()).unwrap();

        for bit in 0..RECORD_SIZE * 8 {
            let mut corrupted = store.storage().clone();
            corrupted.bytes_mut()[bit / 8] ^= 1 << (bit % 8);
            let (settings, error) = SettingsStore::new(corrupted).load_or_default();
            assert_eq!(settings, Settings::default(), "bit {bit}");
            assert!(error.is_some(), "bit {bit}");
        }
    }

    fn arb_line() -> impl Strategy<Value = Line> {
        (-5_000.0f32..5_000.0, -5_000.0f32..5_000.0).prop_map(|(a, b)| Line::new(a, b))
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            0.001f32..1_000.0,
            1u32..=60_000,
            -500.0f32..500.0,
            0u32..=1_000,
            proptest::collection::vec(arb_line(), 0..=MAX_LINES),
            proptest::collection::vec(arb_line(), 0..=MAX_LINES),
        )
            .prop_map(|(ppm, max_ms, offset, debounce, a, b)| Settings {
                config: Config {
                    pulses_per_mm: ppm,
                    max_ms_per_mm: max_ms,
                    photocell_offset_mm: offset,
                    debounce_ms: debounce,
                },
                patterns: [Pattern::from_lines(a), Pattern::from_lines(b)],
            })
    }

    proptest! {
        #[test]
        fn prop_saved_settings_load_back(settings in arb_settings()) {
            let mut store = SettingsStore::new(Region::new());
            store.save(&settings).unwrap();
            prop_assert_eq!(store.load(), Ok(settings));
        }
    }
}
