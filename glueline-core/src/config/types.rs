//! Configuration type definitions
//!
//! [`Config`] is always valid: every mutation path range-checks its fields
//! and a corrupt stored record falls back to [`Config::DEFAULT`].

use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;

/// Number of glue guns
pub const GUN_COUNT: usize = 2;

/// Smallest accepted encoder resolution (also the division floor)
pub const MIN_PULSES_PER_MM: f32 = 0.0001;

/// Accepted range for the speed interlock threshold
pub const MAX_MS_PER_MM_RANGE: RangeInclusive<u32> = 1..=60_000;

/// Accepted range for the photocell debounce time
pub const DEBOUNCE_MS_RANGE: RangeInclusive<u32> = 0..=1_000;

/// Glue gun identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gun {
    Gun1,
    Gun2,
}

impl Gun {
    /// Both guns, in index order
    pub const ALL: [Gun; GUN_COUNT] = [Gun::Gun1, Gun::Gun2];

    /// Array index (0 or 1)
    pub const fn index(self) -> usize {
        match self {
            Gun::Gun1 => 0,
            Gun::Gun2 => 1,
        }
    }

    /// Wire number (1 or 2)
    pub const fn number(self) -> u8 {
        match self {
            Gun::Gun1 => 1,
            Gun::Gun2 => 2,
        }
    }

    /// Resolve a wire number
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Gun::Gun1),
            2 => Some(Gun::Gun2),
            _ => None,
        }
    }
}

/// Machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Encoder pulses per millimeter of paper travel
    pub pulses_per_mm: f32,
    /// Slowest allowed paper speed, as milliseconds per millimeter
    pub max_ms_per_mm: u32,
    /// Distance from the photocell to the nozzles (mm, any sign)
    pub photocell_offset_mm: f32,
    /// Time the photocell must hold a level before it is accepted
    pub debounce_ms: u32,
}

impl Config {
    /// Factory defaults
    pub const DEFAULT: Config = Config {
        pulses_per_mm: 10.0,
        max_ms_per_mm: 100,
        photocell_offset_mm: 0.0,
        debounce_ms: 20,
    };

    /// Check an encoder resolution
    pub fn pulses_per_mm_valid(value: f32) -> bool {
        value.is_finite() && value > MIN_PULSES_PER_MM
    }

    /// Check a photocell offset
    pub fn offset_valid(value: f32) -> bool {
        value.is_finite()
    }

    /// Check every field
    pub fn is_valid(&self) -> bool {
        Self::pulses_per_mm_valid(self.pulses_per_mm)
            && MAX_MS_PER_MM_RANGE.contains(&self.max_ms_per_mm)
            && Self::offset_valid(self.photocell_offset_mm)
            && DEBOUNCE_MS_RANGE.contains(&self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything that is persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub config: Config,
    /// Pattern per gun, indexed by [`Gun::index`]
    pub patterns: [Pattern; GUN_COUNT],
}

impl Settings {
    /// Pattern for one gun
    pub fn pattern(&self, gun: Gun) -> &Pattern {
        &self.patterns[gun.index()]
    }

    /// Furthest line endpoint across both guns, floored at 0
    pub fn furthest_pattern_end(&self) -> f32 {
        self.patterns
            .iter()
            .filter_map(Pattern::furthest_end)
            .fold(0.0, f32::max)
    }
}
