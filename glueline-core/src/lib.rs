//! Board-agnostic control engine for the glue gun firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Encoder pulse hand-off from interrupt context and position integration
//! - Photocell debouncing
//! - Per-sheet position tracking with a speed interlock
//! - Pattern evaluation for the two glue guns
//! - Encoder self-calibration
//! - Timed manual test overrides
//! - Settings persistence with CRC-checked records
//! - Command processing against the owned [`Controller`]
//!
//! Everything except [`encoder::PulseCounter`] is owned by a single
//! [`Controller`] value and touched only by the control loop.

#![no_std]
#![deny(unsafe_code)]

pub mod calibration;
pub mod command;
pub mod config;
pub mod controller;
pub mod encoder;
pub mod pattern;
pub mod photocell;
pub mod sheet;
pub mod storage;
pub mod test_override;
pub mod time;
pub mod traits;

pub use config::{Config, Gun, Settings, GUN_COUNT};
pub use controller::{Controller, CycleReport};
pub use encoder::{CounterSampler, PositionIntegrator, PulseCounter};
pub use pattern::{Line, Pattern, MAX_LINES};
pub use storage::{CodecError, SettingsStore};
