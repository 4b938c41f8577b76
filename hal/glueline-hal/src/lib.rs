//! Glueline Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The control engine and drivers only ever see
//! these traits, so the same logic runs on the RP2040 and on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  glueline-firmware / glueline-core      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  glueline-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ glueline-hal- │       │  RamStorage   │
//! │    rp2040     │       │  (host/tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O, with
//!   [`gpio::EhOutput`]/[`gpio::EhInput`] adapters for `embedded-hal` pins
//! - [`storage::RecordStorage`] - Fixed-capacity persistent byte region

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use gpio::{EhInput, EhOutput, InputPin, OutputPin};
pub use storage::{RamStorage, RecordStorage, StorageError};
