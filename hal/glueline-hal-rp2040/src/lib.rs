//! RP2040-specific HAL for the glue gun firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `glueline-hal` traits:
//!
//! - Wear-levelled settings partition in the last 64 KiB of flash
//!   (implements `glueline_hal::RecordStorage`)
//! - GPIO outputs and inputs wrapped as `glueline_hal` pins
//! - Encoder pulse input

#![no_std]

pub mod flash;
pub mod gpio;
pub mod pulse;

// Re-export shared traits from glueline-hal for convenience
pub use glueline_hal::{InputPin, OutputPin, RecordStorage, StorageError};
