//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in glueline-core on top of glueline-hal pins:
//!
//! - Glue gun valve outputs (active-high or active-low)
//! - Photocell sheet sensor input (optionally inverted)

#![no_std]
#![deny(unsafe_code)]

pub mod gun;
pub mod photocell;

pub use gun::GpioGun;
pub use photocell::GpioPhotocell;
