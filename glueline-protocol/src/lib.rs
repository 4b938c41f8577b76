//! Glueline Configuration Protocol
//!
//! Commands and events exchanged between the configuration application and
//! the controller over a serial link.
//!
//! # Protocol Overview
//!
//! Every record is one line of compact JSON terminated by `\n`:
//!
//! ```text
//! → {"cmd":"set_pattern","gun":1,"lines":[{"start":10,"end":40}]}
//! ← {"evt":"ack","cmd":"set_pattern"}
//! → {"cmd":"calib_arm","paper_length_mm":297}
//! ← {"evt":"ack","cmd":"calib_arm"}
//! ← {"evt":"calib_result","pulses_per_mm":10.0}
//! ```
//!
//! This crate only checks structure. Range checks belong to the command
//! processor in `glueline-core`, which may ignore individual fields.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod event;
pub mod line;

pub use command::{Command, CommandKind, ConfigUpdate, GunSelector, LineList, WireLine};
pub use event::{ConfigReport, Event, StatusReport};
pub use line::{LineAssembler, MAX_RECORD_LEN};

/// Maximum pattern lines per gun
pub const MAX_LINES: usize = 32;

/// Errors from parsing or encoding records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Record is not valid JSON or lacks a required field
    Malformed,
    /// The `cmd` field names no known command
    UnknownCommand,
    /// Record exceeded the maximum line length
    TooLong,
    /// Output buffer too small for the encoded event
    BufferTooSmall,
}

impl From<serde_json_core::de::Error> for ProtocolError {
    fn from(_: serde_json_core::de::Error) -> Self {
        ProtocolError::Malformed
    }
}

impl From<serde_json_core::ser::Error> for ProtocolError {
    fn from(_: serde_json_core::ser::Error) -> Self {
        ProtocolError::BufferTooSmall
    }
}
