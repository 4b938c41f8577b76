//! Configuration types
//!
//! The machine configuration and both guns' patterns make up the persisted
//! [`Settings`]. They are stored in a CRC-checked postcard record (see
//! [`crate::storage`]).

pub mod types;

pub use types::*;
