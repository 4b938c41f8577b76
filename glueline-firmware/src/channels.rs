//! Inter-task communication
//!
//! Defines the statics shared between Embassy tasks. Uses embassy-sync
//! primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use glueline_core::PulseCounter;
use glueline_protocol::{Command, Event};

/// Channel capacity for parsed commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outgoing events
const EVENT_CHANNEL_SIZE: usize = 8;

/// Encoder pulses, incremented by the encoder task and drained by the
/// control task
pub static PULSES: PulseCounter = PulseCounter::new();

/// Commands parsed by the serial receive task
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Events waiting for the serial transmit task
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE> =
    Channel::new();
