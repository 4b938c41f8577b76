//! Events sent from the controller to the configuration application
//!
//! Each event encodes to one JSON object whose `evt` field names the event.

use serde::Serialize;

use crate::command::{CommandKind, LineList};
use crate::ProtocolError;

/// Current configuration, as reported by `get_config`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigReport {
    pub pulses_per_mm: f32,
    pub max_ms_per_mm: u32,
    pub photocell_offset_mm: f32,
    pub debounce_ms: u32,
}

/// Controller snapshot, as reported by `get_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub active: bool,
    pub sheets: u8,
    pub gun1: bool,
    pub gun2: bool,
    pub calibrating: bool,
    pub persist_errors: u32,
}

/// Outgoing event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A command was accepted and applied
    Ack { cmd: CommandKind },
    /// Calibration finished with a new resolution
    CalibResult { pulses_per_mm: f32 },
    /// Reply to `get_config`
    Config(ConfigReport),
    /// Reply to `get_pattern`
    Pattern { gun: u8, lines: LineList },
    /// Reply to `get_status`
    Status(StatusReport),
}

#[derive(Serialize)]
struct AckWire {
    evt: &'static str,
    cmd: &'static str,
}

#[derive(Serialize)]
struct CalibResultWire {
    evt: &'static str,
    pulses_per_mm: f32,
}

#[derive(Serialize)]
struct ConfigWire {
    evt: &'static str,
    pulses_per_mm: f32,
    max_ms_per_mm: u32,
    photocell_offset_mm: f32,
    debounce_ms: u32,
}

#[derive(Serialize)]
struct PatternWire<'a> {
    evt: &'static str,
    gun: u8,
    lines: &'a LineList,
}

#[derive(Serialize)]
struct StatusWire {
    evt: &'static str,
    active: bool,
    sheets: u8,
    gun1: bool,
    gun2: bool,
    calibrating: bool,
    persist_errors: u32,
}

impl Event {
    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            Event::Ack { .. } => "ack",
            Event::CalibResult { .. } => "calib_result",
            Event::Config(_) => "config",
            Event::Pattern { .. } => "pattern",
            Event::Status(_) => "status",
        }
    }

    /// Encode this event into `buffer`
    ///
    /// Returns the number of bytes written (no trailing newline).
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        let evt = self.name();
        let len = match self {
            Event::Ack { cmd } => serde_json_core::to_slice(
                &AckWire {
                    evt,
                    cmd: cmd.as_str(),
                },
                buffer,
            )?,
            Event::CalibResult { pulses_per_mm } => serde_json_core::to_slice(
                &CalibResultWire {
                    evt,
                    pulses_per_mm: *pulses_per_mm,
                },
                buffer,
            )?,
            Event::Config(report) => serde_json_core::to_slice(
                &ConfigWire {
                    evt,
                    pulses_per_mm: report.pulses_per_mm,
                    max_ms_per_mm: report.max_ms_per_mm,
                    photocell_offset_mm: report.photocell_offset_mm,
                    debounce_ms: report.debounce_ms,
                },
                buffer,
            )?,
            Event::Pattern { gun, lines } => serde_json_core::to_slice(
                &PatternWire {
                    evt,
                    gun: *gun,
                    lines,
                },
                buffer,
            )?,
            Event::Status(report) => serde_json_core::to_slice(
                &StatusWire {
                    evt,
                    active: report.active,
                    sheets: report.sheets,
                    gun1: report.gun1,
                    gun2: report.gun2,
                    calibrating: report.calibrating,
                    persist_errors: report.persist_errors,
                },
                buffer,
            )?,
        };
        Ok(len)
    }

    /// Encode this event followed by a newline
    pub fn encode_line(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        let len = self.encode(buffer)?;
        let slot = buffer.get_mut(len).ok_or(ProtocolError::BufferTooSmall)?;
        *slot = b'\n';
        Ok(len + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::WireLine;

    fn encode(event: &Event) -> heapless::String<512> {
        let mut buf = [0u8; 512];
        let len = event.encode(&mut buf).unwrap();
        let mut out = heapless::String::new();
        out.push_str(core::str::from_utf8(&buf[..len]).unwrap())
            .unwrap();
        out
    }

    #[test]
    fn test_encode_ack() {
        let event = Event::Ack {
            cmd: CommandKind::SetPattern,
        };
        assert_eq!(encode(&event), r#"{"evt":"ack","cmd":"set_pattern"}"#);
    }

    #[test]
    fn test_encode_calib_result() {
        let event = Event::CalibResult {
            pulses_per_mm: 10.0,
        };
        let text = encode(&event);
        assert!(text.starts_with(r#"{"evt":"calib_result","pulses_per_mm":10"#));
    }

    #[test]
    fn test_encode_status() {
        let event = Event::Status(StatusReport {
            active: true,
            sheets: 3,
            gun1: true,
            gun2: false,
            calibrating: false,
            persist_errors: 0,
        });
        assert_eq!(
            encode(&event),
            r#"{"evt":"status","active":true,"sheets":3,"gun1":true,"gun2":false,"calibrating":false,"persist_errors":0}"#
        );
    }

    #[test]
    fn test_encode_pattern_lines() {
        let mut lines = LineList::new();
        lines.push(WireLine {
            start: 10.0,
            end: 40.0,
        });
        let text = encode(&Event::Pattern { gun: 1, lines });
        assert!(text.starts_with(r#"{"evt":"pattern","gun":1,"lines":[{"start":10"#));
        assert!(text.ends_with("}]}"));
    }

    #[test]
    fn test_encode_line_appends_newline() {
        let mut buf = [0u8; 64];
        let len = Event::Ack {
            cmd: CommandKind::GetStatus,
        }
        .encode_line(&mut buf)
        .unwrap();
        assert_eq!(buf[len - 1], b'\n');
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buf = [0u8; 8];
        let result = Event::Ack {
            cmd: CommandKind::SetConfig,
        }
        .encode(&mut buf);
        assert_eq!(result, Err(ProtocolError::BufferTooSmall));
    }
}
