//! Commands sent from the configuration application
//!
//! A command record is a JSON object whose `cmd` field names the command.
//! Parsing happens in two passes over the same bytes: a small envelope
//! picks out `cmd`, then the command-specific shape is decoded. Unknown
//! fields are ignored.
//!
//! A gun selector may be a number or a string. serde-json-core cannot
//! decode untyped values, so the `gun` field is tried as a number first
//! and then as a string.

use core::fmt;

use heapless::Vec;
use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::{ProtocolError, MAX_LINES};

/// Which gun(s) a test command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GunSelector {
    /// Gun 1 only
    Gun1,
    /// Gun 2 only
    Gun2,
    /// Both guns
    Both,
}

impl GunSelector {
    /// Resolve a numeric selector (1 or 2)
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(GunSelector::Gun1),
            2 => Some(GunSelector::Gun2),
            _ => None,
        }
    }

    /// Resolve a textual selector ("1", "2" or "both")
    pub fn from_text(s: &str) -> Option<Self> {
        match s {
            "1" => Some(GunSelector::Gun1),
            "2" => Some(GunSelector::Gun2),
            "both" => Some(GunSelector::Both),
            _ => None,
        }
    }

    /// Check whether the gun at `index` (0 or 1) is selected
    pub fn includes(self, index: usize) -> bool {
        match self {
            GunSelector::Gun1 => index == 0,
            GunSelector::Gun2 => index == 1,
            GunSelector::Both => index < 2,
        }
    }
}

/// One pattern line as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WireLine {
    pub start: f32,
    pub end: f32,
}

/// Pattern lines, capped at [`MAX_LINES`]
///
/// Lines beyond the cap are parsed and then dropped rather than failing
/// the whole record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineList(Vec<WireLine, MAX_LINES>);

impl LineList {
    /// Create an empty list
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a line, dropping it when the list is full
    pub fn push(&mut self, line: WireLine) {
        let _ = self.0.push(line);
    }

    pub fn as_slice(&self) -> &[WireLine] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for LineList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LinesVisitor;

        impl<'de> Visitor<'de> for LinesVisitor {
            type Value = LineList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array of {start, end} lines")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LineList, A::Error> {
                let mut lines = LineList::new();
                while let Some(line) = seq.next_element::<WireLine>()? {
                    lines.push(line);
                }
                Ok(lines)
            }
        }

        deserializer.deserialize_seq(LinesVisitor)
    }
}

impl Serialize for LineList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

/// Partial configuration update
///
/// Integer fields are decoded signed so that an out-of-range value only
/// drops that field during validation instead of the whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigUpdate {
    #[serde(default)]
    pub pulses_per_mm: Option<f32>,
    #[serde(default)]
    pub max_ms_per_mm: Option<i64>,
    #[serde(default)]
    pub photocell_offset_mm: Option<f32>,
    #[serde(default)]
    pub debounce_ms: Option<i64>,
}

/// Parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start or stop production
    SetActive { active: bool },
    /// Update any subset of the configuration
    SetConfig(ConfigUpdate),
    /// Replace one gun's pattern
    SetPattern { gun: i64, lines: LineList },
    /// Arm encoder calibration against a reference sheet
    CalibArm { paper_length_mm: f32 },
    /// Force gun(s) open for a bounded time
    TestOpen {
        gun: GunSelector,
        timeout_ms: Option<i64>,
    },
    /// Cancel a test override
    TestClose { gun: GunSelector },
    /// Request the current configuration
    GetConfig,
    /// Request one gun's pattern
    GetPattern { gun: i64 },
    /// Request a status snapshot
    GetStatus,
}

/// Command names, used for acknowledgements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    SetActive,
    SetConfig,
    SetPattern,
    CalibArm,
    TestOpen,
    TestClose,
    GetConfig,
    GetPattern,
    GetStatus,
}

impl CommandKind {
    /// Wire name of the command
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::SetActive => "set_active",
            CommandKind::SetConfig => "set_config",
            CommandKind::SetPattern => "set_pattern",
            CommandKind::CalibArm => "calib_arm",
            CommandKind::TestOpen => "test_open",
            CommandKind::TestClose => "test_close",
            CommandKind::GetConfig => "get_config",
            CommandKind::GetPattern => "get_pattern",
            CommandKind::GetStatus => "get_status",
        }
    }

    /// Look up a command by wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "set_active" => Some(CommandKind::SetActive),
            "set_config" => Some(CommandKind::SetConfig),
            "set_pattern" => Some(CommandKind::SetPattern),
            "calib_arm" => Some(CommandKind::CalibArm),
            "test_open" => Some(CommandKind::TestOpen),
            "test_close" => Some(CommandKind::TestClose),
            "get_config" => Some(CommandKind::GetConfig),
            "get_pattern" => Some(CommandKind::GetPattern),
            "get_status" => Some(CommandKind::GetStatus),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct Envelope<'a> {
    #[serde(borrow)]
    cmd: &'a str,
}

#[derive(Deserialize)]
struct SetActiveWire {
    active: bool,
}

#[derive(Deserialize)]
struct SetPatternWire {
    gun: i64,
    lines: LineList,
}

#[derive(Deserialize)]
struct CalibArmWire {
    paper_length_mm: f32,
}

#[derive(Deserialize)]
struct TimeoutWire {
    #[serde(default)]
    timeout_ms: Option<i64>,
}

#[derive(Deserialize)]
struct GunNumberWire {
    gun: i64,
}

#[derive(Deserialize)]
struct GunTextWire<'a> {
    #[serde(borrow)]
    gun: &'a str,
}

fn decode<'a, T: Deserialize<'a>>(record: &'a [u8]) -> Result<T, ProtocolError> {
    let (value, _) = serde_json_core::from_slice(record)?;
    Ok(value)
}

/// Decode the `gun` field as `1`, `2` or `"both"`
fn decode_selector(record: &[u8]) -> Result<GunSelector, ProtocolError> {
    let selector = match decode::<GunNumberWire>(record) {
        Ok(wire) => GunSelector::from_number(wire.gun),
        Err(_) => {
            let wire: GunTextWire = decode(record)?;
            GunSelector::from_text(wire.gun)
        }
    };
    selector.ok_or(ProtocolError::Malformed)
}

impl Command {
    /// Parse a single record (without its trailing newline)
    pub fn parse(record: &[u8]) -> Result<Self, ProtocolError> {
        let envelope: Envelope = decode(record)?;
        let kind = CommandKind::from_name(envelope.cmd).ok_or(ProtocolError::UnknownCommand)?;

        let command = match kind {
            CommandKind::SetActive => {
                let wire: SetActiveWire = decode(record)?;
                Command::SetActive {
                    active: wire.active,
                }
            }
            CommandKind::SetConfig => Command::SetConfig(decode(record)?),
            CommandKind::SetPattern => {
                let wire: SetPatternWire = decode(record)?;
                Command::SetPattern {
                    gun: wire.gun,
                    lines: wire.lines,
                }
            }
            CommandKind::CalibArm => {
                let wire: CalibArmWire = decode(record)?;
                Command::CalibArm {
                    paper_length_mm: wire.paper_length_mm,
                }
            }
            CommandKind::TestOpen => {
                let gun = decode_selector(record)?;
                let wire: TimeoutWire = decode(record)?;
                Command::TestOpen {
                    gun,
                    timeout_ms: wire.timeout_ms,
                }
            }
            CommandKind::TestClose => Command::TestClose {
                gun: decode_selector(record)?,
            },
            CommandKind::GetConfig => Command::GetConfig,
            CommandKind::GetPattern => {
                let wire: GunNumberWire = decode(record)?;
                Command::GetPattern { gun: wire.gun }
            }
            CommandKind::GetStatus => Command::GetStatus,
        };

        Ok(command)
    }

    /// Name of this command
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::SetActive { .. } => CommandKind::SetActive,
            Command::SetConfig(_) => CommandKind::SetConfig,
            Command::SetPattern { .. } => CommandKind::SetPattern,
            Command::CalibArm { .. } => CommandKind::CalibArm,
            Command::TestOpen { .. } => CommandKind::TestOpen,
            Command::TestClose { .. } => CommandKind::TestClose,
            Command::GetConfig => CommandKind::GetConfig,
            Command::GetPattern { .. } => CommandKind::GetPattern,
            Command::GetStatus => CommandKind::GetStatus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Command, ProtocolError> {
        Command::parse(s.as_bytes())
    }

    #[test]
    fn test_parse_set_active() {
        assert_eq!(
            parse(r#"{"cmd":"set_active","active":true}"#),
            Ok(Command::SetActive { active: true })
        );
    }

    #[test]
    fn test_parse_set_config_partial() {
        let cmd = parse(r#"{"cmd":"set_config","max_ms_per_mm":250,"debounce_ms":-4}"#).unwrap();
        let Command::SetConfig(update) = cmd else {
            panic!("expected set_config");
        };
        assert_eq!(update.pulses_per_mm, None);
        assert_eq!(update.max_ms_per_mm, Some(250));
        assert_eq!(update.photocell_offset_mm, None);
        assert_eq!(update.debounce_ms, Some(-4));
    }

    #[test]
    fn test_parse_set_pattern() {
        let cmd = parse(
            r#"{"cmd":"set_pattern","gun":2,"lines":[{"start":10,"end":40},{"start":80.5,"end":60}]}"#,
        )
        .unwrap();
        let Command::SetPattern { gun, lines } = cmd else {
            panic!("expected set_pattern");
        };
        assert_eq!(gun, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.as_slice()[1], WireLine { start: 80.5, end: 60.0 });
    }

    #[test]
    fn test_parse_set_pattern_drops_excess_lines() {
        let mut record = heapless::String::<2048>::new();
        record.push_str(r#"{"cmd":"set_pattern","gun":1,"lines":["#).unwrap();
        for i in 0..40 {
            if i > 0 {
                record.push(',').unwrap();
            }
            record.push_str(r#"{"start":1,"end":2}"#).unwrap();
        }
        record.push_str("]}").unwrap();

        let Command::SetPattern { lines, .. } = parse(&record).unwrap() else {
            panic!("expected set_pattern");
        };
        assert_eq!(lines.len(), MAX_LINES);
    }

    #[test]
    fn test_parse_calib_arm() {
        assert_eq!(
            parse(r#"{"cmd":"calib_arm","paper_length_mm":297}"#),
            Ok(Command::CalibArm {
                paper_length_mm: 297.0
            })
        );
    }

    #[test]
    fn test_parse_gun_selectors() {
        assert_eq!(
            parse(r#"{"cmd":"test_open","gun":"both","timeout_ms":500}"#),
            Ok(Command::TestOpen {
                gun: GunSelector::Both,
                timeout_ms: Some(500)
            })
        );
        assert_eq!(
            parse(r#"{"cmd":"test_open","gun":2}"#),
            Ok(Command::TestOpen {
                gun: GunSelector::Gun2,
                timeout_ms: None
            })
        );
        assert_eq!(
            parse(r#"{"cmd":"test_open","gun":1}"#),
            Ok(Command::TestOpen {
                gun: GunSelector::Gun1,
                timeout_ms: None
            })
        );
        assert_eq!(
            parse(r#"{"cmd":"test_close","gun":1}"#),
            Ok(Command::TestClose {
                gun: GunSelector::Gun1
            })
        );
        assert_eq!(
            parse(r#"{"cmd":"test_close","gun":"both"}"#),
            Ok(Command::TestClose {
                gun: GunSelector::Both
            })
        );
    }

    #[test]
    fn test_selector_field_order_is_free() {
        assert_eq!(
            parse(r#"{"timeout_ms":250,"gun":"2","cmd":"test_open"}"#),
            Ok(Command::TestOpen {
                gun: GunSelector::Gun2,
                timeout_ms: Some(250)
            })
        );
    }

    #[test]
    fn test_unresolvable_selector_is_rejected() {
        assert_eq!(
            parse(r#"{"cmd":"test_close","gun":3}"#),
            Err(ProtocolError::Malformed)
        );
        assert_eq!(
            parse(r#"{"cmd":"test_open","gun":"left"}"#),
            Err(ProtocolError::Malformed)
        );
        assert_eq!(
            parse(r#"{"cmd":"test_open","gun":true}"#),
            Err(ProtocolError::Malformed)
        );
        assert_eq!(
            parse(r#"{"cmd":"test_close"}"#),
            Err(ProtocolError::Malformed)
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        assert_eq!(
            parse(r#"{"seq":7,"cmd":"set_active","extra":[1,{"a":2.5}],"active":false}"#),
            Ok(Command::SetActive { active: false })
        );
    }

    #[test]
    fn test_malformed_records() {
        assert_eq!(parse(""), Err(ProtocolError::Malformed));
        assert_eq!(parse("{not json"), Err(ProtocolError::Malformed));
        assert_eq!(parse(r#"{"active":true}"#), Err(ProtocolError::Malformed));
        assert_eq!(
            parse(r#"{"cmd":"set_active"}"#),
            Err(ProtocolError::Malformed)
        );
        assert_eq!(
            parse(r#"{"cmd":"reboot"}"#),
            Err(ProtocolError::UnknownCommand)
        );
    }

    #[test]
    fn test_command_kind_names_roundtrip() {
        let kinds = [
            CommandKind::SetActive,
            CommandKind::SetConfig,
            CommandKind::SetPattern,
            CommandKind::CalibArm,
            CommandKind::TestOpen,
            CommandKind::TestClose,
            CommandKind::GetConfig,
            CommandKind::GetPattern,
            CommandKind::GetStatus,
        ];
        for kind in kinds {
            assert_eq!(CommandKind::from_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_selector_includes() {
        assert!(GunSelector::Gun1.includes(0));
        assert!(!GunSelector::Gun1.includes(1));
        assert!(GunSelector::Gun2.includes(1));
        assert!(GunSelector::Both.includes(0) && GunSelector::Both.includes(1));
    }
}
