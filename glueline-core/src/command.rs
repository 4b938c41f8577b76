//! Command processing
//!
//! Commands are applied synchronously from the control loop, between
//! cycles. A rejected command has no effect and gets no reply; an applied
//! one is answered with an acknowledgement or the requested report.

use glueline_hal::RecordStorage;
use glueline_protocol::{Command, ConfigUpdate, Event, LineList, WireLine};

use crate::config::{Config, Gun, DEBOUNCE_MS_RANGE, MAX_MS_PER_MM_RANGE};
use crate::controller::Controller;
use crate::pattern::{Line, Pattern};

impl<S: RecordStorage> Controller<S> {
    /// Validate and apply one command
    ///
    /// Returns the reply to send, or `None` when the command was rejected.
    pub fn apply(&mut self, command: Command, now_ms: u32) -> Option<Event> {
        let ack = Some(Event::Ack {
            cmd: command.kind(),
        });

        match command {
            Command::SetActive { active } => {
                self.set_active(active);
                ack
            }
            Command::SetConfig(update) => {
                if self.update_config(&update) {
                    // A failed save is counted and otherwise ignored
                    let _ = self.persist();
                }
                ack
            }
            Command::SetPattern { gun, lines } => {
                let gun = Gun::from_number(gun)?;
                let pattern = pattern_from_wire(&lines)?;
                self.settings.patterns[gun.index()] = pattern;
                let _ = self.persist();
                ack
            }
            Command::CalibArm { paper_length_mm } => {
                if self.calibration.arm(paper_length_mm) {
                    ack
                } else {
                    None
                }
            }
            Command::TestOpen { gun, timeout_ms } => {
                self.overrides.open(gun, timeout_ms, now_ms);
                ack
            }
            Command::TestClose { gun } => {
                self.overrides.close(gun);
                ack
            }
            Command::GetConfig => Some(Event::Config(self.config_report())),
            Command::GetPattern { gun } => {
                let gun = Gun::from_number(gun)?;
                Some(Event::Pattern {
                    gun: gun.number(),
                    lines: pattern_to_wire(&self.settings.patterns[gun.index()]),
                })
            }
            Command::GetStatus => Some(Event::Status(self.status())),
        }
    }

    /// Apply each in-range field of a partial update
    ///
    /// Returns true if any value actually changed.
    fn update_config(&mut self, update: &ConfigUpdate) -> bool {
        let before = self.settings.config;
        let config = &mut self.settings.config;

        if let Some(v) = update.pulses_per_mm.filter(|&v| Config::pulses_per_mm_valid(v)) {
            config.pulses_per_mm = v;
        }
        if let Some(v) = in_range(update.max_ms_per_mm, &MAX_MS_PER_MM_RANGE) {
            config.max_ms_per_mm = v;
        }
        if let Some(v) = update.photocell_offset_mm.filter(|&v| Config::offset_valid(v)) {
            config.photocell_offset_mm = v;
        }
        if let Some(v) = in_range(update.debounce_ms, &DEBOUNCE_MS_RANGE) {
            config.debounce_ms = v;
        }

        *config != before
    }
}

fn in_range(value: Option<i64>, range: &core::ops::RangeInclusive<u32>) -> Option<u32> {
    let v = u32::try_from(value?).ok()?;
    range.contains(&v).then_some(v)
}

/// Convert wire lines, rejecting non-finite coordinates
fn pattern_from_wire(lines: &LineList) -> Option<Pattern> {
    if lines
        .as_slice()
        .iter()
        .any(|l| !l.start.is_finite() || !l.end.is_finite())
    {
        return None;
    }
    Some(Pattern::from_lines(
        lines.as_slice().iter().map(|l| Line::new(l.start, l.end)),
    ))
}

fn pattern_to_wire(pattern: &Pattern) -> LineList {
    let mut lines = LineList::new();
    for line in pattern.lines() {
        lines.push(WireLine {
            start: line.start_mm,
            end: line.end_mm,
        });
    }
    lines
}
