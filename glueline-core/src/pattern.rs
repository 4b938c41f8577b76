//! Glue patterns and gun evaluation
//!
//! A pattern is an unordered set of closed intervals along the sheet. Lines
//! may be entered in either direction and may overlap; membership is the
//! union of all lines.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::config::GUN_COUNT;
use crate::sheet::Sheet;

/// Maximum lines per pattern
pub const MAX_LINES: usize = glueline_protocol::MAX_LINES;

/// One glue line, in millimeters from the sheet's leading edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line {
    pub start_mm: f32,
    pub end_mm: f32,
}

impl Line {
    pub const fn new(start_mm: f32, end_mm: f32) -> Self {
        Self { start_mm, end_mm }
    }

    /// Lower bound
    pub fn low(&self) -> f32 {
        self.start_mm.min(self.end_mm)
    }

    /// Upper bound
    pub fn high(&self) -> f32 {
        self.start_mm.max(self.end_mm)
    }

    /// Inclusive membership test
    pub fn contains(&self, position_mm: f32) -> bool {
        position_mm >= self.low() && position_mm <= self.high()
    }
}

/// One gun's pattern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pattern {
    lines: Vec<Line, MAX_LINES>,
}

impl Pattern {
    /// Create an empty pattern
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a pattern, silently dropping lines past [`MAX_LINES`]
    pub fn from_lines(lines: impl IntoIterator<Item = Line>) -> Self {
        let mut pattern = Self::new();
        for line in lines {
            if !pattern.push(line) {
                break;
            }
        }
        pattern
    }

    /// Append a line; returns false when the pattern is full
    pub fn push(&mut self, line: Line) -> bool {
        self.lines.push(line).is_ok()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True if any line covers `position_mm`
    pub fn contains(&self, position_mm: f32) -> bool {
        self.lines.iter().any(|line| line.contains(position_mm))
    }

    /// Highest endpoint of any line
    pub fn furthest_end(&self) -> Option<f32> {
        self.lines.iter().map(Line::high).reduce(f32::max)
    }
}

/// Decide which guns the sheets in flight are asking for
///
/// A gun is requested when any active sheet that is not slow-blocked for
/// that gun lies inside the gun's pattern.
pub fn gun_requests<'a>(
    sheets: impl IntoIterator<Item = &'a Sheet>,
    patterns: &[Pattern; GUN_COUNT],
) -> [bool; GUN_COUNT] {
    let mut requested = [false; GUN_COUNT];

    for sheet in sheets {
        if !sheet.active {
            continue;
        }
        for (gun, pattern) in patterns.iter().enumerate() {
            if !requested[gun] && !sheet.slow_block[gun] && pattern.contains(sheet.position_mm) {
                requested[gun] = true;
            }
        }
        if requested.iter().all(|&r| r) {
            break;
        }
    }

    requested
}
