//! Photocell debouncing
//!
//! The beam is high with no paper present. A sheet's leading edge pulls it
//! low, which is the only edge the controller acts on.

use crate::time::elapsed_ms;

/// Accepted level transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

/// Delay-based debouncer for the photocell input
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Level seen on the previous update
    raw: bool,
    /// Accepted level
    stable: bool,
    /// When `raw` last changed
    last_change_ms: u32,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debouncer {
    /// Start with the beam high (no paper)
    pub const fn new() -> Self {
        Self {
            raw: true,
            stable: true,
            last_change_ms: 0,
        }
    }

    /// Accepted level
    pub fn level(&self) -> bool {
        self.stable
    }

    /// Sample the raw input
    ///
    /// A new level is accepted once the raw input has held it for at least
    /// `debounce_ms`. Each accepted transition is reported exactly once.
    pub fn update(&mut self, raw: bool, now_ms: u32, debounce_ms: u32) -> Option<Edge> {
        if raw != self.raw {
            self.raw = raw;
            self.last_change_ms = now_ms;
        }

        if self.raw == self.stable || elapsed_ms(now_ms, self.last_change_ms) < debounce_ms {
            return None;
        }

        self.stable = self.raw;
        Some(if self.stable { Edge::Rising } else { Edge::Falling })
    }
}
