//! Sheets in flight
//!
//! Sheets live in a fixed pool of [`MAX_SHEETS`] slots. A slot is in use
//! while its `active` flag is set; spawning takes a free slot or evicts the
//! oldest sheet, so it never fails.

use libm::floorf;

use crate::config::GUN_COUNT;
use crate::time::elapsed_ms;

/// Pool size
pub const MAX_SHEETS: usize = 10;

/// A sheet is retired this long after its leading edge was seen
pub const SHEET_TIMEOUT_MS: u32 = 30_000;

/// Travel past the furthest pattern endpoint before a sheet is retired
pub const RETIRE_MARGIN_MM: f32 = 30.0;

/// One tracked sheet
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sheet {
    pub active: bool,
    /// Leading edge position relative to the nozzles; negative while upstream
    pub position_mm: f32,
    pub started_at: u32,
    /// Last whole-millimeter mark crossed
    pub last_integer_mm: i32,
    pub last_integer_change_at: u32,
    /// Speed interlock, per gun
    pub slow_block: [bool; GUN_COUNT],
}

impl Sheet {
    /// An unused slot
    pub const INACTIVE: Sheet = Sheet {
        active: false,
        position_mm: 0.0,
        started_at: 0,
        last_integer_mm: 0,
        last_integer_change_at: 0,
        slow_block: [false; GUN_COUNT],
    };

    fn start(now_ms: u32, photocell_offset_mm: f32) -> Self {
        let position_mm = -photocell_offset_mm;
        Self {
            active: true,
            position_mm,
            started_at: now_ms,
            last_integer_mm: mark(position_mm),
            last_integer_change_at: now_ms,
            slow_block: [false; GUN_COUNT],
        }
    }

    /// Apply one cycle of travel and update the speed interlock
    ///
    /// Crossing a millimeter mark sets or clears each gun's block depending
    /// on how long the crossing took. Without a crossing, the block can only
    /// be set, once the time since the last crossing exceeds the limit.
    fn advance(&mut self, delta_mm: f32, now_ms: u32, max_ms_per_mm: u32) {
        self.position_mm += delta_mm;

        let current = mark(self.position_mm);
        let since_mark = elapsed_ms(now_ms, self.last_integer_change_at);

        if current != self.last_integer_mm {
            let too_slow = since_mark > max_ms_per_mm;
            self.slow_block = [too_slow; GUN_COUNT];
            self.last_integer_mm = current;
            self.last_integer_change_at = now_ms;
        } else if since_mark > max_ms_per_mm {
            self.slow_block = [true; GUN_COUNT];
        }
    }

    fn expired(&self, now_ms: u32, retire_after_mm: f32) -> bool {
        self.position_mm > retire_after_mm
            || elapsed_ms(now_ms, self.started_at) >= SHEET_TIMEOUT_MS
    }
}

fn mark(position_mm: f32) -> i32 {
    floorf(position_mm) as i32
}

/// Fixed pool of sheets in flight
#[derive(Debug, Clone)]
pub struct SheetTracker {
    slots: [Sheet; MAX_SHEETS],
}

impl Default for SheetTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetTracker {
    pub const fn new() -> Self {
        Self {
            slots: [Sheet::INACTIVE; MAX_SHEETS],
        }
    }

    /// Start tracking a new sheet and return its slot
    ///
    /// When every slot is in use the oldest sheet is evicted. Age is
    /// measured as wrapped elapsed time so eviction stays correct across
    /// the timer wrap.
    pub fn spawn(&mut self, now_ms: u32, photocell_offset_mm: f32) -> usize {
        let slot = match self.slots.iter().position(|s| !s.active) {
            Some(free) => free,
            None => {
                let mut oldest = 0;
                let mut oldest_age = 0;
                for (i, sheet) in self.slots.iter().enumerate() {
                    let age = elapsed_ms(now_ms, sheet.started_at);
                    if age > oldest_age {
                        oldest = i;
                        oldest_age = age;
                    }
                }
                oldest
            }
        };

        self.slots[slot] = Sheet::start(now_ms, photocell_offset_mm);
        slot
    }

    /// Move every active sheet by `delta_mm` and retire finished ones
    ///
    /// Runs every cycle, including cycles without travel, so that stalled
    /// sheets trip the speed interlock. Returns the number of sheets retired.
    pub fn advance(
        &mut self,
        delta_mm: f32,
        now_ms: u32,
        max_ms_per_mm: u32,
        retire_after_mm: f32,
    ) -> usize {
        let mut retired = 0;
        for sheet in self.slots.iter_mut().filter(|s| s.active) {
            sheet.advance(delta_mm, now_ms, max_ms_per_mm);
            if sheet.expired(now_ms, retire_after_mm) {
                sheet.active = false;
                retired += 1;
            }
        }
        retired
    }

    /// Drop every sheet
    pub fn clear(&mut self) {
        self.slots = [Sheet::INACTIVE; MAX_SHEETS];
    }

    /// Sheets currently in flight
    pub fn active(&self) -> impl Iterator<Item = &Sheet> {
        self.slots.iter().filter(|s| s.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Raw slot access
    pub fn slot(&self, index: usize) -> Option<&Sheet> {
        self.slots.get(index)
    }
}
