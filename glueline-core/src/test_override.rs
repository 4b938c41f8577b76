//! Manual test overrides
//!
//! An override forces a gun open for a bounded time regardless of sheets,
//! patterns, the speed interlock or the active flag.

use glueline_protocol::GunSelector;

use crate::config::GUN_COUNT;
use crate::time::{deadline_after, has_passed};

/// Timeout used when `test_open` carries none
pub const DEFAULT_TIMEOUT_MS: u32 = 1_000;

/// Longest override
pub const MAX_TIMEOUT_MS: u32 = 600_000;

/// Override state for one gun
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestOverride {
    pub active: bool,
    pub until: u32,
}

/// Overrides for both guns
#[derive(Debug, Clone, Default)]
pub struct TestOverrides {
    guns: [TestOverride; GUN_COUNT],
}

/// Clamp a requested timeout to `1..=MAX_TIMEOUT_MS`
pub fn clamp_timeout(timeout_ms: Option<i64>) -> u32 {
    match timeout_ms {
        Some(ms) => ms.clamp(1, MAX_TIMEOUT_MS as i64) as u32,
        None => DEFAULT_TIMEOUT_MS,
    }
}

impl TestOverrides {
    pub const fn new() -> Self {
        Self {
            guns: [TestOverride {
                active: false,
                until: 0,
            }; GUN_COUNT],
        }
    }

    /// Force the selected guns open until `now + timeout`
    pub fn open(&mut self, selector: GunSelector, timeout_ms: Option<i64>, now_ms: u32) {
        let until = deadline_after(now_ms, clamp_timeout(timeout_ms));
        for (index, gun) in self.guns.iter_mut().enumerate() {
            if selector.includes(index) {
                *gun = TestOverride {
                    active: true,
                    until,
                };
            }
        }
    }

    /// Release the selected guns now
    pub fn close(&mut self, selector: GunSelector) {
        for (index, gun) in self.guns.iter_mut().enumerate() {
            if selector.includes(index) {
                gun.active = false;
            }
        }
    }

    /// Clear overrides whose deadline has passed
    pub fn expire(&mut self, now_ms: u32) {
        for gun in self.guns.iter_mut() {
            if gun.active && has_passed(now_ms, gun.until) {
                gun.active = false;
            }
        }
    }

    pub fn clear(&mut self) {
        for gun in self.guns.iter_mut() {
            gun.active = false;
        }
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.guns.get(index).is_some_and(|g| g.active)
    }

    pub fn any_active(&self) -> bool {
        self.guns.iter().any(|g| g.active)
    }

    pub fn get(&self, index: usize) -> Option<&TestOverride> {
        self.guns.get(index)
    }
}
