//! Encoder pulse hand-off and position integration
//!
//! Pulses are counted in hardware. The sampling context reads the free
//! running counter through a [`CounterSampler`] and adds the difference to
//! [`PulseCounter`]. The control loop drains it once per cycle and feeds
//! the delta to [`PositionIntegrator`], which turns it into millimeters.

use portable_atomic::{AtomicU32, Ordering};

use crate::config::MIN_PULSES_PER_MM;

/// Pulse counter shared between the pulse interrupt and the control loop
///
/// Place in a `static`. [`add`](Self::add) is the only operation allowed
/// from interrupt context.
#[derive(Debug)]
pub struct PulseCounter {
    pending: AtomicU32,
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Count `pulses` encoder pulses (interrupt context)
    #[inline]
    pub fn add(&self, pulses: u32) {
        if pulses > 0 {
            self.pending.fetch_add(pulses, Ordering::Relaxed);
        }
    }

    /// Take every pulse recorded since the last drain
    ///
    /// The read and reset happen inside one critical section so no pulse
    /// recorded in between is lost.
    pub fn drain(&self) -> u32 {
        critical_section::with(|_| {
            let pulses = self.pending.load(Ordering::Relaxed);
            self.pending.store(0, Ordering::Relaxed);
            pulses
        })
    }

    /// Pulses waiting to be drained
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Relaxed)
    }
}

/// Turns readings of a wrapping 16-bit hardware counter into deltas
///
/// Exact as long as fewer than 65536 pulses arrive between two samples.
#[derive(Debug, Clone, Default)]
pub struct CounterSampler {
    last: u16,
}

impl CounterSampler {
    /// Start from the counter's current reading
    pub const fn new(raw: u16) -> Self {
        Self { last: raw }
    }

    /// Pulses counted since the previous sample
    pub fn sample(&mut self, raw: u16) -> u32 {
        let delta = raw.wrapping_sub(self.last);
        self.last = raw;
        u32::from(delta)
    }
}

/// Converts drained pulse deltas into travel
#[derive(Debug, Clone, Default)]
pub struct PositionIntegrator {
    /// Cumulative pulses since boot (wrapping)
    total_pulses: u32,
}

impl PositionIntegrator {
    pub const fn new() -> Self {
        Self { total_pulses: 0 }
    }

    /// Accumulate `pulses` and return the travel they represent in mm
    pub fn integrate(&mut self, pulses: u32, pulses_per_mm: f32) -> f32 {
        self.total_pulses = self.total_pulses.wrapping_add(pulses);
        pulses_to_mm(pulses, pulses_per_mm)
    }

    /// Cumulative pulse count, used by calibration
    pub fn total_pulses(&self) -> u32 {
        self.total_pulses
    }
}

/// `pulses / pulses_per_mm`, with the resolution floored at [`MIN_PULSES_PER_MM`]
pub fn pulses_to_mm(pulses: u32, pulses_per_mm: f32) -> f32 {
    pulses as f32 / pulses_per_mm.max(MIN_PULSES_PER_MM)
}
