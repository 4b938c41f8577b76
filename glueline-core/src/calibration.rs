//! Encoder self-calibration
//!
//! A sheet of known length is passed under the photocell. The pulses
//! counted between its first and second falling edges give the encoder
//! resolution.

/// Shortest reference length accepted
pub const MIN_REFERENCE_LENGTH_MM: f32 = 0.001;

/// Calibration sequencer state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationState {
    Idle,
    /// Armed, waiting for the first falling edge
    AwaitingFirstEdge { reference_length_mm: f32 },
    /// First edge seen, counting pulses until the second
    AwaitingSecondEdge {
        reference_length_mm: f32,
        pulses_at_first_edge: u32,
    },
}

/// Two-edge calibration sequencer
#[derive(Debug, Clone)]
pub struct Calibration {
    state: CalibrationState,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibration {
    pub const fn new() -> Self {
        Self {
            state: CalibrationState::Idle,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// True while falling edges belong to calibration
    pub fn is_armed(&self) -> bool {
        !matches!(self.state, CalibrationState::Idle)
    }

    /// Arm with the length of the reference sheet
    ///
    /// Restarts a pass already in progress. Returns false and leaves the
    /// state alone if the length is not usable.
    pub fn arm(&mut self, reference_length_mm: f32) -> bool {
        if !reference_length_mm.is_finite() || reference_length_mm <= MIN_REFERENCE_LENGTH_MM {
            return false;
        }
        self.state = CalibrationState::AwaitingFirstEdge {
            reference_length_mm,
        };
        true
    }

    pub fn cancel(&mut self) {
        self.state = CalibrationState::Idle;
    }

    /// Feed a falling edge along with the cumulative pulse count
    ///
    /// Returns the measured pulses per millimeter on the second edge, after
    /// which the sequencer is idle again.
    pub fn on_falling_edge(&mut self, total_pulses: u32) -> Option<f32> {
        match self.state {
            CalibrationState::Idle => None,
            CalibrationState::AwaitingFirstEdge {
                reference_length_mm,
            } => {
                self.state = CalibrationState::AwaitingSecondEdge {
                    reference_length_mm,
                    pulses_at_first_edge: total_pulses,
                };
                None
            }
            CalibrationState::AwaitingSecondEdge {
                reference_length_mm,
                pulses_at_first_edge,
            } => {
                self.state = CalibrationState::Idle;
                if reference_length_mm <= MIN_REFERENCE_LENGTH_MM {
                    return None;
                }
                let pulses = total_pulses.wrapping_sub(pulses_at_first_edge);
                Some(pulses as f32 / reference_length_mm)
            }
        }
    }
}
