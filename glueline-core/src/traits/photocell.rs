//! Sheet edge sensor trait

/// Trait for the photocell that detects sheet edges
pub trait SheetSensor {
    /// Raw beam level: `true` with no paper in the beam
    ///
    /// Takes `&mut self` because some inputs need mutable access to sample.
    fn beam_clear(&mut self) -> bool;
}
