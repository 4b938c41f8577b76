//! Glue gun output trait

/// Trait for a glue gun valve output
///
/// Implementations drive the gun's solenoid through a GPIO or relay.
pub trait GunOutput {
    /// Open or close the gun
    fn set_open(&mut self, open: bool);

    /// Check if the gun is currently open
    fn is_open(&self) -> bool;
}
