//! GPIO photocell input
//!
//! Most reflective and through-beam sensors pull their output low when the
//! beam is interrupted. Sensors with the opposite sense are configured as
//! inverted.

use glueline_core::traits::SheetSensor;
use glueline_hal::InputPin;

/// Photocell on a digital input
pub struct GpioPhotocell<P> {
    pin: P,
    /// If true, beam clear = pin LOW
    inverted: bool,
}

impl<P: InputPin> GpioPhotocell<P> {
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }
}

impl<P: InputPin> SheetSensor for GpioPhotocell<P> {
    fn beam_clear(&mut self) -> bool {
        self.pin.is_high() != self.inverted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_normal_sense() {
        let mut cell = GpioPhotocell::new(MockPin { high: true }, false);
        assert!(cell.beam_clear());
        cell.pin.high = false;
        assert!(!cell.beam_clear());
    }

    #[test]
    fn test_inverted_sense() {
        let mut cell = GpioPhotocell::new(MockPin { high: true }, true);
        assert!(!cell.beam_clear());
        cell.pin.high = false;
        assert!(cell.beam_clear());
    }
}
