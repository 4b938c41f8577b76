//! GPIO glue gun output
//!
//! Drives a gun's solenoid valve through a GPIO pin (directly or via a
//! MOSFET/SSR).

use glueline_core::traits::GunOutput;
use glueline_hal::OutputPin;

/// GPIO glue gun output
///
/// The pin can be configured as active-high (default) or active-low.
pub struct GpioGun<P> {
    pin: P,
    /// If true, gun open = pin LOW
    inverted: bool,
    /// Current logical state (true = open)
    open: bool,
}

impl<P: OutputPin> GpioGun<P> {
    /// Create a new gun output
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, the gun is open when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut gun = Self {
            pin,
            inverted,
            open: false,
        };
        // Guns start closed
        gun.set_open(false);
        gun
    }

    /// Level currently driven on the pin
    pub fn pin_is_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

impl<P: OutputPin> GunOutput for GpioGun<P> {
    fn set_open(&mut self, open: bool) {
        self.open = open;
        self.pin.set_state(open != self.inverted);
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
