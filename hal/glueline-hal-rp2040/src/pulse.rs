//! Encoder pulse counting
//!
//! A PWM slice in rising-edge input mode counts encoder pulses on its B
//! pin in hardware, so no edge depends on software reacting in time. The
//! 16-bit counter wraps; it only has to be sampled before 65536 pulses
//! arrive.

use embassy_rp::gpio::Pull;
use embassy_rp::pwm::{ChannelBPin, Config, InputMode, Pwm, Slice};
use embassy_rp::Peri;

/// Encoder channel counted by a PWM slice
pub struct PulseInput<'d> {
    pwm: Pwm<'d>,
}

impl<'d> PulseInput<'d> {
    pub fn new<T: Slice>(slice: Peri<'d, T>, pin: Peri<'d, impl ChannelBPin<T>>, pull: Pull) -> Self {
        let mut config = Config::default();
        config.top = u16::MAX;
        let pwm = Pwm::new_input(slice, pin, pull, InputMode::RisingEdge, config);
        Self { pwm }
    }

    /// Current counter reading
    pub fn count(&self) -> u16 {
        self.pwm.counter()
    }
}
