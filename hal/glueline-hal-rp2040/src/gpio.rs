//! GPIO pins as `glueline-hal` pins
//!
//! embassy-rp's `Output` and `Input` implement the `embedded-hal` 1.0
//! digital traits, so they are wrapped in the shared adapters.

use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;

use glueline_hal::{EhInput, EhOutput};

/// Push-pull output usable as a `glueline_hal::OutputPin`
pub type RpOutput<'d> = EhOutput<Output<'d>>;

/// Input usable as a `glueline_hal::InputPin`
pub type RpInput<'d> = EhInput<Input<'d>>;

/// Configure `pin` as an output, initially driven to `high`
pub fn output<'d>(pin: Peri<'d, impl Pin>, high: bool) -> RpOutput<'d> {
    let level = if high { Level::High } else { Level::Low };
    EhOutput::new(Output::new(pin, level), high)
}

/// Configure `pin` as an input
pub fn input<'d>(pin: Peri<'d, impl Pin>, pull: Pull) -> RpInput<'d> {
    EhInput::new(Input::new(pin, pull))
}
