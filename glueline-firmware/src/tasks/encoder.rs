//! Encoder sampling task
//!
//! Pulses are counted by the PWM slice; this task moves the count into
//! `PULSES` every millisecond. It runs on the interrupt-priority executor
//! so a busy control loop never delays the sampling.

use defmt::*;
use embassy_time::{Duration, Ticker};

use glueline_core::CounterSampler;
use glueline_hal_rp2040::pulse::PulseInput;

use crate::channels::PULSES;

/// Sampling interval, well inside one counter wrap at full speed
const SAMPLE_INTERVAL_MS: u64 = 1;

#[embassy_executor::task]
pub async fn encoder_task(input: PulseInput<'static>) {
    info!("Encoder task started");

    let mut sampler = CounterSampler::new(input.count());
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        ticker.next().await;
        PULSES.add(sampler.sample(input.count()));
    }
}
