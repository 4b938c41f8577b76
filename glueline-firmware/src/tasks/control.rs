//! Control task
//!
//! Runs the free-running cycle: drain pulses, sample the photocell, update
//! the sheets and write both gun outputs. Commands are applied between
//! cycles so no cycle ever waits on the serial link.

use defmt::*;
use embassy_futures::yield_now;
use embassy_time::Instant;

use glueline_core::photocell::Edge;
use glueline_core::traits::SheetSensor;
use glueline_core::{Controller, CycleReport, GUN_COUNT};
use glueline_drivers::{GpioGun, GpioPhotocell};
use glueline_hal_rp2040::flash::Rp2040RecordStorage;
use glueline_hal_rp2040::gpio::{RpInput, RpOutput};
use glueline_protocol::Event;

use crate::channels::{COMMAND_CHANNEL, EVENT_CHANNEL, PULSES};

pub type Storage = Rp2040RecordStorage<'static>;
pub type Guns = [GpioGun<RpOutput<'static>>; GUN_COUNT];
pub type Photocell = GpioPhotocell<RpInput<'static>>;

#[embassy_executor::task]
pub async fn control_task(
    mut controller: Controller<Storage>,
    mut guns: Guns,
    mut photocell: Photocell,
) {
    info!("Control task started");

    loop {
        let now_ms = Instant::now().as_millis() as u32;

        while let Ok(command) = COMMAND_CHANNEL.try_receive() {
            if let Some(reply) = controller.apply(command, now_ms) {
                publish(reply);
            }
        }

        let report = controller.cycle(now_ms, PULSES.drain(), photocell.beam_clear());
        controller.drive(&mut guns);
        log_report(&report);

        if let Some(event) = report.event {
            publish(event);
        }

        yield_now().await;
    }
}

/// Queue an event for the serial link, dropping it if the link is backed up
fn publish(event: Event) {
    if EVENT_CHANNEL.try_send(event).is_err() {
        warn!("Event channel full, dropping event");
    }
}

fn log_report(report: &CycleReport) {
    match report.edge {
        Some(Edge::Falling) => debug!("Photocell blocked"),
        Some(Edge::Rising) => trace!("Photocell clear"),
        None => {}
    }
    if let Some(slot) = report.spawned {
        debug!("Sheet spawned in slot {}", slot);
    }
    if report.retired > 0 {
        debug!("{} sheet(s) retired", report.retired);
    }
    if let Some(e) = report.persist_error {
        error!("Settings not saved: {:?}", e);
    }
}
