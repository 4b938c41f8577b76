//! End-to-end runs of the controller against RAM storage

use glueline_core::encoder::PulseCounter;
use glueline_core::sheet::SHEET_TIMEOUT_MS;
use glueline_core::{Controller, Gun};
use glueline_hal::RamStorage;
use glueline_protocol::{Command, Event, LineAssembler};

type Region = RamStorage<1024>;

/// Feed newline-delimited records through the line assembler and apply them
fn send(controller: &mut Controller<Region>, now: u32, input: &str) -> Vec<Event> {
    let mut assembler = LineAssembler::new();
    let mut replies = Vec::new();
    for &byte in input.as_bytes() {
        if let Ok(Some(record)) = assembler.feed(byte) {
            if let Ok(command) = Command::parse(record) {
                replies.extend(controller.apply(command, now));
            }
        }
    }
    replies
}

/// Hold the photocell low past the debounce time, then release it
fn pass_edge(controller: &mut Controller<Region>, now: u32) -> u32 {
    let debounce = controller.config().debounce_ms;
    controller.cycle(now, 0, false);
    controller.cycle(now + debounce, 0, false);
    controller.cycle(now + debounce + 1, 0, true);
    controller.cycle(now + 2 * debounce + 1, 0, true);
    now + 2 * debounce + 1
}

#[test]
fn test_gun_follows_pattern() {
    let mut controller = Controller::new(Region::new());
    let replies = send(
        &mut controller,
        0,
        "{\"cmd\":\"set_pattern\",\"gun\":1,\"lines\":[{\"start\":10,\"end\":40}]}\n\
         {\"cmd\":\"set_config\",\"photocell_offset_mm\":5}\n\
         {\"cmd\":\"set_active\",\"active\":true}\n",
    );
    assert_eq!(replies.len(), 3);

    let counter = PulseCounter::new();
    let mut now = pass_edge(&mut controller, 100);
    assert_eq!(controller.sheets().active_count(), 1);

    // Offset 5 mm: the sheet reaches the nozzles after 5 mm of travel,
    // so 25 mm into the sheet means 30 mm of travel at 10 pulses/mm
    let mut travel = |controller: &mut Controller<Region>, mm: u32| {
        for _ in 0..mm {
            counter.add(10);
            now += 5;
            controller.cycle(now, counter.drain(), true);
        }
    };

    travel(&mut controller, 30);
    assert_eq!(controller.outputs(), [true, false]);

    travel(&mut controller, 20);
    assert_eq!(controller.outputs(), [false, false]);

    // Retired once 30 mm past the end of the last line
    travel(&mut controller, 25);
    assert_eq!(controller.sheets().active_count(), 1);
    travel(&mut controller, 1);
    assert_eq!(controller.sheets().active_count(), 0);
}

#[test]
fn test_stalled_sheet_times_out() {
    let mut controller = Controller::new(Region::new());
    controller.set_active(true);

    pass_edge(&mut controller, 1_000);
    let spawned_at = 1_000 + controller.config().debounce_ms;

    controller.cycle(spawned_at + SHEET_TIMEOUT_MS - 1, 0, true);
    assert_eq!(controller.sheets().active_count(), 1);
    controller.cycle(spawned_at + SHEET_TIMEOUT_MS, 0, true);
    assert_eq!(controller.sheets().active_count(), 0);
}

#[test]
fn test_settings_survive_restart() {
    let mut controller = Controller::new(Region::new());
    send(
        &mut controller,
        0,
        "{\"cmd\":\"set_config\",\"pulses_per_mm\":42.5,\"max_ms_per_mm\":300}\n\
         {\"cmd\":\"set_pattern\",\"gun\":2,\"lines\":[{\"start\":100,\"end\":50}]}\n",
    );

    let storage = controller.store().storage().clone();
    let restarted = Controller::new(storage);
    assert_eq!(restarted.load_error(), None);
    assert_eq!(restarted.config().pulses_per_mm, 42.5);
    assert_eq!(restarted.config().max_ms_per_mm, 300);
    assert_eq!(restarted.settings().pattern(Gun::Gun2).furthest_end(), Some(100.0));
    assert!(!restarted.is_active());
}

#[test]
fn test_calibration_over_the_wire() {
    let mut controller = Controller::new(Region::new());
    send(&mut controller, 0, "{\"cmd\":\"calib_arm\",\"paper_length_mm\":297}\n");

    let now = pass_edge(&mut controller, 10);
    controller.cycle(now + 1, 2_970, true);

    let debounce = controller.config().debounce_ms;
    controller.cycle(now + 2, 0, false);
    let report = controller.cycle(now + 2 + debounce, 0, false);
    assert_eq!(report.event, Some(Event::CalibResult { pulses_per_mm: 10.0 }));

    let mut line = [0u8; 64];
    let n = report.event.unwrap().encode_line(&mut line).unwrap();
    assert!(line[..n].starts_with(b"{\"evt\":\"calib_result\""));
    assert_eq!(line[n - 1], b'\n');
}

#[test]
fn test_malformed_records_are_ignored() {
    let mut controller = Controller::new(Region::new());
    let replies = send(
        &mut controller,
        0,
        "not json\n{\"cmd\":\"launch\"}\n{\"cmd\":\"set_active\"}\n{\"cmd\":\"get_status\"}\n",
    );
    assert_eq!(replies.len(), 1);
    assert!(matches!(replies[0], Event::Status(_)));
    assert!(!controller.is_active());
}

#[test]
fn test_test_overrides_over_the_wire() {
    let mut controller = Controller::new(Region::new());
    let replies = send(
        &mut controller,
        1_000,
        "{\"cmd\":\"test_open\",\"gun\":\"both\",\"timeout_ms\":5000}\n",
    );
    assert_eq!(replies.len(), 1);

    // Overrides open the guns even with production stopped
    controller.cycle(1_001, 0, true);
    assert_eq!(controller.outputs(), [true, true]);

    send(&mut controller, 1_002, "{\"cmd\":\"test_close\",\"gun\":1}\n");
    controller.cycle(1_003, 0, true);
    assert_eq!(controller.outputs(), [false, true]);

    // Gun 2 closes on its own once the timeout has passed
    controller.cycle(6_000, 0, true);
    assert_eq!(controller.outputs(), [false, true]);
    controller.cycle(6_001, 0, true);
    assert_eq!(controller.outputs(), [false, false]);
}
