//! The control engine
//!
//! [`Controller`] owns every piece of control state. The firmware's control
//! loop is its only user: it applies received commands (see
//! [`crate::command`]) and then runs one [`Controller::cycle`] per
//! iteration with the pulses drained from the
//! [`PulseCounter`](crate::encoder::PulseCounter) and the raw photocell
//! level. Nothing in here blocks.

use glueline_hal::RecordStorage;
use glueline_protocol::{ConfigReport, Event, StatusReport};

use crate::calibration::Calibration;
use crate::config::{Config, Settings, GUN_COUNT};
use crate::encoder::PositionIntegrator;
use crate::pattern::gun_requests;
use crate::photocell::{Debouncer, Edge};
use crate::sheet::{SheetTracker, RETIRE_MARGIN_MM};
use crate::storage::{CodecError, SettingsStore};
use crate::test_override::TestOverrides;
use crate::traits::GunOutput;

/// What happened during one control cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Gun outputs to drive
    pub outputs: [bool; GUN_COUNT],
    /// Accepted photocell transition
    pub edge: Option<Edge>,
    /// Slot of a sheet spawned this cycle
    pub spawned: Option<usize>,
    /// Sheets retired this cycle
    pub retired: usize,
    /// Event to send to the host
    pub event: Option<Event>,
    /// Failed save of settings changed this cycle
    pub persist_error: Option<CodecError>,
}

/// Glue gun control engine
pub struct Controller<S> {
    pub(crate) settings: Settings,
    store: SettingsStore<S>,
    load_error: Option<CodecError>,
    pub(crate) active: bool,
    integrator: PositionIntegrator,
    photocell: Debouncer,
    pub(crate) sheets: SheetTracker,
    pub(crate) calibration: Calibration,
    pub(crate) overrides: TestOverrides,
    outputs: [bool; GUN_COUNT],
    persist_errors: u32,
}

impl<S: RecordStorage> Controller<S> {
    /// Create a controller from stored settings
    ///
    /// Unreadable or corrupt settings are replaced by defaults; the reason
    /// is kept in [`load_error`](Self::load_error). Production starts
    /// inactive with both guns closed.
    pub fn new(storage: S) -> Self {
        let mut store = SettingsStore::new(storage);
        let (settings, load_error) = store.load_or_default();

        Self {
            settings,
            store,
            load_error,
            active: false,
            integrator: PositionIntegrator::new(),
            photocell: Debouncer::new(),
            sheets: SheetTracker::new(),
            calibration: Calibration::new(),
            overrides: TestOverrides::new(),
            outputs: [false; GUN_COUNT],
            persist_errors: 0,
        }
    }

    /// Run one control cycle
    ///
    /// `pulses` is the encoder delta since the previous cycle and
    /// `beam_clear` the raw photocell level.
    pub fn cycle(&mut self, now_ms: u32, pulses: u32, beam_clear: bool) -> CycleReport {
        let config = self.settings.config;
        let mut report = CycleReport {
            outputs: [false; GUN_COUNT],
            edge: None,
            spawned: None,
            retired: 0,
            event: None,
            persist_error: None,
        };

        let delta_mm = self.integrator.integrate(pulses, config.pulses_per_mm);
        let retire_after_mm = self.settings.furthest_pattern_end() + RETIRE_MARGIN_MM;
        report.retired = self
            .sheets
            .advance(delta_mm, now_ms, config.max_ms_per_mm, retire_after_mm);

        report.edge = self.photocell.update(beam_clear, now_ms, config.debounce_ms);
        if report.edge == Some(Edge::Falling) {
            if self.calibration.is_armed() {
                let total = self.integrator.total_pulses();
                if let Some(pulses_per_mm) = self.calibration.on_falling_edge(total) {
                    if Config::pulses_per_mm_valid(pulses_per_mm) {
                        self.settings.config.pulses_per_mm = pulses_per_mm;
                        report.persist_error = self.persist().err();
                        report.event = Some(Event::CalibResult { pulses_per_mm });
                    }
                }
            } else if self.active {
                report.spawned = Some(self.sheets.spawn(now_ms, config.photocell_offset_mm));
            }
        }

        self.overrides.expire(now_ms);
        self.outputs = self.evaluate_outputs();
        report.outputs = self.outputs;
        report
    }

    /// Overrides force their gun open; otherwise the sheets decide, and
    /// only while production is active.
    fn evaluate_outputs(&self) -> [bool; GUN_COUNT] {
        let requested = if self.active {
            gun_requests(self.sheets.active(), &self.settings.patterns)
        } else {
            [false; GUN_COUNT]
        };

        let mut outputs = [false; GUN_COUNT];
        for (gun, output) in outputs.iter_mut().enumerate() {
            *output = self.overrides.is_active(gun) || requested[gun];
        }
        outputs
    }

    /// Push the current outputs to the guns
    pub fn drive<G: GunOutput>(&self, guns: &mut [G; GUN_COUNT]) {
        for (gun, &open) in guns.iter_mut().zip(self.outputs.iter()) {
            gun.set_open(open);
        }
    }

    /// Start or stop production
    ///
    /// Stopping drops every sheet in flight and every test override and
    /// closes both guns.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.sheets.clear();
            self.overrides.clear();
            self.outputs = [false; GUN_COUNT];
        }
    }

    /// Save the settings, counting failures
    pub(crate) fn persist(&mut self) -> Result<(), CodecError> {
        let result = self.store.save(&self.settings);
        if result.is_err() {
            self.persist_errors = self.persist_errors.saturating_add(1);
        }
        result
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &Config {
        &self.settings.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Outputs computed by the last cycle
    pub fn outputs(&self) -> [bool; GUN_COUNT] {
        self.outputs
    }

    pub fn sheets(&self) -> &SheetTracker {
        &self.sheets
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn overrides(&self) -> &TestOverrides {
        &self.overrides
    }

    /// Why the stored settings were not used at startup
    pub fn load_error(&self) -> Option<CodecError> {
        self.load_error
    }

    pub fn persist_errors(&self) -> u32 {
        self.persist_errors
    }

    pub fn store(&self) -> &SettingsStore<S> {
        &self.store
    }

    pub fn config_report(&self) -> ConfigReport {
        let config = &self.settings.config;
        ConfigReport {
            pulses_per_mm: config.pulses_per_mm,
            max_ms_per_mm: config.max_ms_per_mm,
            photocell_offset_mm: config.photocell_offset_mm,
            debounce_ms: config.debounce_ms,
        }
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            active: self.active,
            sheets: self.sheets.active_count() as u8,
            gun1: self.outputs[0],
            gun2: self.outputs[1],
            calibrating: self.calibration.is_armed(),
            persist_errors: self.persist_errors,
        }
    }
}
