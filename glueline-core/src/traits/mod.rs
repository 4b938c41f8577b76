//! Hardware abstraction traits
//!
//! These traits define the interface between the control engine and the
//! drivers for the glue guns and the photocell.

pub mod gun;
pub mod photocell;

pub use gun::GunOutput;
pub use photocell::SheetSensor;
