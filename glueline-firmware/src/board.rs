//! Board wiring (Raspberry Pi Pico)
//!
//! | Signal          | GPIO | Notes                               |
//! |-----------------|------|-------------------------------------|
//! | UART0 TX        | 0    | to the configuration application    |
//! | UART0 RX        | 1    |                                     |
//! | Photocell       | 2    | NPN output, pulled up               |
//! | Encoder A       | 3    | PWM slice 1 channel B, pulled up    |
//! | Gun 1 valve     | 14   | MOSFET gate                         |
//! | Gun 2 valve     | 15   | MOSFET gate                         |
//!
//! Peripherals are taken by name in `main`; the polarity and link
//! settings below are the only tunables.

/// Serial link speed
pub const UART_BAUD: u32 = 115_200;

/// True when the gun valves open on a LOW pin
pub const GUN_ACTIVE_LOW: bool = false;

/// True when the photocell reads LOW with the beam clear
pub const PHOTOCELL_INVERTED: bool = false;

/// UART ring buffer sizes
pub const UART_TX_BUF_SIZE: usize = 256;
pub const UART_RX_BUF_SIZE: usize = 256;
