//! Glueline - Glue Gun Controller Firmware
//!
//! Main firmware binary for RP2040-based boards. Follows sheets of paper
//! on a conveyor and opens two glue guns over the programmed lines.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use glueline_core::Controller;
use glueline_drivers::{GpioGun, GpioPhotocell};
use glueline_hal_rp2040::flash::Rp2040RecordStorage;
use glueline_hal_rp2040::gpio;
use glueline_hal_rp2040::pulse::PulseInput;

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; board::UART_TX_BUF_SIZE]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; board::UART_RX_BUF_SIZE]> = StaticCell::new();

/// Executor for the encoder task, preempting the control loop
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Glueline firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Encoder pulses first so no motion is missed during setup
    let encoder = PulseInput::new(p.PWM_SLICE1, p.PIN_3, Pull::Up);
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(tasks::encoder_task(encoder)).unwrap();

    // Guns are forced closed before anything else runs
    let guns = [
        GpioGun::new(gpio::output(p.PIN_14, board::GUN_ACTIVE_LOW), board::GUN_ACTIVE_LOW),
        GpioGun::new(gpio::output(p.PIN_15, board::GUN_ACTIVE_LOW), board::GUN_ACTIVE_LOW),
    ];
    let photocell = GpioPhotocell::new(gpio::input(p.PIN_2, Pull::Up), board::PHOTOCELL_INVERTED);

    let controller = Controller::new(Rp2040RecordStorage::new(p.FLASH, p.DMA_CH0));
    match controller.load_error() {
        None => info!("Settings loaded from flash"),
        Some(e) => warn!("Using default settings: {:?}", e),
    }
    let config = controller.config();
    info!(
        "Config: pulses_per_mm={}, max_ms_per_mm={}, offset={}mm, debounce={}ms",
        config.pulses_per_mm, config.max_ms_per_mm, config.photocell_offset_mm, config.debounce_ms
    );

    // Setup UART for the configuration link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = board::UART_BAUD;

    let tx_buf = TX_BUF.init([0u8; board::UART_TX_BUF_SIZE]);
    let rx_buf = RX_BUF.init([0u8; board::UART_RX_BUF_SIZE]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for configuration link");

    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::control_task(controller, guns, photocell))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
