//! VatCheck - Resin Printer Board Test Console
//!
//! Firmware for an RP2040 handheld that exercises a resin printer main board
//! over its serial diagnostics protocol. A rotary encoder with push button
//! drives a menu on a 128x64 OLED.
//!
//! Wiring:
//! - UART0 TX/RX on GPIO0/GPIO1 to the printer board, 115200 8N1
//! - I2C0 SDA/SCL on GPIO4/GPIO5 to the SSD1306
//! - Encoder CLK/DT on GPIO14/GPIO15, button on GPIO13 (active low)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use vatcheck_core::config::ConsoleConfig;
use vatcheck_core::input::EncoderCounter;
use vatcheck_core::Console;

use crate::clock::SystemClock;
use crate::config::CONSOLE_CONFIG;
use crate::display::{OledRenderer, Ssd1306};
use crate::link::UartLink;

mod clock;
mod config;
mod display;
mod link;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Printer board link speed
const UART_BAUD: u32 = 115_200;

/// OLED bus speed
const I2C_FREQUENCY: u32 = 400_000;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Encoder position, written by the encoder task only
static ENCODER: EncoderCounter = EncoderCounter::new();

/// Executor for the encoder task; preempts the blocking console loop
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("VatCheck console starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // OLED; the console keeps running without one
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = I2C_FREQUENCY;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let mut display = Ssd1306::new(i2c);
    match display.init() {
        Ok(()) => info!("OLED initialized"),
        Err(e) => warn!("OLED init failed: {}", e),
    }
    let renderer = OledRenderer::new(display);

    // Printer board link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = UART_BAUD;

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    info!("UART initialized for printer board link");

    // Operator input
    let clk = Input::new(p.PIN_14, Pull::Up);
    let dt = Input::new(p.PIN_15, Pull::Up);
    let button = Input::new(p.PIN_13, Pull::Up);

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(tasks::encoder_task(clk, dt, &ENCODER).unwrap());

    let mut console = Console::new(
        UartLink::new(uart),
        SystemClock,
        renderer,
        &config,
        ENCODER.position(),
    );
    if let Err(e) = console.boot() {
        warn!("Initial draw failed: {}", e);
    }
    info!("Console running");

    loop {
        let yield_ms = console.step(ENCODER.position(), button.is_low());
        Timer::after_millis(u64::from(yield_ms)).await;
    }
}

/// Compiled configuration, or defaults if it does not validate
fn load_config() -> ConsoleConfig {
    match CONSOLE_CONFIG.validate() {
        Ok(()) => {
            info!("Configuration loaded");
            CONSOLE_CONFIG
        }
        Err(e) => {
            error!("Invalid compiled configuration: {}", e);
            error!("Using default configuration");
            ConsoleConfig::default()
        }
    }
}
