//! Rotary encoder edge task
//!
//! Runs on the high priority executor so that steps are counted even while
//! the console loop blocks on a reply.

use defmt::*;
use embassy_rp::gpio::Input;

use vatcheck_core::input::{EncoderCounter, QuadratureDecoder};

/// Encoder task - decodes CLK edges into the shared counter
#[embassy_executor::task]
pub async fn encoder_task(
    mut clk: Input<'static>,
    dt: Input<'static>,
    counter: &'static EncoderCounter,
) {
    info!("Encoder task started");

    let mut decoder = QuadratureDecoder::new(clk.is_high());

    loop {
        clk.wait_for_any_edge().await;
        let step = decoder.on_edge(clk.is_high(), dt.is_high());
        if step != 0 {
            trace!("encoder step {}", step);
            counter.record(step);
        }
    }
}
