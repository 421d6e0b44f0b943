//! Cooperative console loop
//!
//! One iteration of [`Console::step`]:
//!
//! 1. sample input and feed events to the menu, executing its effects
//! 2. query telemetry when a poll is due, feeding a running NTC test
//! 3. check the NTC test timeout
//! 4. redraw when something changed or a refresh is due
//! 5. return the yield for the current screen
//!
//! Queries block the loop for at most the reply timeout. Link failures are
//! logged and the cycle is skipped; nothing here is fatal.

use crate::acceptance::TestKind;
use crate::config::ConsoleConfig;
use crate::controller::ControllerState;
use crate::input::InputSource;
use crate::link::{DeviceLink, LinkError};
use crate::menu::{Effect, Effects, MenuController};
use crate::scheduler::Scheduler;
use crate::screen::Screen;
use crate::traits::{Clock, Renderer, SerialLink};

/// Errors surfaced by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// The renderer failed to draw a frame
    Render,
}

/// The console: input, menu, device link and display glued together
pub struct Console<L, C, R> {
    link: DeviceLink<L, C>,
    renderer: R,
    input: InputSource,
    menu: MenuController,
    state: ControllerState,
    scheduler: Scheduler,
    screen: Screen,
    boot_delay_ms: u32,
}

impl<L, C, R> Console<L, C, R>
where
    L: SerialLink,
    C: Clock,
    R: Renderer,
{
    /// Create a console
    ///
    /// `encoder_position` is the counter value at startup.
    pub fn new(
        serial: L,
        clock: C,
        renderer: R,
        config: &ConsoleConfig,
        encoder_position: i32,
    ) -> Self {
        Self {
            link: DeviceLink::new(serial, clock, &config.timing),
            renderer,
            input: InputSource::new(encoder_position, config.timing.button_lockout_ms),
            menu: MenuController::new(),
            state: ControllerState::new(config),
            scheduler: Scheduler::new(config.timing),
            screen: Screen::new(),
            boot_delay_ms: config.timing.boot_delay_ms,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn link(&self) -> &DeviceLink<L, C> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut DeviceLink<L, C> {
        &mut self.link
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn now_ms(&self) -> u32 {
        self.link.clock().now_ms()
    }

    /// Wait for the board to come up, take a first reading and draw the menu
    pub fn boot(&mut self) -> Result<(), ConsoleError> {
        self.link.clock_mut().delay_ms(self.boot_delay_ms);

        let now = self.now_ms();
        self.scheduler.poll_due(now, self.menu.pace());
        self.poll_telemetry();

        let now = self.now_ms();
        self.redraw(now)
    }

    /// Run one loop iteration and return how long to yield (ms)
    pub fn step(&mut self, encoder_position: i32, button_pressed: bool) -> u32 {
        let mut dirty = false;

        let now = self.now_ms();
        for event in self.input.poll(encoder_position, button_pressed, now) {
            let mut effects = Effects::new();
            let before = self.menu.current();
            dirty |= self.menu.handle(event, &mut self.state, &mut effects);
            if self.menu.current() != before {
                log_debug!("screen {} -> {}", before, self.menu.current());
            }
            self.execute(&effects);
        }

        let now = self.now_ms();
        if self.scheduler.poll_due(now, self.menu.pace()) {
            dirty |= self.poll_telemetry();
        }

        let now = self.now_ms();
        dirty |= self.state.tests.check_timeout(now);
        // Set only when the last frame never reached the display
        dirty |= self.screen.is_dirty();

        if dirty || self.scheduler.refresh_due(now, self.menu.pace()) {
            if let Err(e) = self.redraw(now) {
                log_warn!("redraw failed: {}", e);
            }
        }

        self.scheduler.yield_ms(self.menu.pace())
    }

    /// Query telemetry; returns true when the state changed
    fn poll_telemetry(&mut self) -> bool {
        match self.link.query_telemetry(&mut self.state.device) {
            Ok(_) => {
                if self.state.tests.any_running() {
                    self.state.tests.feed_ntc(self.state.device.frame.plate_temp);
                }
                true
            }
            Err(LinkError::Timeout) => {
                log_debug!("telemetry timeout");
                false
            }
            Err(e) => {
                log_warn!("telemetry failed: {}", e);
                false
            }
        }
    }

    /// Execute handler effects in order
    fn execute(&mut self, effects: &Effects) {
        for effect in effects {
            match *effect {
                Effect::Send(command) => match self.link.send(&command) {
                    Ok(()) => self.state.setpoints.mark_sent(&command),
                    Err(e) => log_warn!("send failed: {}", e),
                },
                Effect::Settle(ms) => self.link.clock_mut().delay_ms(ms),
                Effect::StartTest(kind) => self.start_test(kind),
            }
        }
    }

    /// Query sensor health and run a test
    fn start_test(&mut self, kind: TestKind) {
        log_info!("starting {} test", kind);
        let health = match self.link.query_health() {
            Ok(health) => Some(health),
            Err(e) => {
                log_warn!("health query failed: {}", e);
                None
            }
        };
        self.state.device.health = health;

        let now = self.now_ms();
        match kind {
            TestKind::Ir => {
                self.state.tests.run_ir(health, &self.state.device);
            }
            TestKind::Ntc => {
                self.state.tests.start_ntc(health, now);
            }
        }
    }

    fn redraw(&mut self, now_ms: u32) -> Result<(), ConsoleError> {
        self.scheduler.mark_refreshed(now_ms);
        self.menu.render(&self.state, now_ms, &mut self.screen);
        self.renderer
            .render(&self.screen)
            .map_err(|_| ConsoleError::Render)?;
        self.screen.mark_clean();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptance::Verdict;
    use crate::menu::ScreenId;
    use crate::testing::{MockClock, MockLink, MockRenderer};
    use vatcheck_protocol::Deci;

    type TestConsole = Console<MockLink, MockClock, MockRenderer>;

    fn console(serial: MockLink) -> TestConsole {
        let mut console = Console::new(
            serial,
            MockClock::new(0),
            MockRenderer::default(),
            &ConsoleConfig::default(),
            0,
        );
        console.boot().unwrap();
        console
    }

    fn advance(console: &mut TestConsole, ms: u32) {
        console.link_mut().clock_mut().advance(ms);
    }

    fn step(console: &mut TestConsole, position: i32, pressed: bool) {
        let yield_ms = console.step(position, pressed);
        advance(console, yield_ms);
    }

    /// Press and release, after the click lockout
    fn click(console: &mut TestConsole, position: i32) {
        advance(console, 300);
        step(console, position, true);
        step(console, position, false);
    }

    #[test]
    fn test_boot_queries_and_draws() {
        let mut serial = MockLink::new();
        serial.reply_telemetry(b"$123,456,78,901\r\n");
        let console = console(serial);

        assert_eq!(console.link().serial().lines(), ["$A"]);
        assert_eq!(console.state().device.frame.pcb_temp, Deci::from_tenths(456));
        assert_eq!(console.state().device.last_update_ms(), Some(210));
        assert_eq!(console.renderer().frames, 1);
        assert!(console.screen().contains("> IR Test"));
    }

    #[test]
    fn test_rotation_redraws_root() {
        let mut console = console(MockLink::new());
        step(&mut console, 3, false);
        step(&mut console, 2, false);

        assert_eq!(console.menu().root_cursor(), 2);
        let last = console.renderer().last.as_ref().unwrap();
        assert!(last.contains("> Intake Fan"));
    }

    #[test]
    fn test_intake_fan_writes_both_channels() {
        let mut console = console(MockLink::new());
        step(&mut console, 2, false);
        click(&mut console, 2);
        assert_eq!(console.menu().current(), Some(ScreenId::IntakeFan));

        click(&mut console, 2);
        console.link_mut().serial_mut().clear_written();
        let before = console.link().clock().now_ms();
        step(&mut console, 5, false);

        assert_eq!(console.link().serial().commands(), ["$F1599", "$F2599"]);
        assert!(console.state().setpoints.intake.sent());
        assert!(console.link().clock().now_ms() - before >= 25);
    }

    #[test]
    fn test_ntc_stable_run_passes() {
        let mut console = console(MockLink::new());
        step(&mut console, 1, false);
        click(&mut console, 1);
        assert_eq!(console.menu().current(), Some(ScreenId::NtcTest));

        let serial = console.link_mut().serial_mut();
        serial.reply_health(b"$0,0\r\n");
        for _ in 0..25 {
            serial.reply_telemetry(b"$100,300,250,240\r\n");
        }
        click(&mut console, 1);

        for _ in 0..40 {
            if !console.state().tests.any_running() {
                break;
            }
            advance(&mut console, 50);
            step(&mut console, 1, false);
        }

        let result = console.state().tests.result(TestKind::Ntc);
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.samples, 20);
        assert_eq!(result.summary, Some(Deci::from_tenths(250)));
        assert!(console.screen().contains("PASS 20/20"));
    }

    #[test]
    fn test_ntc_timeout_without_telemetry() {
        let mut console = console(MockLink::new());
        step(&mut console, 1, false);
        click(&mut console, 1);
        console.link_mut().serial_mut().reply_health(b"$0,0\r\n");
        click(&mut console, 1);
        assert!(console.state().tests.is_running(TestKind::Ntc));

        for _ in 0..200 {
            if !console.state().tests.any_running() {
                break;
            }
            advance(&mut console, 50);
            step(&mut console, 1, false);
        }

        let result = console.state().tests.result(TestKind::Ntc);
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.summary, Some(Deci::ZERO));
    }

    #[test]
    fn test_ir_fault_has_no_reading() {
        let mut serial = MockLink::new();
        serial.reply_telemetry(b"$1,2,3,245\r\n");
        let mut console = console(serial);

        click(&mut console, 0);
        assert_eq!(console.menu().current(), Some(ScreenId::IrTest));
        console.link_mut().serial_mut().reply_health(b"$0,5\r\n");
        click(&mut console, 0);

        let result = console.state().tests.result(TestKind::Ir);
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.summary, None);
        assert!(console.link().serial().lines().contains(&"$X".into()));
    }

    #[test]
    fn test_ir_without_health_reply_fails() {
        let mut console = console(MockLink::new());
        click(&mut console, 0);
        click(&mut console, 0);
        assert_eq!(
            console.state().tests.result(TestKind::Ir).verdict,
            Verdict::Fail
        );
    }

    #[test]
    fn test_malformed_telemetry_skipped() {
        let mut serial = MockLink::new();
        serial.reply_telemetry(b"$10,20,30,40\r\n");
        let mut console = console(serial);
        let before = console.state().device;

        console.link_mut().serial_mut().reply_telemetry(b"10,20\r\n");
        advance(&mut console, 50);
        step(&mut console, 0, false);
        assert_eq!(console.state().device, before);
    }

    #[test]
    fn test_render_failure_keeps_running() {
        let mut console = console(MockLink::new());
        console.renderer_mut().fail = true;
        step(&mut console, 1, false);
        assert_eq!(console.menu().root_cursor(), 1);
        assert!(console.screen().is_dirty());

        // Retried on the very next iteration, not at the next refresh
        console.renderer_mut().fail = false;
        let frames = console.renderer().frames;
        step(&mut console, 1, false);
        assert_eq!(console.renderer().frames, frames + 1);
        assert!(!console.screen().is_dirty());
    }

    #[test]
    fn test_gesture_screen_yields_less() {
        let mut console = console(MockLink::new());
        assert_eq!(console.step(0, false), 5);
        step(&mut console, 5, false);
        click(&mut console, 5);
        assert_eq!(console.menu().current(), Some(ScreenId::Gesture));
        assert_eq!(console.step(5, false), 2);
    }
}
