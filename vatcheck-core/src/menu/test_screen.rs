//! IR and NTC acceptance test screens

use super::live::draw_data_age;
use super::rows::{draw_row, draw_title, RowCursor};
use super::{emit, Effect, Effects, ScreenHandler, Transition};
use crate::acceptance::{TestKind, Verdict};
use crate::controller::ControllerState;
use crate::screen::Screen;

const ROW_RUN: usize = 0;
const ROW_BACK: usize = 1;

/// Live reading, last result and a {Run test, Back} menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestScreen {
    kind: TestKind,
    cursor: RowCursor,
}

impl TestScreen {
    pub fn new(kind: TestKind) -> Self {
        Self {
            kind,
            cursor: RowCursor::new(2),
        }
    }

    pub fn kind(&self) -> TestKind {
        self.kind
    }

    fn busy(&self, state: &ControllerState) -> bool {
        state.tests.is_running(self.kind)
    }
}

impl ScreenHandler for TestScreen {
    fn render(&self, state: &ControllerState, now_ms: u32, screen: &mut Screen) {
        let frame = &state.device.frame;
        let result = state.tests.result(self.kind);

        let (title, label, live, sensor_ok) = match self.kind {
            TestKind::Ir => (
                "IR TEMP SENSOR",
                "Resin",
                frame.resin_temp,
                state.device.health.map(|h| h.ir_ok),
            ),
            TestKind::Ntc => (
                "NTC TEMPERATURE",
                "Plate",
                frame.plate_temp,
                state.device.health.map(|h| h.ntc_ok),
            ),
        };
        draw_title(screen, title);
        screen.set_field(1, label, format_args!("{} C", live));
        let sensor = match sensor_ok {
            Some(true) => "OK",
            Some(false) => "FAULT",
            None => "--",
        };
        screen.set_field(2, "Sensor", format_args!("{}", sensor));

        match self.kind {
            TestKind::Ir => {
                screen.set_field(3, "Result", format_args!("{}", result.verdict.label()));
                match result.summary {
                    Some(reading) => screen.set_field(4, "Reading", format_args!("{} C", reading)),
                    None => screen.set_field(4, "Reading", format_args!("--")),
                }
            }
            TestKind::Ntc => {
                screen.set_field(
                    3,
                    "Result",
                    format_args!(
                        "{} {}/{}",
                        result.verdict.label(),
                        result.samples,
                        state.tests.target_samples()
                    ),
                );
                match (result.summary, result.spread()) {
                    (Some(avg), Some(spread)) => {
                        screen.set_field(4, "Avg", format_args!("{} d{}", avg, spread))
                    }
                    (Some(avg), None) => screen.set_field(4, "Avg", format_args!("{}", avg)),
                    _ => screen.set_field(4, "Avg", format_args!("--")),
                }
            }
        }

        if result.verdict == Verdict::Running {
            screen.set_line(5, "  Testing...");
        } else {
            draw_row(screen, 5, &self.cursor, ROW_RUN, "Run test", format_args!(""));
            draw_row(screen, 6, &self.cursor, ROW_BACK, "Back", format_args!(""));
        }
        draw_data_age(screen, state, now_ms);
    }

    fn on_rotate(&mut self, delta: i32, state: &mut ControllerState, _: &mut Effects) -> Transition {
        if !self.busy(state) {
            self.cursor.rotate(delta);
        }
        Transition::Stay
    }

    fn on_click(&mut self, state: &mut ControllerState, effects: &mut Effects) -> Transition {
        if self.busy(state) {
            return Transition::Stay;
        }
        match self.cursor.index() {
            ROW_RUN => {
                emit(effects, Effect::StartTest(self.kind));
                Transition::Stay
            }
            _ => Transition::Root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use vatcheck_protocol::SensorHealth;

    fn state() -> ControllerState {
        ControllerState::new(&ConsoleConfig::default())
    }

    #[test]
    fn test_run_emits_start() {
        let mut state = state();
        let mut effects = Effects::new();
        let mut screen = TestScreen::new(TestKind::Ir);
        assert_eq!(screen.on_click(&mut state, &mut effects), Transition::Stay);
        assert_eq!(&effects[..], &[Effect::StartTest(TestKind::Ir)]);
    }

    #[test]
    fn test_back_returns() {
        let mut state = state();
        let mut effects = Effects::new();
        let mut screen = TestScreen::new(TestKind::Ntc);
        screen.on_rotate(-1, &mut state, &mut effects);
        assert_eq!(screen.on_click(&mut state, &mut effects), Transition::Root);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_input_ignored_while_running() {
        let mut state = state();
        let health = SensorHealth {
            ntc_ok: true,
            ir_ok: true,
        };
        state.tests.start_ntc(Some(health), 0);

        let mut effects = Effects::new();
        let mut screen = TestScreen::new(TestKind::Ntc);
        screen.on_rotate(1, &mut state, &mut effects);
        assert_eq!(screen.on_click(&mut state, &mut effects), Transition::Stay);
        assert!(effects.is_empty());

        let mut out = Screen::new();
        screen.render(&state, 0, &mut out);
        assert!(out.contains("Testing..."));
        assert!(!out.contains("Run test"));
    }
}
