//! Stepper motor screens
//!
//! Z and Y have a screen each. The cover screen drives CVR1 or CVR2,
//! chosen with its first row. Distance and speed only parameterize the
//! next move; editing them sends nothing.

use vatcheck_protocol::{Direction, MotorAction, MotorAxis};

use super::rows::{draw_row, draw_title, RowCursor};
use super::{emit, Effect, Effects, ScreenHandler, ScreenId, Transition};
use crate::controller::ControllerState;
use crate::screen::Screen;

/// Row on a motor screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorRow {
    Select,
    Enable,
    Direction,
    Distance,
    Speed,
    Move,
    Back,
}

const AXIS_ROWS: [MotorRow; 6] = [
    MotorRow::Enable,
    MotorRow::Direction,
    MotorRow::Distance,
    MotorRow::Speed,
    MotorRow::Move,
    MotorRow::Back,
];

const COVER_ROWS: [MotorRow; 7] = [
    MotorRow::Select,
    MotorRow::Enable,
    MotorRow::Direction,
    MotorRow::Distance,
    MotorRow::Speed,
    MotorRow::Move,
    MotorRow::Back,
];

/// Motor control screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorScreen {
    axis: MotorAxis,
    cover: bool,
    cursor: RowCursor,
}

impl MotorScreen {
    /// Screen for a single axis
    pub fn axis(axis: MotorAxis) -> Self {
        Self {
            axis,
            cover: false,
            cursor: RowCursor::new(AXIS_ROWS.len()),
        }
    }

    /// Cover screen, starting on CVR1
    pub fn cover() -> Self {
        Self {
            axis: MotorAxis::Cvr1,
            cover: true,
            cursor: RowCursor::new(COVER_ROWS.len()),
        }
    }

    pub fn id(&self) -> ScreenId {
        match (self.cover, self.axis) {
            (true, _) => ScreenId::CvrMotor,
            (false, MotorAxis::Y) => ScreenId::YMotor,
            _ => ScreenId::ZMotor,
        }
    }

    /// Axis the rows act on
    pub fn selected_axis(&self) -> MotorAxis {
        self.axis
    }

    fn rows(&self) -> &'static [MotorRow] {
        if self.cover {
            &COVER_ROWS
        } else {
            &AXIS_ROWS
        }
    }

    fn row(&self) -> MotorRow {
        self.rows()
            .get(self.cursor.index())
            .copied()
            .unwrap_or(MotorRow::Back)
    }

    fn toggle_enable(&self, state: &mut ControllerState, effects: &mut Effects) {
        let motor = state.setpoints.motor_mut(self.axis);
        let enabled = !motor.is_enabled();
        motor.set_enabled(enabled);
        if enabled {
            emit(effects, Effect::Send(motor.action(MotorAction::Enable)));
        } else {
            emit(effects, Effect::Send(motor.action(MotorAction::Stop)));
            emit(effects, Effect::Send(motor.action(MotorAction::Disable)));
        }
    }

    fn start_move(&self, state: &mut ControllerState, effects: &mut Effects) {
        let settle_ms = state.timing.motor_enable_settle_ms;
        let motor = state.setpoints.motor_mut(self.axis);
        if !motor.is_enabled() {
            emit(effects, Effect::Send(motor.action(MotorAction::Enable)));
            motor.set_enabled(true);
            emit(effects, Effect::Settle(settle_ms));
        }
        emit(effects, Effect::Send(motor.move_command()));
    }
}

impl ScreenHandler for MotorScreen {
    fn render(&self, state: &ControllerState, _now_ms: u32, screen: &mut Screen) {
        let motor = state.setpoints.motor(self.axis);
        if self.cover {
            draw_title(screen, "CVR MOTOR");
        } else {
            screen.write_line(0, format_args!("== {} MOTOR ==", self.axis.label()));
        }

        for (index, row) in self.rows().iter().enumerate() {
            let line = index + 1;
            let c = &self.cursor;
            match row {
                MotorRow::Select => {
                    draw_row(screen, line, c, index, "Motor", format_args!("{}", self.axis.label()))
                }
                MotorRow::Enable => {
                    let text = if motor.is_enabled() { "ON" } else { "OFF" };
                    draw_row(screen, line, c, index, "Enable", format_args!("{}", text))
                }
                MotorRow::Direction => {
                    let text = match motor.direction() {
                        Direction::Forward => "FWD",
                        Direction::Reverse => "REV",
                    };
                    draw_row(screen, line, c, index, "Direction", format_args!("{}", text))
                }
                MotorRow::Distance => {
                    draw_row(screen, line, c, index, "Distance", format_args!("{}", motor.distance()))
                }
                MotorRow::Speed => {
                    draw_row(screen, line, c, index, "Speed", format_args!("{}", motor.speed()))
                }
                MotorRow::Move => {
                    let text = if motor.sent() { "[OK]" } else { "" };
                    draw_row(screen, line, c, index, "Move", format_args!("{}", text))
                }
                MotorRow::Back => draw_row(screen, line, c, index, "Back", format_args!("")),
            }
        }
    }

    fn on_rotate(
        &mut self,
        delta: i32,
        state: &mut ControllerState,
        _: &mut Effects,
    ) -> Transition {
        if !self.cursor.is_editing() {
            self.cursor.rotate(delta);
            return Transition::Stay;
        }
        let motor = state.setpoints.motor_mut(self.axis);
        match self.row() {
            MotorRow::Distance => motor.adjust_distance(delta),
            MotorRow::Speed => motor.adjust_speed(delta),
            _ => {}
        }
        Transition::Stay
    }

    fn on_click(&mut self, state: &mut ControllerState, effects: &mut Effects) -> Transition {
        match self.row() {
            MotorRow::Select => {
                self.axis = match self.axis {
                    MotorAxis::Cvr1 => MotorAxis::Cvr2,
                    _ => MotorAxis::Cvr1,
                };
            }
            MotorRow::Enable => self.toggle_enable(state, effects),
            MotorRow::Direction => state.setpoints.motor_mut(self.axis).flip_direction(),
            MotorRow::Distance | MotorRow::Speed => self.cursor.toggle_edit(),
            MotorRow::Move => self.start_move(state, effects),
            MotorRow::Back => return Transition::Root,
        }
        Transition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use vatcheck_protocol::Command;

    fn state() -> ControllerState {
        ControllerState::new(&ConsoleConfig::default())
    }

    fn select(screen: &mut MotorScreen, state: &mut ControllerState, row: MotorRow) {
        let target = screen.rows().iter().position(|&r| r == row).unwrap();
        let delta = target as i32 - screen.cursor.index() as i32;
        screen.on_rotate(delta, state, &mut Effects::new());
    }

    #[test]
    fn test_move_enables_first() {
        let mut state = state();
        let mut effects = Effects::new();
        let mut screen = MotorScreen::axis(MotorAxis::Z);

        select(&mut screen, &mut state, MotorRow::Move);
        assert_eq!(screen.on_click(&mut state, &mut effects), Transition::Stay);
        assert_eq!(
            &effects[..],
            &[
                Effect::Send(Command::Motor {
                    axis: MotorAxis::Z,
                    action: MotorAction::Enable
                }),
                Effect::Settle(100),
                Effect::Send(Command::MotorMove {
                    axis: MotorAxis::Z,
                    direction: Direction::Forward,
                    distance: 1000,
                    speed: 1000
                }),
            ]
        );
        assert!(state.setpoints.motor(MotorAxis::Z).is_enabled());

        // Already enabled: move only
        effects.clear();
        screen.on_click(&mut state, &mut effects);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_disable_stops_first() {
        let mut state = state();
        let mut effects = Effects::new();
        let mut screen = MotorScreen::axis(MotorAxis::Y);

        screen.on_click(&mut state, &mut effects);
        screen.on_click(&mut state, &mut effects);
        assert_eq!(
            &effects[..],
            &[
                Effect::Send(Command::Motor {
                    axis: MotorAxis::Y,
                    action: MotorAction::Enable
                }),
                Effect::Send(Command::Motor {
                    axis: MotorAxis::Y,
                    action: MotorAction::Stop
                }),
                Effect::Send(Command::Motor {
                    axis: MotorAxis::Y,
                    action: MotorAction::Disable
                }),
            ]
        );
    }

    #[test]
    fn test_direction_and_distance_send_nothing() {
        let mut state = state();
        let mut effects = Effects::new();
        let mut screen = MotorScreen::axis(MotorAxis::Z);

        select(&mut screen, &mut state, MotorRow::Direction);
        screen.on_click(&mut state, &mut effects);
        select(&mut screen, &mut state, MotorRow::Distance);
        screen.on_click(&mut state, &mut effects);
        screen.on_rotate(-50, &mut state, &mut effects);
        screen.on_click(&mut state, &mut effects);

        assert!(effects.is_empty());
        let motor = state.setpoints.motor(MotorAxis::Z);
        assert_eq!(motor.direction(), Direction::Reverse);
        assert_eq!(motor.distance(), 100);
        assert!(!screen.cursor.is_editing());
    }

    #[test]
    fn test_cover_select_switches_axis() {
        let mut state = state();
        let mut effects = Effects::new();
        let mut screen = MotorScreen::cover();
        assert_eq!(screen.id(), ScreenId::CvrMotor);

        screen.on_click(&mut state, &mut effects);
        assert_eq!(screen.selected_axis(), MotorAxis::Cvr2);

        select(&mut screen, &mut state, MotorRow::Speed);
        screen.on_click(&mut state, &mut effects);
        screen.on_rotate(3, &mut state, &mut effects);
        assert_eq!(state.setpoints.motor(MotorAxis::Cvr2).speed(), 1300);
        assert_eq!(state.setpoints.motor(MotorAxis::Cvr1).speed(), 1000);
    }

    #[test]
    fn test_rows_fit_screen() {
        let state = state();
        let screen = MotorScreen::cover();
        let mut out = Screen::new();
        screen.render(&state, 0, &mut out);
        assert!(out.get_line(1).unwrap().ends_with("CVR1"));
        assert!(out.get_line(7).unwrap().starts_with("  Back"));
    }
}
