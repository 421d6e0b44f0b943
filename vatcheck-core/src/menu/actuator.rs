//! Fan, RGB, brake and projection screens
//!
//! Numeric rows enter edit mode on click; while editing, every rotation
//! re-sends the command, even when the value is already at a bound.

use vatcheck_protocol::{Command, FanChannel};

use super::live::draw_data_age;
use super::rows::{draw_row, draw_title, RowCursor};
use super::{emit, Effect, Effects, ScreenHandler, Transition};
use crate::controller::ControllerState;
use crate::device::setpoints::RgbChannel;
use crate::screen::Screen;

fn sent_marker(sent: bool) -> &'static str {
    if sent {
        "[OK]"
    } else {
        ""
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Which fan a [`FanScreen`] drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FanKind {
    /// Both intake channels, written back to back
    Intake,
    Exhaust,
}

/// Fan speed screen: Speed, Back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FanScreen {
    kind: FanKind,
    cursor: RowCursor,
}

impl FanScreen {
    pub fn new(kind: FanKind) -> Self {
        Self {
            kind,
            cursor: RowCursor::new(2),
        }
    }

    pub fn kind(&self) -> FanKind {
        self.kind
    }

    fn send(&self, state: &ControllerState, effects: &mut Effects) {
        match self.kind {
            FanKind::Intake => {
                let fan = &state.setpoints.intake;
                emit(effects, Effect::Send(fan.command(FanChannel::IntakeA)));
                emit(effects, Effect::Settle(state.timing.fan_channel_gap_ms));
                emit(effects, Effect::Send(fan.command(FanChannel::IntakeB)));
            }
            FanKind::Exhaust => {
                let fan = &state.setpoints.exhaust;
                emit(effects, Effect::Send(fan.command(FanChannel::Exhaust)));
            }
        }
    }
}

impl ScreenHandler for FanScreen {
    fn render(&self, state: &ControllerState, now_ms: u32, screen: &mut Screen) {
        let frame = &state.device.frame;
        let fan = match self.kind {
            FanKind::Intake => &state.setpoints.intake,
            FanKind::Exhaust => &state.setpoints.exhaust,
        };

        match self.kind {
            FanKind::Intake => {
                draw_title(screen, "INTAKE FAN");
                screen.set_field(3, "F1", format_args!("{} RPM", frame.intake_fan_1_rpm));
                screen.set_field(4, "F2", format_args!("{} RPM", frame.intake_fan_2_rpm));
            }
            FanKind::Exhaust => {
                draw_title(screen, "EXHAUST FAN");
                screen.set_field(3, "RPM", format_args!("{}", frame.exhaust_fan_rpm));
            }
        }
        draw_row(screen, 1, &self.cursor, 0, "Speed", format_args!("{}%", fan.percent()));
        screen.set_field(5, "", format_args!("{}", sent_marker(fan.sent())));
        draw_row(screen, 6, &self.cursor, 1, "Back", format_args!(""));
        draw_data_age(screen, state, now_ms);
    }

    fn on_rotate(
        &mut self,
        delta: i32,
        state: &mut ControllerState,
        effects: &mut Effects,
    ) -> Transition {
        if self.cursor.is_editing() {
            match self.kind {
                FanKind::Intake => state.setpoints.intake.adjust(delta),
                FanKind::Exhaust => state.setpoints.exhaust.adjust(delta),
            }
            self.send(state, effects);
        } else {
            self.cursor.rotate(delta);
        }
        Transition::Stay
    }

    fn on_click(&mut self, _: &mut ControllerState, _: &mut Effects) -> Transition {
        match self.cursor.index() {
            0 => {
                self.cursor.toggle_edit();
                Transition::Stay
            }
            _ => Transition::Root,
        }
    }
}

const RGB_ROWS: [RgbChannel; 3] = [RgbChannel::Hue, RgbChannel::Saturation, RgbChannel::Value];

/// RGB indicator screen: Hue, Saturation, Value, Back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RgbScreen {
    cursor: RowCursor,
}

impl Default for RgbScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl RgbScreen {
    pub fn new() -> Self {
        Self {
            cursor: RowCursor::new(RGB_ROWS.len() + 1),
        }
    }
}

impl ScreenHandler for RgbScreen {
    fn render(&self, state: &ControllerState, _now_ms: u32, screen: &mut Screen) {
        let rgb = &state.setpoints.rgb;
        draw_title(screen, "RGB LED");
        draw_row(screen, 1, &self.cursor, 0, "Hue", format_args!("{} deg", rgb.hue()));
        draw_row(screen, 2, &self.cursor, 1, "Saturation", format_args!("{}%", rgb.saturation()));
        draw_row(screen, 3, &self.cursor, 2, "Value", format_args!("{}%", rgb.value()));
        screen.set_field(5, "", format_args!("{}", sent_marker(rgb.sent())));
        draw_row(screen, 6, &self.cursor, 3, "Back", format_args!(""));
    }

    fn on_rotate(
        &mut self,
        delta: i32,
        state: &mut ControllerState,
        effects: &mut Effects,
    ) -> Transition {
        match RGB_ROWS.get(self.cursor.index()) {
            Some(&channel) if self.cursor.is_editing() => {
                state.setpoints.rgb.adjust(channel, delta);
                emit(effects, Effect::Send(state.setpoints.rgb.command()));
            }
            _ => self.cursor.rotate(delta),
        }
        Transition::Stay
    }

    fn on_click(&mut self, _: &mut ControllerState, _: &mut Effects) -> Transition {
        if self.cursor.index() < RGB_ROWS.len() {
            self.cursor.toggle_edit();
            Transition::Stay
        } else {
            Transition::Root
        }
    }
}

/// Brake screen: Brake (toggle), Back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrakeScreen {
    cursor: RowCursor,
}

impl Default for BrakeScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl BrakeScreen {
    pub fn new() -> Self {
        Self {
            cursor: RowCursor::new(2),
        }
    }
}

impl ScreenHandler for BrakeScreen {
    fn render(&self, state: &ControllerState, _now_ms: u32, screen: &mut Screen) {
        let brake = &state.setpoints.brake;
        draw_title(screen, "BRAKE MOTOR");
        draw_row(screen, 1, &self.cursor, 0, "Brake", format_args!("{}", on_off(brake.is_on())));
        screen.set_field(3, "Command", format_args!("$B{}", brake.is_on() as u8));
        screen.set_field(5, "", format_args!("{}", sent_marker(brake.sent())));
        draw_row(screen, 6, &self.cursor, 1, "Back", format_args!(""));
    }

    fn on_rotate(&mut self, delta: i32, _: &mut ControllerState, _: &mut Effects) -> Transition {
        self.cursor.rotate(delta);
        Transition::Stay
    }

    fn on_click(&mut self, state: &mut ControllerState, effects: &mut Effects) -> Transition {
        match self.cursor.index() {
            0 => {
                let on = state.setpoints.brake.toggle();
                emit(effects, Effect::Send(Command::Brake(on)));
                Transition::Stay
            }
            _ => Transition::Root,
        }
    }
}

const PROJECTION_POWER: usize = 0;
const PROJECTION_CURRENT: usize = 1;

/// Projection LED screen: Power (toggle), Current, Back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProjectionScreen {
    cursor: RowCursor,
}

impl Default for ProjectionScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionScreen {
    pub fn new() -> Self {
        Self {
            cursor: RowCursor::new(3),
        }
    }
}

impl ScreenHandler for ProjectionScreen {
    fn render(&self, state: &ControllerState, _now_ms: u32, screen: &mut Screen) {
        let projection = &state.setpoints.projection;
        draw_title(screen, "PROJECTION");
        draw_row(
            screen,
            1,
            &self.cursor,
            PROJECTION_POWER,
            "Power",
            format_args!("{}", on_off(projection.is_on())),
        );
        draw_row(
            screen,
            2,
            &self.cursor,
            PROJECTION_CURRENT,
            "Current",
            format_args!("{}", projection.current()),
        );
        screen.set_field(5, "", format_args!("{}", sent_marker(projection.sent())));
        draw_row(screen, 6, &self.cursor, 2, "Back", format_args!(""));
    }

    fn on_rotate(
        &mut self,
        delta: i32,
        state: &mut ControllerState,
        effects: &mut Effects,
    ) -> Transition {
        if self.cursor.is_editing() && self.cursor.index() == PROJECTION_CURRENT {
            let projection = &mut state.setpoints.projection;
            projection.adjust_current(delta);
            emit(
                effects,
                Effect::Send(Command::ProjectionCurrent(projection.current())),
            );
        } else {
            self.cursor.rotate(delta);
        }
        Transition::Stay
    }

    fn on_click(&mut self, state: &mut ControllerState, effects: &mut Effects) -> Transition {
        match self.cursor.index() {
            PROJECTION_POWER => {
                let on = state.setpoints.projection.toggle();
                emit(effects, Effect::Send(Command::Projection(on)));
                Transition::Stay
            }
            PROJECTION_CURRENT => {
                self.cursor.toggle_edit();
                Transition::Stay
            }
            _ => Transition::Root,
        }
    }
}
