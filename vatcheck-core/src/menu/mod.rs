//! Menu state machine
//!
//! A root list of fifteen entries, each opening one detail screen. Detail
//! screens only ever return to the root. Handlers never touch the link: they
//! push [`Effect`]s that the console executes in order.

pub mod actuator;
pub mod live;
pub mod motor;
pub mod rows;
pub mod test_screen;

use heapless::Vec;
use vatcheck_protocol::{Command, MotorAxis};

use crate::acceptance::TestKind;
use crate::controller::ControllerState;
use crate::input::InputEvent;
use crate::scheduler::Pace;
use crate::screen::Screen;

pub use actuator::{BrakeScreen, FanKind, FanScreen, ProjectionScreen, RgbScreen};
pub use live::LiveView;
pub use motor::MotorScreen;
pub use rows::{wrap, RowCursor};
pub use test_screen::TestScreen;

/// Maximum effects one input event can produce
pub const MAX_EFFECTS: usize = 8;

/// Root list entries visible at once
pub const ROOT_VISIBLE: usize = 6;

/// I/O requested by a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Write a command to the board
    Send(Command),
    /// Block for a settle delay (ms)
    Settle(u32),
    /// Query sensor health and run a test
    StartTest(TestKind),
}

/// Ordered effect list
pub type Effects = Vec<Effect, MAX_EFFECTS>;

/// Queue an effect, dropping it if the list is full
pub(crate) fn emit(effects: &mut Effects, effect: Effect) {
    if effects.push(effect).is_err() {
        log_warn!("effect list full, dropping {}", effect);
    }
}

/// Where a handler wants to go next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    Stay,
    Root,
}

/// Behaviour of one detail screen
pub trait ScreenHandler {
    /// Draw the screen
    fn render(&self, state: &ControllerState, now_ms: u32, screen: &mut Screen);

    /// React to encoder rotation
    fn on_rotate(
        &mut self,
        delta: i32,
        state: &mut ControllerState,
        effects: &mut Effects,
    ) -> Transition;

    /// React to a button click
    fn on_click(&mut self, state: &mut ControllerState, effects: &mut Effects) -> Transition;
}

/// Detail screens in root menu order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenId {
    IrTest,
    NtcTest,
    IntakeFan,
    ExhaustFan,
    RgbLed,
    Gesture,
    ZRef,
    YRef,
    Cvr1Ref,
    Cvr2Ref,
    Brake,
    ZMotor,
    YMotor,
    CvrMotor,
    Projection,
}

impl ScreenId {
    /// Root menu order
    pub const ALL: [ScreenId; 15] = [
        ScreenId::IrTest,
        ScreenId::NtcTest,
        ScreenId::IntakeFan,
        ScreenId::ExhaustFan,
        ScreenId::RgbLed,
        ScreenId::Gesture,
        ScreenId::ZRef,
        ScreenId::YRef,
        ScreenId::Cvr1Ref,
        ScreenId::Cvr2Ref,
        ScreenId::Brake,
        ScreenId::ZMotor,
        ScreenId::YMotor,
        ScreenId::CvrMotor,
        ScreenId::Projection,
    ];

    /// Root menu label
    pub fn label(self) -> &'static str {
        match self {
            ScreenId::IrTest => "IR Test",
            ScreenId::NtcTest => "NTC Test",
            ScreenId::IntakeFan => "Intake Fan",
            ScreenId::ExhaustFan => "Exhaust Fan",
            ScreenId::RgbLed => "RGB LED",
            ScreenId::Gesture => "Gesture",
            ScreenId::ZRef => "Z Ref",
            ScreenId::YRef => "Y Ref",
            ScreenId::Cvr1Ref => "CVR1 Ref",
            ScreenId::Cvr2Ref => "CVR2 Ref",
            ScreenId::Brake => "Brake",
            ScreenId::ZMotor => "Z Motor",
            ScreenId::YMotor => "Y Motor",
            ScreenId::CvrMotor => "CVR Motor",
            ScreenId::Projection => "Projection",
        }
    }

    /// Loop pace while this screen is shown
    pub fn pace(self) -> Pace {
        match self {
            ScreenId::Gesture => Pace::Fast,
            _ => Pace::Normal,
        }
    }
}

/// One detail screen and its local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailScreen {
    Live(LiveView),
    Test(TestScreen),
    Fan(FanScreen),
    Rgb(RgbScreen),
    Brake(BrakeScreen),
    Motor(MotorScreen),
    Projection(ProjectionScreen),
}

impl DetailScreen {
    /// Open a screen, resetting the setpoints it controls to defaults
    pub fn enter(id: ScreenId, state: &mut ControllerState) -> Self {
        let setpoints = &mut state.setpoints;
        match id {
            ScreenId::IrTest => DetailScreen::Test(TestScreen::new(TestKind::Ir)),
            ScreenId::NtcTest => DetailScreen::Test(TestScreen::new(TestKind::Ntc)),
            ScreenId::IntakeFan => {
                setpoints.intake = Default::default();
                DetailScreen::Fan(FanScreen::new(FanKind::Intake))
            }
            ScreenId::ExhaustFan => {
                setpoints.exhaust = Default::default();
                DetailScreen::Fan(FanScreen::new(FanKind::Exhaust))
            }
            ScreenId::RgbLed => {
                setpoints.rgb = Default::default();
                DetailScreen::Rgb(RgbScreen::new())
            }
            ScreenId::Gesture
            | ScreenId::ZRef
            | ScreenId::YRef
            | ScreenId::Cvr1Ref
            | ScreenId::Cvr2Ref => DetailScreen::Live(LiveView::new(id)),
            ScreenId::Brake => {
                setpoints.brake = Default::default();
                DetailScreen::Brake(BrakeScreen::new())
            }
            ScreenId::ZMotor => {
                setpoints.reset_motor(MotorAxis::Z);
                DetailScreen::Motor(MotorScreen::axis(MotorAxis::Z))
            }
            ScreenId::YMotor => {
                setpoints.reset_motor(MotorAxis::Y);
                DetailScreen::Motor(MotorScreen::axis(MotorAxis::Y))
            }
            ScreenId::CvrMotor => {
                setpoints.reset_motor(MotorAxis::Cvr1);
                setpoints.reset_motor(MotorAxis::Cvr2);
                DetailScreen::Motor(MotorScreen::cover())
            }
            ScreenId::Projection => {
                setpoints.projection = Default::default();
                DetailScreen::Projection(ProjectionScreen::new())
            }
        }
    }

    /// Which screen this is
    pub fn id(&self) -> ScreenId {
        match self {
            DetailScreen::Live(view) => view.id(),
            DetailScreen::Test(screen) => match screen.kind() {
                TestKind::Ir => ScreenId::IrTest,
                TestKind::Ntc => ScreenId::NtcTest,
            },
            DetailScreen::Fan(screen) => match screen.kind() {
                FanKind::Intake => ScreenId::IntakeFan,
                FanKind::Exhaust => ScreenId::ExhaustFan,
            },
            DetailScreen::Rgb(_) => ScreenId::RgbLed,
            DetailScreen::Brake(_) => ScreenId::Brake,
            DetailScreen::Motor(screen) => screen.id(),
            DetailScreen::Projection(_) => ScreenId::Projection,
        }
    }

    fn handler(&self) -> &dyn ScreenHandler {
        match self {
            DetailScreen::Live(s) => s,
            DetailScreen::Test(s) => s,
            DetailScreen::Fan(s) => s,
            DetailScreen::Rgb(s) => s,
            DetailScreen::Brake(s) => s,
            DetailScreen::Motor(s) => s,
            DetailScreen::Projection(s) => s,
        }
    }

    fn handler_mut(&mut self) -> &mut dyn ScreenHandler {
        match self {
            DetailScreen::Live(s) => s,
            DetailScreen::Test(s) => s,
            DetailScreen::Fan(s) => s,
            DetailScreen::Rgb(s) => s,
            DetailScreen::Brake(s) => s,
            DetailScreen::Motor(s) => s,
            DetailScreen::Projection(s) => s,
        }
    }
}

impl ScreenHandler for DetailScreen {
    fn render(&self, state: &ControllerState, now_ms: u32, screen: &mut Screen) {
        self.handler().render(state, now_ms, screen);
    }

    fn on_rotate(
        &mut self,
        delta: i32,
        state: &mut ControllerState,
        effects: &mut Effects,
    ) -> Transition {
        self.handler_mut().on_rotate(delta, state, effects)
    }

    fn on_click(&mut self, state: &mut ControllerState, effects: &mut Effects) -> Transition {
        self.handler_mut().on_click(state, effects)
    }
}

/// First root entry shown so the cursor stays near the middle
pub fn window_start(cursor: usize, count: usize, visible: usize) -> usize {
    let mut start = 0;
    if cursor >= visible / 2 {
        start = cursor + 1 - visible / 2;
    }
    if start + visible > count {
        start = count.saturating_sub(visible);
    }
    start
}

/// Root list plus the open detail screen
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuController {
    root_cursor: usize,
    active: Option<DetailScreen>,
}

impl MenuController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open detail screen, `None` on the root list
    pub fn current(&self) -> Option<ScreenId> {
        self.active.as_ref().map(DetailScreen::id)
    }

    pub fn root_cursor(&self) -> usize {
        self.root_cursor
    }

    /// Loop pace for the current screen
    pub fn pace(&self) -> Pace {
        self.current().map_or(Pace::Normal, ScreenId::pace)
    }

    /// Apply one input event
    ///
    /// Returns true when the screen needs a redraw.
    pub fn handle(
        &mut self,
        event: InputEvent,
        state: &mut ControllerState,
        effects: &mut Effects,
    ) -> bool {
        let Some(active) = self.active.as_mut() else {
            match event {
                InputEvent::Rotate(delta) => {
                    self.root_cursor = wrap(self.root_cursor, delta, ScreenId::ALL.len());
                }
                InputEvent::Click => {
                    let id = ScreenId::ALL[self.root_cursor];
                    log_debug!("enter {}", id);
                    self.active = Some(DetailScreen::enter(id, state));
                }
            }
            return true;
        };

        let transition = match event {
            InputEvent::Rotate(delta) => active.on_rotate(delta, state, effects),
            InputEvent::Click => active.on_click(state, effects),
        };
        if transition == Transition::Root {
            log_debug!("leave {}", active.id());
            self.active = None;
        }
        true
    }

    /// Draw the current screen
    pub fn render(&self, state: &ControllerState, now_ms: u32, screen: &mut Screen) {
        screen.clear();
        match &self.active {
            Some(active) => active.render(state, now_ms, screen),
            None => self.render_root(screen),
        }
    }

    fn render_root(&self, screen: &mut Screen) {
        let count = ScreenId::ALL.len();
        screen.write_line(
            0,
            format_args!("MENU {:>2}/{}", self.root_cursor + 1, count),
        );

        let start = window_start(self.root_cursor, count, ROOT_VISIBLE);
        for (offset, id) in ScreenId::ALL[start..].iter().take(ROOT_VISIBLE).enumerate() {
            let index = start + offset;
            let row = offset + 1;
            if index == self.root_cursor {
                screen.write_line(row, format_args!("> {}", id.label()));
                screen.highlight_row(row);
            } else {
                screen.write_line(row, format_args!("  {}", id.label()));
            }
        }
    }
}
