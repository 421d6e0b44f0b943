//! Read-only live views: gesture sensor and endstops

use vatcheck_protocol::Endstop;

use super::rows::draw_title;
use super::{Effects, ScreenHandler, ScreenId, Transition};
use crate::controller::ControllerState;
use crate::screen::Screen;

/// Telemetry-only screen; any click returns to the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveView {
    id: ScreenId,
}

impl LiveView {
    pub fn new(id: ScreenId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }
}

fn switch_label(triggered: bool) -> &'static str {
    if triggered {
        "PRESSED"
    } else {
        "OPEN"
    }
}

/// Right/left endstop pair for a reference view
fn endstops(id: ScreenId) -> (&'static str, Option<Endstop>, Option<Endstop>) {
    match id {
        ScreenId::ZRef => ("Z REFERENCE", Some(Endstop::ZRight), None),
        ScreenId::YRef => ("Y REFERENCE", Some(Endstop::YRight), Some(Endstop::YLeft)),
        ScreenId::Cvr1Ref => (
            "CVR1 REFERENCE",
            Some(Endstop::Cvr1Right),
            Some(Endstop::Cvr1Left),
        ),
        ScreenId::Cvr2Ref => (
            "CVR2 REFERENCE",
            Some(Endstop::Cvr2Right),
            Some(Endstop::Cvr2Left),
        ),
        _ => ("", None, None),
    }
}

/// Footer shown on every telemetry screen
pub(crate) fn draw_data_age(screen: &mut Screen, state: &ControllerState, now_ms: u32) {
    if state.device.is_stale(now_ms) {
        screen.set_field(7, "no data", format_args!("--"));
    }
}

impl ScreenHandler for LiveView {
    fn render(&self, state: &ControllerState, now_ms: u32, screen: &mut Screen) {
        let frame = &state.device.frame;

        if self.id == ScreenId::Gesture {
            draw_title(screen, "GESTURE SENSOR");
            screen.set_field(2, "Gesture", format_args!("{}", frame.gesture.label()));
            screen.set_field(3, "Code", format_args!("{}", frame.gesture.code()));
        } else {
            let (title, right, left) = endstops(self.id);
            draw_title(screen, title);
            if let Some(endstop) = right {
                let on = frame.endstops.get(endstop);
                screen.set_field(2, "Right", format_args!("{} ({})", switch_label(on), on as u8));
            }
            if let Some(endstop) = left {
                let on = frame.endstops.get(endstop);
                screen.set_field(3, "Left", format_args!("{} ({})", switch_label(on), on as u8));
            }
        }

        screen.set_line(5, "  Click to return");
        draw_data_age(screen, state, now_ms);
    }

    fn on_rotate(&mut self, _delta: i32, _: &mut ControllerState, _: &mut Effects) -> Transition {
        Transition::Stay
    }

    fn on_click(&mut self, _: &mut ControllerState, _: &mut Effects) -> Transition {
        Transition::Root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;

    #[test]
    fn test_y_reference_view() {
        let mut state = ControllerState::new(&ConsoleConfig::default());
        state
            .device
            .apply_line(b"$1,2,3,4,5,6,7,0,0,1,0", 100)
            .unwrap();

        let view = LiveView::new(ScreenId::YRef);
        let mut screen = Screen::new();
        view.render(&state, 200, &mut screen);

        assert!(screen.get_line(2).unwrap().ends_with("PRESSED (1)"));
        assert!(screen.get_line(3).unwrap().ends_with("OPEN (0)"));
        assert!(!screen.contains("--"));
    }

    #[test]
    fn test_stale_marker() {
        let state = ControllerState::new(&ConsoleConfig::default());
        let view = LiveView::new(ScreenId::Gesture);
        let mut screen = Screen::new();
        view.render(&state, 0, &mut screen);
        assert!(screen.get_line(7).unwrap().ends_with("--"));
        assert!(screen.contains("NONE"));
    }

    #[test]
    fn test_rotation_ignored_click_returns() {
        let mut state = ControllerState::new(&ConsoleConfig::default());
        let mut effects = Effects::new();
        let mut view = LiveView::new(ScreenId::ZRef);
        assert_eq!(view.on_rotate(4, &mut state, &mut effects), Transition::Stay);
        assert_eq!(view.on_click(&mut state, &mut effects), Transition::Root);
        assert!(effects.is_empty());
    }
}
