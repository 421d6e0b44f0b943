//! Telemetry reply decoding
//!
//! Reply layout (strictly positional, tail optional):
//!
//! | Tokens | Fields                                              |
//! |--------|-----------------------------------------------------|
//! | 1-4    | MCU load, PCB temp, plate temp, resin temp (×10)    |
//! | 5-7    | intake fan 1, intake fan 2, exhaust fan RPM (×10)   |
//! | 8      | gesture code                                        |
//! | 9-15   | endstops Z-R, Y-R, Y-L, CVR1-R, CVR1-L, CVR2-R, CVR2-L |
//!
//! Fewer than four tokens means the reply is unusable. Otherwise every field
//! covered by the token count is replaced and the rest keep their previous
//! value, so older board firmware that sends a short line still works.

use crate::fixed::Deci;
use crate::reply::{tokenize, ReplyError};

/// Tokens needed before a telemetry reply is usable
pub const MIN_TELEMETRY_TOKENS: usize = 4;

/// Tokens needed for the fan channels
pub const FAN_TOKENS: usize = 7;

/// Tokens needed for the gesture code
pub const GESTURE_TOKENS: usize = 8;

/// Number of endstop flags in a full reply
pub const ENDSTOP_COUNT: usize = 7;

/// Gesture reported by the board's gesture sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Gesture {
    /// Decode a gesture code; unknown codes map to `None`
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Gesture::Up,
            2 => Gesture::Down,
            3 => Gesture::Left,
            4 => Gesture::Right,
            _ => Gesture::None,
        }
    }

    /// Wire code
    pub fn code(self) -> u8 {
        match self {
            Gesture::None => 0,
            Gesture::Up => 1,
            Gesture::Down => 2,
            Gesture::Left => 3,
            Gesture::Right => 4,
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Gesture::None => "NONE",
            Gesture::Up => "UP",
            Gesture::Down => "DOWN",
            Gesture::Left => "LEFT",
            Gesture::Right => "RIGHT",
        }
    }
}

/// Endstop (reference switch) reported by the board, in reply order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endstop {
    ZRight,
    YRight,
    YLeft,
    Cvr1Right,
    Cvr1Left,
    Cvr2Right,
    Cvr2Left,
}

impl Endstop {
    /// All endstops in reply order
    pub const ALL: [Endstop; ENDSTOP_COUNT] = [
        Endstop::ZRight,
        Endstop::YRight,
        Endstop::YLeft,
        Endstop::Cvr1Right,
        Endstop::Cvr1Left,
        Endstop::Cvr2Right,
        Endstop::Cvr2Left,
    ];

    /// Position within the endstop block
    pub fn index(self) -> usize {
        self as usize
    }

    /// Token count a reply needs to report this endstop
    pub fn tokens_needed(self) -> usize {
        GESTURE_TOKENS + 1 + self.index()
    }
}

/// The seven endstop flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Endstops {
    flags: [bool; ENDSTOP_COUNT],
}

impl Endstops {
    /// Whether an endstop is triggered
    pub fn get(&self, endstop: Endstop) -> bool {
        self.flags[endstop.index()]
    }

    /// Set a single flag
    pub fn set(&mut self, endstop: Endstop, triggered: bool) {
        self.flags[endstop.index()] = triggered;
    }
}

/// How much of a telemetry frame a reply covered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coverage {
    tokens: u8,
}

impl Coverage {
    /// Number of tokens that were applied
    pub fn tokens(&self) -> usize {
        self.tokens as usize
    }

    /// Fan channels were updated
    pub fn has_fans(&self) -> bool {
        self.tokens() >= FAN_TOKENS
    }

    /// Gesture was updated
    pub fn has_gesture(&self) -> bool {
        self.tokens() >= GESTURE_TOKENS
    }

    /// Whether a given endstop was updated
    pub fn has_endstop(&self, endstop: Endstop) -> bool {
        self.tokens() >= endstop.tokens_needed()
    }
}

/// Snapshot of everything the board reports in a telemetry reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryFrame {
    /// MCU load (percent)
    pub mcu_load: Deci,
    /// PCB temperature (°C)
    pub pcb_temp: Deci,
    /// Build plate NTC temperature (°C)
    pub plate_temp: Deci,
    /// Resin IR temperature (°C)
    pub resin_temp: Deci,
    /// First intake fan speed (RPM)
    pub intake_fan_1_rpm: Deci,
    /// Second intake fan speed (RPM)
    pub intake_fan_2_rpm: Deci,
    /// Exhaust fan speed (RPM)
    pub exhaust_fan_rpm: Deci,
    /// Last gesture
    pub gesture: Gesture,
    /// Endstop flags
    pub endstops: Endstops,
}

impl TelemetryFrame {
    /// Apply decoded tokens to this frame
    ///
    /// Fields beyond the token count are left untouched. Returns
    /// `ReplyError::Truncated` (frame unchanged) below four tokens.
    pub fn apply(&mut self, tokens: &[u32]) -> Result<Coverage, ReplyError> {
        if tokens.len() < MIN_TELEMETRY_TOKENS {
            return Err(ReplyError::Truncated);
        }

        self.mcu_load = Deci::from_raw(tokens[0]);
        self.pcb_temp = Deci::from_raw(tokens[1]);
        self.plate_temp = Deci::from_raw(tokens[2]);
        self.resin_temp = Deci::from_raw(tokens[3]);

        if tokens.len() >= FAN_TOKENS {
            self.intake_fan_1_rpm = Deci::from_raw(tokens[4]);
            self.intake_fan_2_rpm = Deci::from_raw(tokens[5]);
            self.exhaust_fan_rpm = Deci::from_raw(tokens[6]);
        }

        if tokens.len() >= GESTURE_TOKENS {
            self.gesture = Gesture::from_code(tokens[7]);
        }

        for endstop in Endstop::ALL {
            if let Some(&raw) = tokens.get(endstop.tokens_needed() - 1) {
                self.endstops.set(endstop, raw == 1);
            }
        }

        let tokens = tokens.len().min(GESTURE_TOKENS + ENDSTOP_COUNT) as u8;
        Ok(Coverage { tokens })
    }

    /// Tokenize a reply line and apply it to this frame
    pub fn decode_line(&mut self, line: &[u8]) -> Result<Coverage, ReplyError> {
        let tokens = tokenize(line)?;
        self.apply(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded() -> TelemetryFrame {
        let mut frame = TelemetryFrame {
            mcu_load: Deci::from_tenths(999),
            pcb_temp: Deci::from_tenths(999),
            plate_temp: Deci::from_tenths(999),
            resin_temp: Deci::from_tenths(999),
            intake_fan_1_rpm: Deci::from_tenths(999),
            intake_fan_2_rpm: Deci::from_tenths(999),
            exhaust_fan_rpm: Deci::from_tenths(999),
            gesture: Gesture::Right,
            endstops: Endstops::default(),
        };
        for endstop in Endstop::ALL {
            frame.endstops.set(endstop, true);
        }
        frame
    }

    #[test]
    fn test_four_token_reply() {
        let mut frame = seeded();
        let coverage = frame.decode_line(b"$123,456,78,901").unwrap();

        assert_eq!(coverage.tokens(), 4);
        assert_eq!(frame.mcu_load, Deci::from_tenths(123));
        assert_eq!(frame.pcb_temp, Deci::from_tenths(456));
        assert_eq!(frame.plate_temp, Deci::from_tenths(78));
        assert_eq!(frame.resin_temp, Deci::from_tenths(901));

        // Everything else untouched
        assert_eq!(frame.intake_fan_1_rpm, Deci::from_tenths(999));
        assert_eq!(frame.gesture, Gesture::Right);
        assert!(frame.endstops.get(Endstop::ZRight));
    }

    #[test]
    fn test_nine_token_reply() {
        let mut frame = seeded();
        for endstop in Endstop::ALL {
            frame.endstops.set(endstop, false);
        }
        let coverage = frame.decode_line(b"$10,20,30,40,50,60,70,1,1").unwrap();

        assert!(coverage.has_fans());
        assert!(coverage.has_gesture());
        assert!(coverage.has_endstop(Endstop::ZRight));
        assert!(!coverage.has_endstop(Endstop::YRight));

        assert_eq!(frame.intake_fan_1_rpm, Deci::from_tenths(50));
        assert_eq!(frame.intake_fan_2_rpm, Deci::from_tenths(60));
        assert_eq!(frame.exhaust_fan_rpm, Deci::from_tenths(70));
        assert_eq!(frame.gesture, Gesture::Up);
        assert!(frame.endstops.get(Endstop::ZRight));
        for endstop in &Endstop::ALL[1..] {
            assert!(!frame.endstops.get(*endstop));
        }
    }

    #[test]
    fn test_truncated_reply_leaves_frame() {
        let mut frame = seeded();
        let before = frame;
        assert_eq!(frame.decode_line(b"$1,2,3"), Err(ReplyError::Truncated));
        assert_eq!(frame, before);
    }

    #[test]
    fn test_missing_prefix_leaves_frame() {
        let mut frame = seeded();
        let before = frame;
        assert_eq!(
            frame.decode_line(b"10,20,30,40,50,60,70,1,1"),
            Err(ReplyError::MissingPrefix)
        );
        assert_eq!(frame, before);
    }

    #[test]
    fn test_unknown_gesture_is_none() {
        let mut frame = seeded();
        frame.decode_line(b"$1,2,3,4,5,6,7,9").unwrap();
        assert_eq!(frame.gesture, Gesture::None);
    }

    #[test]
    fn test_endstop_needs_exact_one() {
        let mut frame = TelemetryFrame::default();
        frame
            .decode_line(b"$1,2,3,4,5,6,7,0,2,1,0,1,0,1,1")
            .unwrap();
        assert!(!frame.endstops.get(Endstop::ZRight));
        assert!(frame.endstops.get(Endstop::YRight));
        assert!(!frame.endstops.get(Endstop::YLeft));
        assert!(frame.endstops.get(Endstop::Cvr1Right));
        assert!(!frame.endstops.get(Endstop::Cvr1Left));
        assert!(frame.endstops.get(Endstop::Cvr2Right));
        assert!(frame.endstops.get(Endstop::Cvr2Left));
    }

    proptest! {
        /// Fields covered by the token count change, the rest stay put
        #[test]
        fn prop_partial_decode_is_monotonic(k in 4usize..=15) {
            let mut frame = seeded();
            let tokens: std::vec::Vec<u32> = (0..k as u32).map(|i| i + 1).collect();
            frame.apply(&tokens).unwrap();

            prop_assert_eq!(frame.mcu_load, Deci::from_tenths(1));
            prop_assert_eq!(frame.resin_temp, Deci::from_tenths(4));

            if k >= FAN_TOKENS {
                prop_assert_eq!(frame.exhaust_fan_rpm, Deci::from_tenths(7));
            } else {
                prop_assert_eq!(frame.intake_fan_1_rpm, Deci::from_tenths(999));
                prop_assert_eq!(frame.exhaust_fan_rpm, Deci::from_tenths(999));
            }

            if k >= GESTURE_TOKENS {
                // Code 8 is out of range
                prop_assert_eq!(frame.gesture, Gesture::None);
            } else {
                prop_assert_eq!(frame.gesture, Gesture::Right);
            }

            for endstop in Endstop::ALL {
                if k >= endstop.tokens_needed() {
                    // Token values are > 1 here, so covered flags clear
                    prop_assert!(!frame.endstops.get(endstop));
                } else {
                    prop_assert!(frame.endstops.get(endstop));
                }
            }
        }

        #[test]
        fn prop_short_replies_never_mutate(k in 0usize..4) {
            let mut frame = seeded();
            let before = frame;
            let tokens: std::vec::Vec<u32> = (0..k as u32).collect();
            prop_assert_eq!(frame.apply(&tokens), Err(ReplyError::Truncated));
            prop_assert_eq!(frame, before);
        }
    }
}
