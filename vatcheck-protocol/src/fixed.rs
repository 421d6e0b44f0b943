//! Fixed-point decimal with one implied fractional digit
//!
//! The board reports temperatures, load and fan speeds as integers scaled by
//! ten (`456` means `45.6`). Keeping them as tenths avoids float comparisons
//! in the acceptance tests.

use core::fmt;

/// A value expressed in tenths of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Deci(i32);

impl Deci {
    /// Zero
    pub const ZERO: Deci = Deci(0);

    /// Build from a count of tenths
    pub const fn from_tenths(tenths: i32) -> Self {
        Self(tenths)
    }

    /// Build from whole units
    pub const fn from_whole(whole: i32) -> Self {
        Self(whole * 10)
    }

    /// Build from a raw protocol token
    ///
    /// Tokens are small bounded integers by protocol contract; values past
    /// `i32::MAX` wrap rather than being rejected.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw as i32)
    }

    /// Value in tenths
    pub const fn tenths(self) -> i32 {
        self.0
    }

    /// Absolute difference between two values
    pub const fn abs_diff(self, other: Deci) -> Deci {
        Deci((self.0 - other.0).abs())
    }

    /// Whole part (truncated towards zero)
    pub const fn whole(self) -> i32 {
        self.0 / 10
    }

    /// Fractional digit (always positive)
    pub const fn fraction(self) -> u8 {
        (self.0 % 10).unsigned_abs() as u8
    }
}

impl fmt::Display for Deci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-{}.{}", self.0.unsigned_abs() / 10, self.fraction())
        } else {
            write!(f, "{}.{}", self.whole(), self.fraction())
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Deci {
    fn format(&self, f: defmt::Formatter) {
        if self.0 < 0 {
            defmt::write!(f, "-{}.{}", self.0.unsigned_abs() / 10, self.fraction());
        } else {
            defmt::write!(f, "{}.{}", self.whole(), self.fraction());
        }
    }
}
