/*
 * 17.14 Fixed-Point Arithmetic
 *
 * The kernel has no FPU state to spare inside the timer interrupt, so every
 * fractional quantity the MLFQS engine works with (load average, recent CPU,
 * the intermediate priority expression) is an `i32` scaled by 2^14:
 * 1 sign bit, 17 integer bits, 14 fractional bits.
 *
 * `Fixed` hides the scale factor behind the `core::ops` operators, so call
 * sites can never mix a scaled and an unscaled integer by accident:
 *
 * - `Fixed op Fixed` - both operands scaled
 * - `Fixed op i32`   - right operand is a plain integer
 *
 * Multiplication and division of two reals widen to `i64` for the
 * intermediate product. Overflow beyond the representable range is an
 * unchecked precondition; the scheduler formulas stay well inside it.
 *
 * All operations are pure functions of their scaled inputs, so a given
 * history of nice values and ready counts always reproduces the same bits.
 */

use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Number of fractional bits.
pub const FRACTION_BITS: u32 = 14;

/// Scale factor, the raw representation of `1.0`.
const SCALE: i32 = 1 << FRACTION_BITS;

/// Signed 17.14 fixed-point real.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(SCALE);

    /// Convert an integer to a real.
    pub const fn from_int(n: i32) -> Self {
        Fixed(n * SCALE)
    }

    /// Wrap an already scaled value.
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    /// The scaled representation.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Convert to an integer, rounding toward zero.
    pub const fn to_int_trunc(self) -> i32 {
        self.0 / SCALE
    }

    /// Convert to an integer, rounding to nearest (half away from zero).
    pub const fn to_int_nearest(self) -> i32 {
        if self.0 >= 0 {
            (self.0 + SCALE / 2) / SCALE
        } else {
            (self.0 - SCALE / 2) / SCALE
        }
    }

    /// `self * factor` rounded to nearest, e.g. `factor = 100` for the
    /// hundredths used in reports. The product is taken in `i64`, so it does
    /// not overflow for any representable value.
    pub const fn to_int_nearest_scaled(self, factor: i32) -> i64 {
        let scaled = self.0 as i64 * factor as i64;
        let scale = SCALE as i64;
        if scaled >= 0 {
            (scaled + scale / 2) / scale
        } else {
            (scaled - scale / 2) / scale
        }
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl Add<i32> for Fixed {
    type Output = Fixed;

    fn add(self, rhs: i32) -> Fixed {
        Fixed(self.0 + rhs * SCALE)
    }
}

impl AddAssign<i32> for Fixed {
    fn add_assign(&mut self, rhs: i32) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl Sub<i32> for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: i32) -> Fixed {
        Fixed(self.0 - rhs * SCALE)
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed((self.0 as i64 * rhs.0 as i64 / SCALE as i64) as i32)
    }
}

impl Mul<i32> for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: i32) -> Fixed {
        Fixed(self.0 * rhs)
    }
}

impl Div for Fixed {
    type Output = Fixed;

    fn div(self, rhs: Fixed) -> Fixed {
        Fixed((self.0 as i64 * SCALE as i64 / rhs.0 as i64) as i32)
    }
}

impl Div<i32> for Fixed {
    type Output = Fixed;

    fn div(self, rhs: i32) -> Fixed {
        Fixed(self.0 / rhs)
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

/// Prints the value with two decimals, e.g. `0.02`.
impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hundredths = self.to_int_nearest_scaled(100);
        let sign = if hundredths < 0 { "-" } else { "" };
        let abs = hundredths.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}
