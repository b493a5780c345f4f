//! Q31.32 fixed-point scalar
//!
//! Every simulation quantity is a `Fixed`. Arithmetic is plain integer math on
//! an `i64` with `i128` intermediates, so results are bit-identical on every
//! platform. sqrt uses integer Newton iteration and sin/cos/atan2 use CORDIC
//! against a constant arctangent table; the host FPU is never consulted.
//!
//! Two flavours of every operation exist:
//! - `checked_*` returns `ArithmeticError` on overflow or division by zero
//! - the `std::ops` operators saturate at `Fixed::MIN`/`Fixed::MAX` and treat
//!   division by zero as zero
//!
//! Code that has to observe overflow (kinematics, squared distances) uses the
//! checked form.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArithmeticError;

/// Number of fractional bits
pub const FRAC_BITS: u32 = 32;

const FRAC_MASK: i64 = (1i64 << FRAC_BITS) - 1;

/// atan(2^-i) in Q31.32, i = 0..32
const ATAN_TABLE: [i64; 32] = [
    3373259426, 1991351318, 1052175346, 534100635, 268086748, 134174063, 67103403, 33553749,
    16777131, 8388597, 4194303, 2097152, 1048576, 524288, 262144, 131072, 65536, 32768, 16384,
    8192, 4096, 2048, 1024, 512, 256, 128, 64, 32, 16, 8, 4, 2,
];

/// Product of 1/sqrt(1 + 2^-2i) over the table, in Q31.32
const CORDIC_GAIN: i64 = 2608131496;

/// Deterministic fixed-point number (Q31.32 on `i64`)
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(i64);

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << FRAC_BITS);
    pub const HALF: Self = Self(1 << (FRAC_BITS - 1));
    pub const MAX: Self = Self(i64::MAX);
    pub const MIN: Self = Self(i64::MIN);
    /// Smallest positive value
    pub const EPSILON: Self = Self(1);
    pub const PI: Self = Self(13493037705);
    pub const FRAC_PI_2: Self = Self(6746518852);
    pub const TAU: Self = Self(26986075409);

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self((value as i64) << FRAC_BITS)
    }

    /// `num / den`, for building constants.
    ///
    /// `den` must be non-zero; in a `const` context a zero denominator is a
    /// compile error.
    pub const fn from_ratio(num: i32, den: i32) -> Self {
        assert!(den != 0, "Fixed::from_ratio with zero denominator");
        Self((((num as i128) << FRAC_BITS) / den as i128) as i64)
    }

    /// Convert a presentation-layer float (pointer input, debug tooling).
    /// Never used inside a step.
    pub fn from_f32(value: f32) -> Self {
        let scaled = (value as f64) * (1u64 << FRAC_BITS) as f64;
        if scaled >= i64::MAX as f64 {
            Self::MAX
        } else if scaled <= i64::MIN as f64 {
            Self::MIN
        } else {
            Self(scaled.round() as i64)
        }
    }

    /// Lossy conversion for rendering
    pub fn to_f32(self) -> f32 {
        (self.0 as f64 / (1u64 << FRAC_BITS) as f64) as f32
    }

    /// Integer part, rounded toward negative infinity
    #[inline]
    pub const fn floor_to_int(self) -> i64 {
        self.0 >> FRAC_BITS
    }

    // ---------------------------------------------------------------------
    // Checked arithmetic
    // ---------------------------------------------------------------------

    #[inline]
    pub fn checked_add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    pub fn checked_mul(self, rhs: Self) -> Result<Self, ArithmeticError> {
        let wide = (self.0 as i128 * rhs.0 as i128) >> FRAC_BITS;
        i64::try_from(wide)
            .map(Self)
            .map_err(|_| ArithmeticError::Overflow)
    }

    #[inline]
    pub fn checked_div(self, rhs: Self) -> Result<Self, ArithmeticError> {
        if rhs.0 == 0 {
            return Err(ArithmeticError::DivideByZero);
        }
        let wide = ((self.0 as i128) << FRAC_BITS) / rhs.0 as i128;
        i64::try_from(wide)
            .map(Self)
            .map_err(|_| ArithmeticError::Overflow)
    }

    #[inline]
    pub fn checked_neg(self) -> Result<Self, ArithmeticError> {
        self.0
            .checked_neg()
            .map(Self)
            .ok_or(ArithmeticError::Overflow)
    }

    /// Integer power; negative exponents take the reciprocal
    pub fn checked_pow(self, exp: i32) -> Result<Self, ArithmeticError> {
        let mut acc = Self::ONE;
        for _ in 0..exp.unsigned_abs() {
            acc = acc.checked_mul(self)?;
        }
        if exp < 0 {
            Self::ONE.checked_div(acc)
        } else {
            Ok(acc)
        }
    }

    // ---------------------------------------------------------------------
    // Saturating arithmetic (backs the operators)
    // ---------------------------------------------------------------------

    #[inline]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    #[inline]
    pub fn saturating_mul(self, rhs: Self) -> Self {
        let wide = (self.0 as i128 * rhs.0 as i128) >> FRAC_BITS;
        Self(wide.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Division that yields zero for a zero divisor
    #[inline]
    pub fn saturating_div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return Self::ZERO;
        }
        let wide = ((self.0 as i128) << FRAC_BITS) / rhs.0 as i128;
        Self(wide.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    #[inline]
    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn signum(self) -> Self {
        Self::from_int(self.0.signum() as i32)
    }

    /// Fractional part, always in `[0, 1)`
    #[inline]
    pub fn fract(self) -> Self {
        Self(self.0 & FRAC_MASK)
    }

    #[inline]
    pub fn floor(self) -> Self {
        Self(self.0 & !FRAC_MASK)
    }

    #[inline]
    pub fn ceil(self) -> Self {
        if self.fract().is_zero() {
            self
        } else {
            self.floor().saturating_add(Self::ONE)
        }
    }

    #[inline]
    pub fn clamp(self, lower: Self, upper: Self) -> Self {
        if self > upper {
            upper
        } else if self < lower {
            lower
        } else {
            self
        }
    }

    #[inline]
    pub fn upper_clamp(self, upper: Self) -> Self {
        self.min(upper)
    }

    #[inline]
    pub fn lower_clamp(self, lower: Self) -> Self {
        self.max(lower)
    }

    /// Linear interpolation `a + (b - a) * t`
    #[inline]
    pub fn lerp(a: Self, b: Self, t: Self) -> Self {
        a + (b - a) * t
    }

    /// Angle wrapped into `[0, tau)`
    #[inline]
    pub fn wrap_angle(self) -> Self {
        Self(self.0.rem_euclid(Self::TAU.0))
    }

    /// Square root by integer Newton iteration. Non-positive inputs give zero.
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        // sqrt(raw / 2^32) * 2^32 == sqrt(raw << 32)
        let n = (self.0 as u128) << FRAC_BITS;
        Self(isqrt(n) as i64)
    }

    pub fn sin(self) -> Self {
        self.sin_cos().0
    }

    pub fn cos(self) -> Self {
        self.sin_cos().1
    }

    /// Sine and cosine in one CORDIC pass
    pub fn sin_cos(self) -> (Self, Self) {
        if self.0 == 0 {
            return (Self::ZERO, Self::ONE);
        }

        // Reduce to [-pi, pi]
        let mut theta = self.0.rem_euclid(Self::TAU.0);
        if theta > Self::PI.0 {
            theta -= Self::TAU.0;
        }

        // Fold into [-pi/2, pi/2], where the rotation converges
        let mut flip = false;
        if theta > Self::FRAC_PI_2.0 {
            theta -= Self::PI.0;
            flip = true;
        } else if theta < -Self::FRAC_PI_2.0 {
            theta += Self::PI.0;
            flip = true;
        }

        let mut x = CORDIC_GAIN;
        let mut y = 0i64;
        let mut z = theta;
        for (i, &step) in ATAN_TABLE.iter().enumerate() {
            let (dx, dy) = (y >> i, x >> i);
            if z >= 0 {
                x -= dx;
                y += dy;
                z -= step;
            } else {
                x += dx;
                y -= dy;
                z += step;
            }
        }

        if flip {
            (Self(-y), Self(-x))
        } else {
            (Self(y), Self(x))
        }
    }

    /// Four-quadrant arctangent of `y / x`, in `(-pi, pi]`. Zero for the
    /// origin.
    pub fn atan2(y: Self, x: Self) -> Self {
        let (mut x, mut y) = (x.0, y.0);
        if x == 0 && y == 0 {
            return Self::ZERO;
        }

        // Keep the CORDIC gain (~1.65 * sqrt 2) clear of i64 and give small
        // vectors enough significant bits
        while x.unsigned_abs().max(y.unsigned_abs()) >= 1 << 60 {
            x >>= 1;
            y >>= 1;
        }
        while x.unsigned_abs().max(y.unsigned_abs()) < 1 << 40 {
            x <<= 1;
            y <<= 1;
        }

        let mut z = 0i64;
        if x < 0 {
            z = if y >= 0 { Self::PI.0 } else { -Self::PI.0 };
            x = -x;
            y = -y;
        }

        for (i, &step) in ATAN_TABLE.iter().enumerate() {
            let (dx, dy) = (y >> i, x >> i);
            if y > 0 {
                x += dx;
                y -= dy;
                z += step;
            } else if y < 0 {
                x -= dx;
                y += dy;
                z -= step;
            } else {
                break;
            }
        }

        if z <= -Self::PI.0 {
            z += Self::TAU.0;
        }
        Self(z)
    }
}

/// Largest `r` with `r * r <= n`
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl Add for Fixed {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for Fixed {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl Mul for Fixed {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.saturating_mul(rhs)
    }
}

impl Div for Fixed {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        self.saturating_div(rhs)
    }
}

impl Neg for Fixed {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fixed {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fixed {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({self})")
    }
}

/// Decimal rendering, truncated to 6 fractional digits
impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude >> FRAC_BITS;
        let frac = ((magnitude & FRAC_MASK as u64) as u128 * 1_000_000) >> FRAC_BITS;
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let digits = format!("{frac:06}");
            write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
        }
    }
}

impl Fixed {
    /// Decimal rendering with 10 fractional digits, rounded to nearest.
    /// Parses back to the same raw value.
    pub fn to_exact_string(self) -> String {
        const SCALE: u128 = 10_000_000_000;
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude >> FRAC_BITS;
        // One raw step is wider than a unit in the 10th digit, so this never carries
        let frac_bits = (magnitude & FRAC_MASK as u64) as u128;
        let frac = (frac_bits * SCALE + (1 << (FRAC_BITS - 1))) >> FRAC_BITS;
        if frac == 0 {
            format!("{sign}{whole}")
        } else {
            let digits = format!("{frac:010}");
            format!("{sign}{whole}.{}", digits.trim_end_matches('0'))
        }
    }
}

/// Error parsing a decimal literal into `Fixed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFixedError(String);

impl fmt::Display for ParseFixedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fixed-point literal {:?}", self.0)
    }
}

impl std::error::Error for ParseFixedError {}

/// Exact decimal parsing (`"-12.375"`), rounded to the nearest raw step.
/// No floating point is involved.
impl FromStr for Fixed {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFixedError(s.to_string());
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err())?
        };

        // 18 digits keep 10^n and the shifted numerator inside i128
        let frac = &frac[..frac.len().min(18)];
        let frac_raw = if frac.is_empty() {
            0
        } else {
            let digits: i128 = frac.parse().map_err(|_| err())?;
            let scale = 10i128.pow(frac.len() as u32);
            ((digits << FRAC_BITS) + scale / 2) / scale
        };

        let magnitude = whole
            .checked_mul(1 << FRAC_BITS)
            .and_then(|w| w.checked_add(frac_raw))
            .ok_or_else(err)?;
        let raw = if negative { -magnitude } else { magnitude };
        i64::try_from(raw).map(Self).map_err(|_| err())
    }
}

/// Serde adapter writing `Fixed` as a decimal string (`"1.5"`), used for
/// human-edited configuration. Plain integers are accepted on input.
pub mod decimal {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    use super::Fixed;

    pub fn serialize<S: Serializer>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_exact_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fixed, D::Error> {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = Fixed;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a decimal string or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Fixed, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Fixed, E> {
                i32::try_from(v)
                    .map(Fixed::from_int)
                    .map_err(|_| E::custom(format!("{v} out of fixed-point range")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Fixed, E> {
                i32::try_from(v)
                    .map(Fixed::from_int)
                    .map_err(|_| E::custom(format!("{v} out of fixed-point range")))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}
