//! Fixed-point 3-vector
//!
//! The arena is planar; `z` is carried for parity with the scene transform and
//! stays zero for everything the simulation spawns.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fixed::Fixed;
use crate::error::ArithmeticError;

/// Component magnitude bound (raw bits) before normalizing: 2^14 per axis
const NORMALIZE_BITS: u32 = 46;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec3 {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
}

impl FixedVec3 {
    pub const ZERO: Self = Self::new(Fixed::ZERO, Fixed::ZERO, Fixed::ZERO);

    #[inline]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Planar vector (`z = 0`)
    #[inline]
    pub const fn xy(x: Fixed, y: Fixed) -> Self {
        Self::new(x, y, Fixed::ZERO)
    }

    /// Planar vector from whole numbers
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self::xy(Fixed::from_int(x), Fixed::from_int(y))
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        Ok(Self::new(
            self.x.checked_add(rhs.x)?,
            self.y.checked_add(rhs.y)?,
            self.z.checked_add(rhs.z)?,
        ))
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        Ok(Self::new(
            self.x.checked_sub(rhs.x)?,
            self.y.checked_sub(rhs.y)?,
            self.z.checked_sub(rhs.z)?,
        ))
    }

    pub fn checked_scale(self, s: Fixed) -> Result<Self, ArithmeticError> {
        Ok(Self::new(
            self.x.checked_mul(s)?,
            self.y.checked_mul(s)?,
            self.z.checked_mul(s)?,
        ))
    }

    pub fn checked_div(self, s: Fixed) -> Result<Self, ArithmeticError> {
        Ok(Self::new(
            self.x.checked_div(s)?,
            self.y.checked_div(s)?,
            self.z.checked_div(s)?,
        ))
    }

    pub fn checked_dot(self, rhs: Self) -> Result<Fixed, ArithmeticError> {
        self.x
            .checked_mul(rhs.x)?
            .checked_add(self.y.checked_mul(rhs.y)?)?
            .checked_add(self.z.checked_mul(rhs.z)?)
    }

    pub fn checked_length_squared(self) -> Result<Fixed, ArithmeticError> {
        self.checked_dot(self)
    }

    /// Component-wise product
    #[inline]
    pub fn mul_elements(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Component-wise quotient (zero where `rhs` is zero)
    #[inline]
    pub fn div_elements(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }

    #[inline]
    pub fn dot(self, rhs: Self) -> Fixed {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn length_squared(self) -> Fixed {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> Fixed {
        self.length_squared().sqrt()
    }

    /// Sum of the components
    #[inline]
    pub fn element_sum(self) -> Fixed {
        self.x + self.y + self.z
    }

    /// Unit vector, or `DivideByZero` for the zero vector. Long vectors are
    /// shifted down first so the squared length stays in range.
    pub fn checked_normalize(self) -> Result<Self, ArithmeticError> {
        let largest = [self.x, self.y, self.z]
            .iter()
            .map(|c| c.raw().unsigned_abs())
            .max()
            .unwrap_or(0);
        let shift = (u64::BITS - largest.leading_zeros()).saturating_sub(NORMALIZE_BITS);
        let v = Self::new(
            Fixed::from_raw(self.x.raw() >> shift),
            Fixed::from_raw(self.y.raw() >> shift),
            Fixed::from_raw(self.z.raw() >> shift),
        );
        let length = v.checked_length_squared()?.sqrt();
        if length.is_zero() {
            return Err(ArithmeticError::DivideByZero);
        }
        v.checked_div(length)
    }

    /// Unit vector; the zero vector normalizes to zero
    pub fn normalize_or_zero(self) -> Self {
        self.checked_normalize().unwrap_or(Self::ZERO)
    }

    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Reversed direction
    #[inline]
    pub fn turn(self) -> Self {
        -self
    }

    #[inline]
    pub fn clamp(self, lower: Self, upper: Self) -> Self {
        Self::new(
            self.x.clamp(lower.x, upper.x),
            self.y.clamp(lower.y, upper.y),
            self.z.clamp(lower.z, upper.z),
        )
    }

    #[inline]
    pub fn lerp(a: Self, b: Self, t: Fixed) -> Self {
        Self::new(
            Fixed::lerp(a.x, b.x, t),
            Fixed::lerp(a.y, b.y, t),
            Fixed::lerp(a.z, b.z, t),
        )
    }

    /// Rotate the planar part about the origin by `angle` (counter-clockwise)
    pub fn rotate(self, angle: Fixed) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c, self.z)
    }

    /// Rotate the planar part of `self` about `origin`
    pub fn rotate_about(self, origin: Self, angle: Fixed) -> Self {
        (self - origin).rotate(angle) + origin
    }

    /// Unit vector at `angle` measured from +x
    pub fn from_angle(angle: Fixed) -> Self {
        let (s, c) = angle.sin_cos();
        Self::xy(c, s)
    }

    /// Heading of the planar part, measured from +x
    pub fn angle(self) -> Fixed {
        Fixed::atan2(self.y, self.x)
    }

    /// Lossy planar conversion for the presentation layer
    pub fn truncate(self) -> Vec2 {
        Vec2::new(self.x.to_f32(), self.y.to_f32())
    }
}

impl Add for FixedVec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for FixedVec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for FixedVec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Fixed> for FixedVec3 {
    type Output = Self;
    fn mul(self, s: Fixed) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Div<Fixed> for FixedVec3 {
    type Output = Self;
    fn div(self, s: Fixed) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl AddAssign for FixedVec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FixedVec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<Fixed> for FixedVec3 {
    fn mul_assign(&mut self, s: Fixed) {
        *self = *self * s;
    }
}
