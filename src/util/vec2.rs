use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Rem, Sub, SubAssign};

/// 2D vector in world or screen units
///
/// Value type: every operation returns a new vector.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };
    pub const UP: Vec2 = Vec2 { x: 0.0, y: -1.0 };
    pub const DOWN: Vec2 = Vec2 { x: 0.0, y: 1.0 };
    pub const LEFT: Vec2 = Vec2 { x: -1.0, y: 0.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn lerp(&self, other: Vec2, t: f32) -> Self {
        *self + (other - *self) * t
    }

    /// Component-wise product
    #[inline]
    pub fn mul_elem(&self, other: Vec2) -> Self {
        Self {
            x: self.x * other.x,
            y: self.y * other.y,
        }
    }

    /// Component-wise floating remainder; the sign follows the dividend
    /// (`-30 % 50 == -30`), matching `f32::rem`.
    #[inline]
    pub fn rem_elem(&self, other: Vec2) -> Self {
        Self {
            x: self.x % other.x,
            y: self.y % other.y,
        }
    }

    /// Component-wise abs
    pub fn abs(&self) -> Self {
        Self {
            x: self.x.abs(),
            y: self.y.abs(),
        }
    }

    /// Component-wise min
    pub fn min(&self, other: Vec2) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }

    /// Component-wise max
    pub fn max(&self, other: Vec2) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }

    /// Inclusive axis-aligned containment test
    #[inline]
    pub fn within(&self, min: Vec2, max: Vec2) -> bool {
        self.x >= min.x && self.x <= max.x && self.y >= min.y && self.y <= max.y
    }

    /// Check if vector is approximately equal to another
    pub fn approx_eq(&self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}

impl Mul for Vec2 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.mul_elem(rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl Rem for Vec2 {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        self.rem_elem(rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn samples() -> Vec<Vec2> {
        vec![
            Vec2::new(3.0, 4.0),
            Vec2::new(-7.5, 2.25),
            Vec2::new(0.5, -0.125),
            Vec2::new(-120.0, -64.0),
        ]
    }

    #[test]
    fn test_add_commutes() {
        for a in samples() {
            for b in samples() {
                assert_eq!(a + b, b + a);
            }
        }
    }

    #[test]
    fn test_add_zero_identity() {
        for a in samples() {
            assert_eq!(a + Vec2::ZERO, a);
        }
    }

    #[test]
    fn test_sub_self_is_zero() {
        for a in samples() {
            assert_eq!(a - a, Vec2::ZERO);
        }
    }

    #[test]
    fn test_mul_elem_zero() {
        for a in samples() {
            let product = a * Vec2::ZERO;
            assert_eq!(product.x.abs(), 0.0);
            assert_eq!(product.y.abs(), 0.0);
        }
    }

    #[test]
    fn test_rem_self_is_zero() {
        for a in samples() {
            let r = a % a;
            assert_eq!(r.x.abs(), 0.0);
            assert_eq!(r.y.abs(), 0.0);
        }
    }

    #[test]
    fn test_rem_sign_follows_dividend() {
        let r = Vec2::new(-30.0, 80.0) % Vec2::new(50.0, 50.0);
        assert_eq!(r, Vec2::new(-30.0, 30.0));
    }

    #[test]
    fn test_mul_elem() {
        let a = Vec2::new(2.0, 3.0);
        let b = Vec2::new(4.0, -1.0);
        assert_eq!(a * b, Vec2::new(8.0, -3.0));
    }

    #[test]
    fn test_scalar_ops() {
        let a = Vec2::new(2.0, 3.0);
        assert_eq!(a * 2.0, Vec2::new(4.0, 6.0));
        assert_eq!(2.0 * a, Vec2::new(4.0, 6.0));
        assert_eq!(a / 2.0, Vec2::new(1.0, 1.5));
        assert_eq!(-a, Vec2::new(-2.0, -3.0));
    }

    #[test]
    fn test_assign_ops() {
        let mut a = Vec2::new(1.0, 2.0);
        a += Vec2::new(3.0, 4.0);
        assert_eq!(a, Vec2::new(4.0, 6.0));
        a -= Vec2::new(1.0, 1.0);
        assert_eq!(a, Vec2::new(3.0, 5.0));
        a *= 2.0;
        assert_eq!(a, Vec2::new(6.0, 10.0));
    }

    #[test]
    fn test_length_and_normalize() {
        let v = Vec2::new(3.0, 4.0);
        assert!((v.length() - 5.0).abs() < EPSILON);
        assert!((v.normalize().length() - 1.0).abs() < EPSILON);
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn test_lerp_edges() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 10.0);
        assert!(a.lerp(b, 0.0).approx_eq(a, EPSILON));
        assert!(a.lerp(b, 0.5).approx_eq(Vec2::splat(5.0), EPSILON));
        assert!(a.lerp(b, 1.0).approx_eq(b, EPSILON));
    }

    #[test]
    fn test_within_inclusive() {
        let min = Vec2::new(-100.0, -100.0);
        let max = Vec2::new(100.0, 100.0);
        assert!(Vec2::new(100.0, -100.0).within(min, max));
        assert!(!Vec2::new(100.5, 0.0).within(min, max));
    }

    #[test]
    fn test_serialize_as_object() {
        let json = serde_json::to_string(&Vec2::new(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0}"#);
    }

    #[test]
    fn test_serde_bincode() {
        let v = Vec2::new(1.5, 2.5);
        let encoded =
            bincode::serde::encode_to_vec(&v, bincode::config::standard()).unwrap();
        let (decoded, _): (Vec2, usize) =
            bincode::serde::decode_from_slice(&encoded, bincode::config::standard()).unwrap();
        assert_eq!(v, decoded);
    }
}
