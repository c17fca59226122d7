use std::{
    f32::consts::TAU,
    fmt::Debug,
    ops::{Add, AddAssign, Div, Mul, Sub},
};

use glam::{Vec2, Vec3};
use rand::Rng;

/// Everything the simulation needs from a vector, implemented for glam's
/// `Vec2` (planar flocks) and `Vec3` (spatial flocks).
///
/// glam already has most of these as inherent methods, but the core is
/// written once for both dimensions, so it only talks to this trait.
pub trait SimVector:
    Copy
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Div<f32, Output = Self>
    + AddAssign
{
    const ZERO: Self;
    /// number of axes
    const DIM: usize;

    fn magnitude(self) -> f32;

    fn dot_with(self, other: Self) -> f32;

    fn axis(self, axis: usize) -> f32;

    fn set_axis(&mut self, axis: usize, value: f32);

    /// Uniformly distributed direction of length 1.
    fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Unit vector, or the exact zero vector when all components are zero or
    /// any is not finite. Never NaN.
    #[inline]
    fn normalized(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude > 0. && magnitude.is_finite() {
            return self / magnitude;
        }

        // finite components can still overflow the squared length
        let largest = self.max_abs_axis();
        if largest > 0. && largest.is_finite() {
            let scaled = self / largest;
            scaled / scaled.magnitude()
        } else {
            Self::ZERO
        }
    }

    /// Largest absolute component, infinite when any component is NaN or
    /// infinite.
    fn max_abs_axis(self) -> f32 {
        (0..Self::DIM).fold(0., |acc: f32, axis| {
            let value = self.axis(axis).abs();
            if value.is_finite() {
                acc.max(value)
            } else {
                f32::INFINITY
            }
        })
    }

    #[inline]
    fn distance_to(self, other: Self) -> f32 {
        (self - other).magnitude()
    }

    /// Uniform point inside the box spanned by `min` and `max`.
    fn random_within<R: Rng + ?Sized>(rng: &mut R, min: Self, max: Self) -> Self {
        let mut res = Self::ZERO;
        for axis in 0..Self::DIM {
            let (lo, hi) = (min.axis(axis), max.axis(axis));
            res.set_axis(axis, lo + (hi - lo) * rng.gen::<f32>());
        }
        res
    }
}

impl SimVector for Vec2 {
    const ZERO: Self = Vec2::ZERO;
    const DIM: usize = 2;

    #[inline]
    fn magnitude(self) -> f32 {
        self.length()
    }

    #[inline]
    fn dot_with(self, other: Self) -> f32 {
        self.dot(other)
    }

    #[inline]
    fn axis(self, axis: usize) -> f32 {
        self.to_array()[axis]
    }

    #[inline]
    fn set_axis(&mut self, axis: usize, value: f32) {
        match axis {
            0 => self.x = value,
            1 => self.y = value,
            _ => unreachable!("axis {} out of range for a 2D vector", axis),
        }
    }

    fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let heading = rng.gen::<f32>() * TAU;
        Vec2::new(heading.cos(), heading.sin())
    }
}

impl SimVector for Vec3 {
    const ZERO: Self = Vec3::ZERO;
    const DIM: usize = 3;

    #[inline]
    fn magnitude(self) -> f32 {
        self.length()
    }

    #[inline]
    fn dot_with(self, other: Self) -> f32 {
        self.dot(other)
    }

    #[inline]
    fn axis(self, axis: usize) -> f32 {
        self.to_array()[axis]
    }

    #[inline]
    fn set_axis(&mut self, axis: usize, value: f32) {
        match axis {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => unreachable!("axis {} out of range for a 3D vector", axis),
        }
    }

    fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // uniform on the sphere: uniform height, uniform azimuth
        let z = rng.gen::<f32>() * 2. - 1.;
        let azimuth = rng.gen::<f32>() * TAU;
        let r = (1. - z * z).max(0.).sqrt();
        Vec3::new(r * azimuth.cos(), r * azimuth.sin(), z)
    }
}

/// Renormalize then scale to `max_force`, a zero `desired` stays zero.
#[inline]
pub fn steer<V: SimVector>(desired: V, max_force: f32) -> V {
    desired.normalized() * max_force
}

/// Angle between two vectors in degrees.
///
/// The cosine is clamped to [-1, 1] before `acos`, rounding can push the
/// normalized dot product of (anti)parallel vectors just outside of it.
/// Returns 0 when either vector has no length.
pub fn angle_between<V: SimVector>(a: V, b: V) -> f32 {
    let denominator = a.magnitude() * b.magnitude();
    if denominator <= 0. || !denominator.is_finite() {
        return 0.;
    }

    (a.dot_with(b) / denominator).clamp(-1., 1.).acos().to_degrees()
}
