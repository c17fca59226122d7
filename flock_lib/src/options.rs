use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, math_helpers::SimVector};

/// Everything that parametrizes a run. Set when the flock is built and only
/// changed through [`crate::flock::Flock::reconfigure`] and friends.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions<V> {
    pub init_boids: usize,

    pub bounds: Bounds<V>,
    pub boundary: Boundary,

    pub max_speed: f32,
    pub max_force: f32,
    /// initial speeds are sampled uniformly from [min_init_speed, max_init_speed)
    pub min_init_speed: f32,
    pub max_init_speed: f32,

    pub separation_radius: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,

    pub separation_weight: f32,
    pub alignment_weight: f32,
    /// a negative weight scatters the flock
    pub cohesion_weight: f32,

    /// shared point boids are drawn to (or pushed from)
    pub target: Option<V>,
    pub target_factor: f32,
    /// 1 bait, -1 predator, 0 off
    pub target_weight: i32,

    /// tick length used by drivers that do not pace themselves
    pub dt: f32,
}

impl<V: SimVector> RunOptions<V> {
    /// The largest behaviour radius, nothing further away can influence a boid.
    pub fn max_sensory_distance(&self) -> f32 {
        self.separation_radius
            .max(self.alignment_radius.max(self.cohesion_radius))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("max_speed", self.max_speed),
            ("max_force", self.max_force),
            ("min_init_speed", self.min_init_speed),
            ("max_init_speed", self.max_init_speed),
            ("separation_radius", self.separation_radius),
            ("alignment_radius", self.alignment_radius),
            ("cohesion_radius", self.cohesion_radius),
            ("dt", self.dt),
        ] {
            non_negative(name, value)?;
        }

        for (name, value) in [
            ("separation_weight", self.separation_weight),
            ("alignment_weight", self.alignment_weight),
            ("cohesion_weight", self.cohesion_weight),
            ("target_factor", self.target_factor),
        ] {
            finite(name, value)?;
        }

        if self.min_init_speed > self.max_init_speed {
            return Err(ConfigError::InvertedSpeedRange {
                min: self.min_init_speed,
                max: self.max_init_speed,
            });
        }

        for axis in 0..V::DIM {
            let min = self.bounds.min.axis(axis);
            let max = self.bounds.max.axis(axis);
            finite("bounds.min", min)?;
            finite("bounds.max", max)?;
            if min >= max {
                return Err(ConfigError::EmptyBounds { axis, min, max });
            }
        }

        if let Some(target) = self.target {
            for axis in 0..V::DIM {
                finite("target", target.axis(axis))?;
            }
        }

        if let Boundary::Contain { margin, force } = self.boundary {
            non_negative("boundary.margin", margin)?;
            finite("boundary.force", force)?;
        }

        Ok(())
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0. {
        Err(ConfigError::Negative { name, value })
    } else {
        Ok(())
    }
}

/// Planar flock, the constants of the HTTP served variant.
impl Default for RunOptions<Vec2> {
    fn default() -> Self {
        RunOptions {
            init_boids: 30,
            bounds: Bounds::new(Vec2::ZERO, Vec2::new(1200., 800.)),
            boundary: Boundary::Wrap,
            max_speed: 5.0,
            max_force: 0.2,
            min_init_speed: 1.0,
            max_init_speed: 3.0,
            separation_radius: 25.,
            alignment_radius: 50.,
            cohesion_radius: 50.,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            target: None,
            target_factor: 0.01,
            target_weight: 0,
            dt: 0.016,
        }
    }
}

/// Spatial flock kept inside a box by soft containment, with a target at the
/// origin that starts switched off.
impl Default for RunOptions<Vec3> {
    fn default() -> Self {
        RunOptions {
            init_boids: 300,
            bounds: Bounds::new(Vec3::new(-250., -250., 250.), Vec3::new(250., 250., 700.)),
            boundary: Boundary::Contain {
                margin: 0.,
                force: 3.,
            },
            max_speed: 10.,
            max_force: 0.2,
            min_init_speed: 0.,
            max_init_speed: 1.,
            separation_radius: 10.,
            alignment_radius: 1000.,
            cohesion_radius: 1000.,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            target: Some(Vec3::ZERO),
            target_factor: 0.01,
            target_weight: 0,
            dt: 1.,
        }
    }
}

/// Axis aligned box, `min` is the lowest value on every axis.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Bounds<V> {
    pub min: V,
    pub max: V,
}

impl<V: SimVector> Bounds<V> {
    pub fn new(min: V, max: V) -> Self {
        Bounds { min, max }
    }

    pub fn center(&self) -> V {
        (self.min + self.max) / 2.
    }
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Contain", "margin": 20, "force": 3}
pub enum Boundary {
    /// out of bounds coordinates teleport to the opposite edge
    Wrap,
    /// a fixed push back towards the inside once within `margin` of an edge
    Contain { margin: f32, force: f32 },
}
