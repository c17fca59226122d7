use glam::Vec3;

use crate::{flock::Flock, math_helpers::angle_between};

/// The flock's average heading is scaled up to a point far ahead before the
/// boids are turned towards it.
const HEADING_SCALE: f32 = 100.;

/// Rotation turning a boid's last displacement towards the flock heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub axis: Vec3,
    pub angle_deg: f32,
}

impl Flock<Vec3> {
    /// One [`Orientation`] per boid, from the displacements of the last
    /// update. Before the first update every boid has a zero axis and angle.
    pub fn orientations(&self) -> Vec<Orientation> {
        if self.is_empty() {
            return Vec::new();
        }

        let avg_direction = self
            .metadata()
            .iter()
            .fold(Vec3::ZERO, |acc, m| acc + m.displacement)
            / self.len() as f32;
        let heading = avg_direction * HEADING_SCALE;

        self.metadata()
            .iter()
            .map(|m| {
                let old_direction = m.displacement;
                let new_direction = heading - m.previous_position;
                Orientation {
                    axis: old_direction.cross(new_direction),
                    angle_deg: angle_between(old_direction, new_direction),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec3;

    use crate::{boid::Boid, flock::Flock, options::RunOptions};

    #[test]
    fn no_update_no_rotation() {
        let flock = Flock::seeded(RunOptions::<Vec3>::default(), 0).unwrap();

        let orientations = flock.orientations();

        assert_eq!(orientations.len(), flock.len());
        assert!(orientations
            .iter()
            .all(|o| o.axis == Vec3::ZERO && o.angle_deg == 0.));
    }

    #[test]
    fn lonely_boid_turns_to_heading() {
        let boids = vec![Boid::new(Vec3::new(0., 0., 300.), Vec3::new(1., 0., 0.))];
        let mut flock = Flock::from_boids(boids, RunOptions::default()).unwrap();

        flock.update(1.);
        let orientation = flock.orientations()[0];

        // heading (100, 0, 0) seen from (0, 0, 300)
        assert_relative_eq!(orientation.axis.y, 300., epsilon = 1e-3);
        assert_relative_eq!(orientation.axis.x, 0.);
        assert_relative_eq!(orientation.angle_deg, 71.565, epsilon = 1e-2);
    }

    #[test]
    fn angles_are_never_nan() {
        let mut flock = Flock::seeded(RunOptions::<Vec3>::default(), 8).unwrap();
        flock.cycle_target_weight();

        for _ in 0..5 {
            flock.update(1.);
            for o in flock.orientations() {
                assert!(!o.angle_deg.is_nan());
                assert!((0. ..=180.).contains(&o.angle_deg));
            }
        }
    }
}
