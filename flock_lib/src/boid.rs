use rand::Rng;

use crate::{
    math_helpers::{steer, SimVector},
    options::{Boundary, RunOptions},
};

/// Per-behaviour steering of one boid for one tick, unweighted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Steering<V> {
    pub separation: V,
    pub alignment: V,
    pub cohesion: V,
    pub target: V,
    pub containment: V,
}

impl<V: SimVector> Steering<V> {
    /// The force actually applied: flocking terms weighted, target and
    /// containment as they are.
    pub fn total(&self, run_options: &RunOptions<V>) -> V {
        self.separation * run_options.separation_weight
            + self.alignment * run_options.alignment_weight
            + self.cohesion * run_options.cohesion_weight
            + self.target
            + self.containment
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid<V> {
    pub position: V,
    pub velocity: V,
    // accumulated over a tick, always zero between ticks
    acceleration: V,
}

impl<V: SimVector> Boid<V> {
    /// Creates a new [`Boid`].
    pub fn new(position: V, velocity: V) -> Self {
        Boid {
            position,
            velocity,
            acceleration: V::ZERO,
        }
    }

    /// A boid somewhere within bounds, flying in a random direction with a
    /// speed from the initial speed range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, run_options: &RunOptions<V>) -> Self {
        let position = V::random_within(rng, run_options.bounds.min, run_options.bounds.max);
        let speed = run_options.min_init_speed
            + (run_options.max_init_speed - run_options.min_init_speed) * rng.gen::<f32>();
        let velocity = V::random_unit(rng) * speed;

        Boid::new(position, velocity)
    }

    pub fn acceleration(&self) -> V {
        self.acceleration
    }

    /// Evaluates every behaviour against `others`, which must be the pre-tick
    /// state of the flock (or any subset of it containing the neighbours).
    pub fn run_rules(&self, others: &[&Boid<V>], run_options: &RunOptions<V>) -> Steering<V> {
        Steering {
            separation: self.separation(others, run_options),
            alignment: self.alignment(others, run_options),
            cohesion: self.cohesion(others, run_options),
            target: self.seek(run_options),
            containment: self.containment(run_options),
        }
    }

    /// Steer away from boids closer than the separation radius, the closer the
    /// harder.
    pub fn separation(&self, others: &[&Boid<V>], run_options: &RunOptions<V>) -> V {
        let mut res = V::ZERO;
        let mut count = 0;

        for other in others {
            let distance = self.position.distance_to(other.position);
            if distance > 0. && distance < run_options.separation_radius {
                res += (self.position - other.position).normalized() / distance;
                count += 1;
            }
        }

        if count > 0 {
            steer(res / count as f32, run_options.max_force)
        } else {
            V::ZERO
        }
    }

    /// Steer along the average heading of the neighbours.
    pub fn alignment(&self, others: &[&Boid<V>], run_options: &RunOptions<V>) -> V {
        let mut avg = V::ZERO;
        let mut count = 0;

        for other in others {
            let distance = self.position.distance_to(other.position);
            if distance > 0. && distance < run_options.alignment_radius {
                avg += other.velocity;
                count += 1;
            }
        }

        if count > 0 {
            steer(avg / count as f32, run_options.max_force)
        } else {
            V::ZERO
        }
    }

    /// Steer towards the center of mass of the neighbours.
    pub fn cohesion(&self, others: &[&Boid<V>], run_options: &RunOptions<V>) -> V {
        let mut center = V::ZERO;
        let mut count = 0;

        for other in others {
            let distance = self.position.distance_to(other.position);
            if distance > 0. && distance < run_options.cohesion_radius {
                center += other.position;
                count += 1;
            }
        }

        // no neighbours, no center of mass
        if count == 0 {
            return V::ZERO;
        }

        center = center / count as f32;
        steer(center - self.position, run_options.max_force)
    }

    /// Pull towards the shared target regardless of distance, a negative
    /// weight turns the target into a predator.
    pub fn seek(&self, run_options: &RunOptions<V>) -> V {
        match run_options.target {
            Some(target) if run_options.target_weight != 0 => {
                (target - self.position)
                    * run_options.target_factor
                    * run_options.target_weight as f32
            }
            _ => V::ZERO,
        }
    }

    /// Fixed push back inside, per axis, when within the margin of an edge.
    /// Only active with [`Boundary::Contain`].
    pub fn containment(&self, run_options: &RunOptions<V>) -> V {
        let (margin, force) = match run_options.boundary {
            Boundary::Contain { margin, force } => (margin, force),
            Boundary::Wrap => return V::ZERO,
        };

        let mut res = V::ZERO;
        for axis in 0..V::DIM {
            let coordinate = self.position.axis(axis);
            if coordinate < run_options.bounds.min.axis(axis) + margin {
                res.set_axis(axis, force);
            } else if coordinate > run_options.bounds.max.axis(axis) - margin {
                res.set_axis(axis, -force);
            }
        }
        res
    }

    pub fn apply_force(&mut self, force: V) {
        self.acceleration += force;
    }

    /// Integrates one tick: velocity from acceleration, hard speed cap,
    /// position from velocity, then the boundary policy. Clears the
    /// acceleration.
    pub fn tick(&mut self, dt: f32, run_options: &RunOptions<V>) {
        let dt = effective_dt(dt);

        self.velocity += self.acceleration * dt;

        if self.velocity.magnitude() > run_options.max_speed {
            self.velocity = self.velocity.normalized() * run_options.max_speed;
        }

        self.position += self.velocity * dt;

        self.acceleration = V::ZERO;

        self.boundaries(run_options)
    }

    fn boundaries(&mut self, run_options: &RunOptions<V>) {
        match run_options.boundary {
            Boundary::Wrap => {
                for axis in 0..V::DIM {
                    let min = run_options.bounds.min.axis(axis);
                    let max = run_options.bounds.max.axis(axis);
                    let coordinate = self.position.axis(axis);

                    if coordinate < min {
                        self.position.set_axis(axis, max);
                    } else if coordinate > max {
                        self.position.set_axis(axis, min);
                    }
                }
            }
            // handled as a steering behaviour
            Boundary::Contain { .. } => (),
        }
    }
}

/// Negative, NaN or infinite tick lengths are a zero length step.
#[inline]
pub(crate) fn effective_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0. {
        dt
    } else {
        0.
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{Vec2, Vec3};
    use rstest::rstest;

    use super::Boid;
    use crate::{
        math_helpers::SimVector,
        options::{Boundary, RunOptions},
    };

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-4_f32)
        };
    }

    fn still(x: f32, y: f32) -> Boid<Vec2> {
        Boid::new(Vec2::new(x, y), Vec2::ZERO)
    }

    #[test]
    fn lonely_boid_has_no_flocking_steering() {
        let run_options = RunOptions::<Vec2>::default();
        let boid = still(100., 100.);
        let far = still(500., 500.);
        let others = vec![&boid, &far];

        assert_eq!(boid.separation(&others, &run_options), Vec2::ZERO);
        assert_eq!(boid.alignment(&others, &run_options), Vec2::ZERO);
        assert_eq!(boid.cohesion(&others, &run_options), Vec2::ZERO);
    }

    #[test]
    fn coincident_boids_are_not_neighbours() {
        let run_options = RunOptions::<Vec2>::default();
        let boid = still(100., 100.);
        let twin = Boid::new(Vec2::new(100., 100.), Vec2::new(1., 0.));
        let others = vec![&twin];

        let steering = boid.run_rules(&others, &run_options);

        assert_eq!(steering.separation, Vec2::ZERO);
        assert_eq!(steering.alignment, Vec2::ZERO);
        assert_eq!(steering.cohesion, Vec2::ZERO);
    }

    #[test]
    fn separation_points_away_with_max_force() {
        let run_options = RunOptions::<Vec2>::default();
        let boid = still(100., 100.);
        let left = still(95., 100.);
        let others = vec![&left];

        let res = boid.separation(&others, &run_options);

        assert_eqf32!(res.x, run_options.max_force);
        assert_eqf32!(res.y, 0.);
    }

    #[test]
    fn separation_weighs_closer_neighbours_more() {
        let run_options = RunOptions::<Vec2>::default();
        let boid = still(100., 100.);
        let close_left = still(98., 100.);
        let far_below = still(100., 80.);
        let others = vec![&close_left, &far_below];

        let res = boid.separation(&others, &run_options);

        // 1/2 to the right beats 1/20 upwards
        assert!(res.x > res.y && res.y > 0.);
        assert_eqf32!(res.length(), run_options.max_force);
    }

    #[test]
    fn alignment_follows_average_heading() {
        let run_options = RunOptions::<Vec2>::default();
        let boid = still(100., 100.);
        let a = Boid::new(Vec2::new(110., 100.), Vec2::new(0., 3.));
        let b = Boid::new(Vec2::new(90., 100.), Vec2::new(0., 1.));
        let others = vec![&a, &b];

        let res = boid.alignment(&others, &run_options);

        assert_eqf32!(res.x, 0.);
        assert_eqf32!(res.y, run_options.max_force);
    }

    #[test]
    fn cohesion_points_to_center_of_mass() {
        let run_options = RunOptions::<Vec2>::default();
        let boid = still(100., 100.);
        let a = still(130., 110.);
        let b = still(130., 90.);
        let others = vec![&a, &b];

        let res = boid.cohesion(&others, &run_options);

        assert_eqf32!(res.x, run_options.max_force);
        assert_eqf32!(res.y, 0.);
    }

    #[rstest]
    #[case(1, Vec2::new(2., 1.))]
    #[case(-1, Vec2::new(-2., -1.))]
    #[case(0, Vec2::ZERO)]
    fn seek_follows_signed_weight(#[case] weight: i32, #[case] expected: Vec2) {
        let mut run_options = RunOptions::<Vec2>::default();
        run_options.target = Some(Vec2::new(300., 200.));
        run_options.target_weight = weight;
        let boid = still(100., 100.);

        let res = boid.seek(&run_options);

        assert_eqf32!(res.x, expected.x);
        assert_eqf32!(res.y, expected.y);
    }

    #[test]
    fn containment_pushes_back_per_axis() {
        let run_options = RunOptions::<Vec3>::default();
        // below x min, inside on y, above z max
        let boid = Boid::new(Vec3::new(-300., 0., 710.), Vec3::ZERO);

        let res = boid.containment(&run_options);

        assert_eq!(res, Vec3::new(3., 0., -3.));
    }

    #[test]
    fn containment_respects_margin() {
        let mut run_options = RunOptions::<Vec2>::default();
        run_options.boundary = Boundary::Contain {
            margin: 20.,
            force: 0.5,
        };

        assert_eq!(
            still(10., 400.).containment(&run_options),
            Vec2::new(0.5, 0.)
        );
        assert_eq!(still(600., 400.).containment(&run_options), Vec2::ZERO);

        run_options.boundary = Boundary::Wrap;
        assert_eq!(still(10., 400.).containment(&run_options), Vec2::ZERO);
    }

    #[test]
    fn tick_clamps_speed() {
        let run_options = RunOptions::<Vec2>::default();
        let mut boid = Boid::new(Vec2::new(100., 100.), Vec2::new(4., 0.));
        boid.apply_force(Vec2::new(1000., 1000.));

        boid.tick(1., &run_options);

        assert!(boid.velocity.length() <= run_options.max_speed + 1e-4);
        assert_eq!(boid.acceleration(), Vec2::ZERO);
    }

    #[test]
    fn tick_clamps_huge_finite_speed() {
        let run_options = RunOptions::<Vec2>::default();
        let mut boid = Boid::new(Vec2::new(100., 100.), Vec2::new(3e38, 0.));

        boid.tick(0.016, &run_options);

        assert_eqf32!(boid.velocity.x, run_options.max_speed);
        assert_eqf32!(boid.velocity.y, 0.);
    }

    #[test]
    fn tick_integrates_with_dt() {
        let mut run_options = RunOptions::<Vec2>::default();
        run_options.max_speed = 10.;
        let mut boid = Boid::new(Vec2::new(100., 100.), Vec2::new(1., 0.));
        boid.apply_force(Vec2::new(0., 10.));

        boid.tick(0.5, &run_options);

        assert_eqf32!(boid.velocity.y, 5.);
        assert_eqf32!(boid.position.x, 100.5);
        assert_eqf32!(boid.position.y, 102.5);
    }

    #[rstest]
    #[case(0.)]
    #[case(-1.)]
    #[case(f32::NAN)]
    fn degenerate_dt_does_not_move(#[case] dt: f32) {
        let run_options = RunOptions::<Vec2>::default();
        let mut boid = Boid::new(Vec2::new(100., 100.), Vec2::new(2., 2.));
        boid.apply_force(Vec2::new(3., 3.));

        boid.tick(dt, &run_options);

        assert_eq!(boid.position, Vec2::new(100., 100.));
        assert_eq!(boid.velocity, Vec2::new(2., 2.));
        assert_eq!(boid.acceleration(), Vec2::ZERO);
    }

    #[rstest]
    #[case(Vec2::new(-0.001, 300.), Vec2::new(-1., 0.), 800.)]
    #[case(Vec2::new(-0.001, 300.), Vec2::ZERO, 800.)]
    #[case(Vec2::new(800.5, 300.), Vec2::ZERO, 0.)]
    fn wrap_teleports_to_opposite_edge(
        #[case] position: Vec2,
        #[case] velocity: Vec2,
        #[case] expected_x: f32,
    ) {
        let mut run_options = RunOptions::<Vec2>::default();
        run_options.bounds.max = Vec2::new(800., 600.);
        let mut boid = Boid::new(position, velocity);

        boid.tick(1., &run_options);

        assert_eq!(boid.position.x, expected_x);
        assert_eq!(boid.position.y, 300.);
    }

    #[test]
    fn contain_never_teleports() {
        let run_options = RunOptions::<Vec3>::default();
        let mut boid = Boid::new(Vec3::new(260., 0., 300.), Vec3::new(1., 0., 0.));

        boid.tick(1., &run_options);

        assert_eqf32!(boid.position.x, 261.);
    }

    #[test]
    fn random_boid_respects_options() {
        use rand::SeedableRng;
        use rand_xoshiro::Xoshiro256PlusPlus;

        let run_options = RunOptions::<Vec2>::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);

        for _ in 0..500 {
            let boid = Boid::random(&mut rng, &run_options);
            let speed = boid.velocity.magnitude();

            assert!(speed >= run_options.min_init_speed - 1e-4);
            assert!(speed <= run_options.max_init_speed + 1e-4);
            assert!(boid.position.cmpge(run_options.bounds.min).all());
            assert!(boid.position.cmple(run_options.bounds.max).all());
        }
    }
}
