use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    boid::{effective_dt, Boid, Steering},
    error::ConfigError,
    math_helpers::SimVector,
    options::RunOptions,
    snapshot::BoidState,
    wing::WingBeat,
};

/// What the flock remembers about a boid from the last update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoidMetadata<V> {
    pub steering: Steering<V>,
    /// weighted sum of [`BoidMetadata::steering`], the force that was applied
    pub acceleration_update: V,
    pub n_neighbours: usize,
    pub previous_position: V,
    /// velocity times the effective tick length, not affected by wrapping
    pub displacement: V,
    pub wing: WingBeat,
}

/// A fixed population of boids and the options driving them.
///
/// Updates run in two passes: every boid's steering is computed against the
/// unmodified flock first, only then are all boids moved. The order of the
/// boids is the order they were created or handed in and never changes.
#[derive(Debug, Clone)]
pub struct Flock<V> {
    boids: Vec<Boid<V>>,
    metadata: Vec<BoidMetadata<V>>,
    run_options: RunOptions<V>,
}

impl<V: SimVector> Flock<V> {
    /// Validates `run_options` and places `init_boids` random boids.
    pub fn new<R: Rng + ?Sized>(run_options: RunOptions<V>, rng: &mut R) -> Result<Self, ConfigError> {
        run_options.validate()?;

        let (boids, metadata) = get_boids(&run_options, rng);
        debug!(
            "created a flock of {} boids in {}D",
            boids.len(),
            V::DIM
        );

        Ok(Flock {
            boids,
            metadata,
            run_options,
        })
    }

    /// Same as [`Flock::new`], reproducible from `seed`.
    pub fn seeded(run_options: RunOptions<V>, seed: u64) -> Result<Self, ConfigError> {
        Flock::new(run_options, &mut Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    /// A flock of exactly the given boids, `init_boids` is taken from their
    /// count.
    pub fn from_boids(boids: Vec<Boid<V>>, run_options: RunOptions<V>) -> Result<Self, ConfigError> {
        let run_options = RunOptions {
            init_boids: boids.len(),
            ..run_options
        };
        run_options.validate()?;

        let metadata = boids
            .iter()
            .map(|b| BoidMetadata {
                previous_position: b.position,
                ..Default::default()
            })
            .collect();

        Ok(Flock {
            boids,
            metadata,
            run_options,
        })
    }

    /// Advances every boid by `dt`. A negative or non-finite `dt` is a zero
    /// length tick: forces are still evaluated, nothing moves.
    pub fn update(&mut self, dt: f32) {
        let run_options = &self.run_options;
        let boids = &self.boids;
        let max_sensory_distance = run_options.max_sensory_distance();

        // calculation pass, reads the pre-tick state only
        #[cfg(feature = "parallel")]
        let steerings: Vec<(Steering<V>, usize)> = boids
            .par_iter()
            .map_init(Vec::new, |neighbours, boid| {
                neighbours.clear();
                get_neighbours(boid, boids, max_sensory_distance, neighbours);
                (boid.run_rules(neighbours, run_options), neighbours.len())
            })
            .collect();

        #[cfg(not(feature = "parallel"))]
        let steerings: Vec<(Steering<V>, usize)> = {
            let mut neighbours: Vec<&Boid<V>> = Vec::new();
            boids
                .iter()
                .map(|boid| {
                    neighbours.clear();
                    get_neighbours(boid, boids, max_sensory_distance, &mut neighbours);
                    (boid.run_rules(&neighbours, run_options), neighbours.len())
                })
                .collect()
        };

        // update pass
        let dt_effective = effective_dt(dt);
        for ((boid, metadata), (steering, n_neighbours)) in self
            .boids
            .iter_mut()
            .zip(self.metadata.iter_mut())
            .zip(steerings)
        {
            let acceleration_update = steering.total(&self.run_options);
            boid.apply_force(acceleration_update);

            metadata.steering = steering;
            metadata.acceleration_update = acceleration_update;
            metadata.n_neighbours = n_neighbours;
            metadata.previous_position = boid.position;

            boid.tick(dt, &self.run_options);

            metadata.displacement = boid.velocity * dt_effective;
            if dt_effective > 0. {
                metadata.wing.advance();
            }
        }

        trace!("flock of {} updated, dt {}", self.boids.len(), dt);
    }

    /// Position and velocity of every boid, in flock order.
    pub fn snapshot(&self) -> Vec<BoidState<V>> {
        self.boids.iter().map(BoidState::from).collect()
    }

    pub fn boids(&self) -> &[Boid<V>] {
        &self.boids
    }

    pub fn metadata(&self) -> &[BoidMetadata<V>] {
        &self.metadata
    }

    /// Boids together with their metadata, with the id being the flock index.
    pub fn view(&self) -> impl Iterator<Item = (usize, &Boid<V>, &BoidMetadata<V>)> + '_ {
        self.boids
            .iter()
            .zip(self.metadata.iter())
            .enumerate()
            .map(|(id, (b, m))| (id, b, m))
    }

    pub fn run_options(&self) -> &RunOptions<V> {
        &self.run_options
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    /// Swaps in new options, the population is fixed for the lifetime of the
    /// flock.
    pub fn reconfigure(&mut self, run_options: RunOptions<V>) -> Result<(), ConfigError> {
        if run_options.init_boids != self.boids.len() {
            return Err(ConfigError::PopulationChanged {
                expected: self.boids.len(),
                requested: run_options.init_boids,
            });
        }
        run_options.validate()?;

        debug!("flock reconfigured: {:?}", run_options);
        self.run_options = run_options;
        Ok(())
    }

    pub fn set_target(&mut self, target: Option<V>) -> Result<(), ConfigError> {
        let run_options = RunOptions {
            target,
            ..self.run_options.clone()
        };
        self.reconfigure(run_options)
    }

    /// Off, bait, predator, off again. Returns the new weight.
    pub fn cycle_target_weight(&mut self) -> i32 {
        self.run_options.target_weight = match self.run_options.target_weight {
            0 => 1,
            1 => -1,
            _ => 0,
        };
        debug!("target weight set to {}", self.run_options.target_weight);
        self.run_options.target_weight
    }

    /// Flips the sign of the cohesion weight, the flock flies apart (or back
    /// together).
    pub fn scatter(&mut self) {
        self.run_options.cohesion_weight = -self.run_options.cohesion_weight;
        debug!("cohesion weight set to {}", self.run_options.cohesion_weight);
    }

    /// Throws the current boids away and places a new random population with
    /// the current options.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (boids, metadata) = get_boids(&self.run_options, rng);
        self.boids = boids;
        self.metadata = metadata;
    }
}

fn get_boids<V: SimVector, R: Rng + ?Sized>(
    run_options: &RunOptions<V>,
    rng: &mut R,
) -> (Vec<Boid<V>>, Vec<BoidMetadata<V>>) {
    (0..run_options.init_boids)
        .map(|_| {
            let boid = Boid::random(rng, run_options);
            let metadata = BoidMetadata {
                previous_position: boid.position,
                wing: WingBeat::random(rng),
                ..Default::default()
            };
            (boid, metadata)
        })
        .unzip()
}

/// Brute force scan of the whole flock, a boid is never its own neighbour and
/// neither is anything sharing its exact position.
pub fn get_neighbours<'a, V: SimVector>(
    boid: &Boid<V>,
    all_boids: &'a [Boid<V>],
    max_sensory_distance: f32,
    neighbours: &mut Vec<&'a Boid<V>>,
) {
    for b_other in all_boids.iter() {
        let distance = boid.position.distance_to(b_other.position);
        if distance > 0. && distance < max_sensory_distance {
            neighbours.push(b_other);
        }
    }
}
