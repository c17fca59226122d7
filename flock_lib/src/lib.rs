use birdwatcher::{Birdwatcher, BoidData};
use error::ConfigError;
use flock::Flock;
use math_helpers::SimVector;
use options::RunOptions;

pub mod boid;
pub mod flock;

pub mod birdwatcher;
pub mod error;
pub mod math_helpers;
pub mod options;
pub mod orientation;
pub mod snapshot;
pub mod wing;

/// Runs a seeded flock for `no_iter` ticks of `run_options.dt` and returns what
/// the birdwatcher saw.
pub fn flock_base<V: SimVector>(
    no_iter: u64,
    sample_rate: u64,
    run_options: RunOptions<V>,
    seed: u64,
) -> Result<Vec<BoidData>, ConfigError> {
    let dt = run_options.dt;
    let mut flock = Flock::seeded(run_options, seed)?;

    Ok(watch_flock(&mut flock, no_iter, dt, sample_rate))
}

/// Advances `flock` by `no_iter` ticks of `dt`, sampling every
/// `sample_rate`-th one. The flock is left in its final state.
pub fn watch_flock<V: SimVector>(
    flock: &mut Flock<V>,
    no_iter: u64,
    dt: f32,
    sample_rate: u64,
) -> Vec<BoidData> {
    let mut bird_watcher = Birdwatcher::new(sample_rate);

    (0..no_iter).for_each(|_| {
        flock.update(dt);
        bird_watcher.watch(&*flock);
    });

    bird_watcher.pop_data()
}
