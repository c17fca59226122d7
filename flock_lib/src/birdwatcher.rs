use std::{io::Write, mem};

use serde::Serialize;

use crate::{flock::Flock, math_helpers::SimVector};

/// One sampled observation of one boid. `z` and `vz` stay empty for planar
/// flocks.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BoidData {
    pub id: usize,
    pub time: u64,
    pub x: f32,
    pub y: f32,
    pub z: Option<f32>,
    pub vx: f32,
    pub vy: f32,
    pub vz: Option<f32>,
    pub n_neighbours: usize,
}

// more of a bird data accumulator than a birdwatcher, it is handed the flock
// on every tick instead of holding on to it
pub struct Birdwatcher {
    locations: Vec<BoidData>,
    render_ticker: u64,
    sample_rate: u64,
}

impl Birdwatcher {
    /// Samples every `sample_rate`-th call of [`Birdwatcher::watch`], a rate
    /// of 0 samples every call.
    pub fn new(sample_rate: u64) -> Self {
        Birdwatcher {
            locations: Vec::new(),
            render_ticker: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Triggers data collection
    pub fn watch<V: SimVector>(&mut self, flock: &Flock<V>) {
        if !self.should_sample() {
            return;
        }

        let time = self.render_ticker / self.sample_rate;
        let spatial = V::DIM > 2;

        self.locations.extend(flock.view().map(|(id, b, m)| BoidData {
            id,
            time,
            x: b.position.axis(0),
            y: b.position.axis(1),
            z: spatial.then(|| b.position.axis(2)),
            vx: b.velocity.axis(0),
            vy: b.velocity.axis(1),
            vz: spatial.then(|| b.velocity.axis(2)),
            n_neighbours: m.n_neighbours,
        }));
    }

    pub fn restart(&mut self) {
        self.locations.clear();
        self.render_ticker = 0;
    }

    pub fn pop_data(&mut self) -> Vec<BoidData> {
        mem::take(&mut self.locations)
    }

    fn should_sample(&mut self) -> bool {
        self.render_ticker += 1;

        self.render_ticker % self.sample_rate == 0
    }
}

/// Writes observations as CSV with a header row.
pub fn write_csv<W: Write>(data: &[BoidData], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    for b in data {
        wtr.serialize(b)?;
    }
    wtr.flush()?;

    Ok(())
}
