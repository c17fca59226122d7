use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use flock_lib::{
    birdwatcher::{self, BoidData},
    flock::Flock,
    math_helpers::SimVector,
    snapshot, watch_flock,
};
use log::info;

use crate::cliargs::Format;

/// Observations as CSV, or the final state of the flock as JSON.
pub fn dump<V: SimVector, W: Write>(
    flock: &Flock<V>,
    data: &[BoidData],
    format: Format,
    mut writer: W,
) -> anyhow::Result<()> {
    match format {
        Format::Csv => birdwatcher::write_csv(data, writer).context("Can't write data points")?,
        Format::Json => {
            let json = snapshot::to_json(&flock.snapshot())?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
    }
    Ok(())
}

pub fn run<V: SimVector>(
    mut flock: Flock<V>,
    iterations: u64,
    sample_rate: u64,
    format: Format,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let dt = flock.run_options().dt;
    let data = watch_flock(&mut flock, iterations, dt, sample_rate);
    info!(
        "simulated {} ticks of {} boids, {} data points",
        iterations,
        flock.len(),
        data.len()
    );

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Can't open {}", path.display()))?;
            dump(&flock, &data, format, BufWriter::new(file))
        }
        None => dump(&flock, &data, format, io::stdout().lock()),
    }
}

#[cfg(test)]
mod tests {
    use flock_lib::{flock::Flock, options::RunOptions, watch_flock};
    use glam::{Vec2, Vec3};

    use super::dump;
    use crate::cliargs::Format;

    #[test]
    fn csv_dump_has_a_row_per_sample() {
        let mut flock = Flock::seeded(RunOptions::<Vec2>::default(), 4).unwrap();
        let data = watch_flock(&mut flock, 8, 0.016, 4);

        let mut out = Vec::new();
        dump(&flock, &data, Format::Csv, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 1 + 2 * 30);
        assert!(out.starts_with("id,time,x,y,z,vx,vy,vz,n_neighbours\n"));
    }

    #[test]
    fn json_dump_is_the_final_snapshot() {
        let mut flock = Flock::seeded(RunOptions::<Vec3>::default(), 4).unwrap();
        let data = watch_flock(&mut flock, 3, 1., 1);

        let mut out = Vec::new();
        dump(&flock, &data, Format::Json, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let boids = value["boids"].as_array().unwrap();
        assert_eq!(boids.len(), 300);
        assert!(boids[0].get("vz").is_some());
    }
}
