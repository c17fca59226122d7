use clap_serde_derive::{
    clap::{self, Parser, ValueEnum},
    serde::{Deserialize, Serialize},
    ClapSerde,
};
use flock_lib::{
    math_helpers::SimVector,
    options::{Boundary, Bounds, RunOptions},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Boids (Reynolds '86) flocking simulation, served over HTTP or run headless.
pub struct Args {
    /// Config file, `.toml` or `.yaml`
    #[arg(short, long = "config", default_value = "config.toml")]
    pub config_path: std::path::PathBuf,

    #[arg(value_enum, default_value_t = Mode::Serve)]
    pub mode: Mode,

    /// ticks to simulate in `run` mode
    #[arg(short, long, default_value_t = 1000)]
    pub iterations: u64,

    /// where `run` mode writes its data, stdout if not given
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum Mode {
    /// serve the flock over HTTP
    Serve,
    /// simulate a fixed number of ticks and dump the observations
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum Format {
    /// sampled observations
    Csv,
    /// final snapshot in the wire format
    Json,
}

/// Boundary policy as picked on the command line or in a config file.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// teleport to the opposite edge
    Wrap,
    /// steer back inside near the edges
    Contain,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the `-c` or `--config` arg option
pub struct Config {
    #[default(30)]
    #[arg(short = 'n', long)]
    /// number of boids
    pub no_boids: usize,

    #[default(2)]
    #[arg(long = "dim")]
    /// 2 for a planar flock, 3 for a spatial one
    pub dimensions: u8,

    #[default(0)]
    #[arg(long)]
    /// seed of the initial placement, 0 picks a random one
    pub seed: u64,

    #[default(1200.)]
    #[arg(short = 'x', long)]
    pub width: f32,
    #[default(800.)]
    #[arg(short = 'y', long)]
    pub height: f32,
    #[default(800.)]
    #[arg(short = 'z', long)]
    /// only used by spatial flocks
    pub depth: f32,

    #[default(25.)]
    #[arg(long = "sep_radius")]
    pub separation_radius: f32,
    #[default(50.)]
    #[arg(long = "ali_radius")]
    pub alignment_radius: f32,
    #[default(50.)]
    #[arg(long = "coh_radius")]
    pub cohesion_radius: f32,

    #[default(1.5)]
    #[arg(long = "sep_weight")]
    pub separation_weight: f32,
    #[default(1.0)]
    #[arg(long = "ali_weight")]
    pub alignment_weight: f32,
    #[default(1.0)]
    #[arg(long = "coh_weight")]
    pub cohesion_weight: f32,

    #[default(5.0)]
    #[arg(long = "max_speed")]
    pub max_speed: f32,
    #[default(0.2)]
    #[arg(long = "max_force")]
    pub max_force: f32,
    #[default(1.0)]
    #[arg(long = "min_init_speed")]
    pub min_init_speed: f32,
    #[default(3.0)]
    #[arg(long = "max_init_speed")]
    pub max_init_speed: f32,

    #[default(BoundaryKind::Wrap)]
    #[arg(long, value_enum)]
    pub boundary: BoundaryKind,
    #[default(20.)]
    #[arg(long = "contain_margin")]
    pub contain_margin: f32,
    #[default(3.)]
    #[arg(long = "contain_force")]
    pub contain_force: f32,

    #[default(0)]
    #[arg(long = "target_weight", allow_negative_numbers = true)]
    /// pull towards the center, 1 bait, -1 predator, 0 off
    pub target_weight: i32,
    #[default(0.01)]
    #[arg(long = "target_factor")]
    pub target_factor: f32,

    #[default(0.016)]
    #[arg(long)]
    /// tick length
    pub dt: f32,

    #[default(4)]
    #[arg(short = 'r', long)]
    /// ratio of ticks/sample_rate, e,g, 4 = sample every 4th tick
    pub sample_rate: u64,

    #[default("0.0.0.0:8080".to_string())]
    #[arg(long)]
    pub bind: String,
    #[default("index.html".to_string())]
    #[arg(long = "index")]
    /// page served on `GET /`, a built in page is served when missing
    pub index_path: String,
}

impl Config {
    /// Planar flocks live in screen space from the origin to
    /// (`width`, `height`), spatial flocks in a box centered on the origin.
    pub fn bounds<V: SimVector>(&self) -> Bounds<V> {
        let extent = [self.width, self.height, self.depth];
        let mut min = V::ZERO;
        let mut max = V::ZERO;

        for axis in 0..V::DIM {
            if V::DIM == 2 {
                max.set_axis(axis, extent[axis]);
            } else {
                min.set_axis(axis, -extent[axis] / 2.);
                max.set_axis(axis, extent[axis] / 2.);
            }
        }

        Bounds::new(min, max)
    }

    pub fn run_options<V: SimVector>(&self) -> RunOptions<V> {
        let bounds = self.bounds();

        RunOptions {
            init_boids: self.no_boids,
            bounds,
            boundary: match self.boundary {
                BoundaryKind::Contain => Boundary::Contain {
                    margin: self.contain_margin,
                    force: self.contain_force,
                },
                BoundaryKind::Wrap => Boundary::Wrap,
            },
            max_speed: self.max_speed,
            max_force: self.max_force,
            min_init_speed: self.min_init_speed,
            max_init_speed: self.max_init_speed,
            separation_radius: self.separation_radius,
            alignment_radius: self.alignment_radius,
            cohesion_radius: self.cohesion_radius,
            separation_weight: self.separation_weight,
            alignment_weight: self.alignment_weight,
            cohesion_weight: self.cohesion_weight,
            target: Some(bounds.center()),
            target_factor: self.target_factor,
            target_weight: self.target_weight,
            dt: self.dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap_serde_derive::{clap::Parser, ClapSerde};
    use flock_lib::options::{Boundary, RunOptions};
    use glam::{Vec2, Vec3};

    use super::{Args, Config, Format, Mode};

    #[test]
    fn defaults_match_the_planar_preset() {
        let config = Config::default();

        let expected = RunOptions {
            target: Some(Vec2::new(600., 400.)),
            ..RunOptions::default()
        };

        assert_eq!(config.run_options::<Vec2>(), expected);
    }

    #[test]
    fn spatial_bounds_are_centered() {
        let config = Config::default();

        let bounds = config.bounds::<Vec3>();

        assert_eq!(bounds.min, Vec3::new(-600., -400., -400.));
        assert_eq!(bounds.max, Vec3::new(600., 400., 400.));
        assert_eq!(config.run_options::<Vec3>().target, Some(Vec3::ZERO));
    }

    #[test]
    fn command_line_overrides_file() {
        let mut args = Args::parse_from([
            "flock_app",
            "run",
            "-n",
            "12",
            "--target_weight=-1",
            "-f",
            "json",
        ]);
        let file: <Config as ClapSerde>::Opt =
            toml::from_str("no_boids = 99\nmax_speed = 7.5\nboundary = \"contain\"\n").unwrap();

        let config = Config::from(file).merge(&mut args.config);

        assert_eq!(args.mode, Mode::Run);
        assert_eq!(args.format, Format::Json);
        assert_eq!(config.no_boids, 12);
        assert_eq!(config.max_speed, 7.5);
        assert_eq!(config.target_weight, -1);
        assert!(matches!(
            config.run_options::<Vec2>().boundary,
            Boundary::Contain { .. }
        ));
    }
}
