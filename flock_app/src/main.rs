use std::{fs::File, io::BufReader, path::Path};

use anyhow::{bail, Context, Result};
use clap_serde_derive::{clap::Parser, ClapSerde};
use flock_lib::{flock::Flock, math_helpers::SimVector};
use glam::{Vec2, Vec3};
use log::info;

mod cliargs;
mod headless;
mod server;

use cliargs::{Args, Config, Mode};
use server::BoidServer;

fn main() -> Result<()> {
    // Parse whole args with clap
    let mut args = Args::parse();

    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    // defaults < config file < command line
    let config = match load_config_file(&args.config_path)? {
        Some(file_config) => Config::from(file_config).merge(&mut args.config),
        None => Config::from(&mut args.config),
    };

    match config.dimensions {
        2 => run::<Vec2>(&args, &config),
        3 => run::<Vec3>(&args, &config),
        other => bail!("Only 2 or 3 dimensions are supported, got {}", other),
    }
}

fn load_config_file(path: &Path) -> Result<Option<<Config as ClapSerde>::Opt>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            info!("No config read from {}: {}, using defaults", path.display(), e);
            return Ok(None);
        }
    };

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let config = if is_yaml {
        serde_yaml::from_reader::<_, <Config as ClapSerde>::Opt>(BufReader::new(file))
            .with_context(|| format!("Error in configuration file {}", path.display()))?
    } else {
        let content = std::io::read_to_string(file)?;
        toml::from_str::<<Config as ClapSerde>::Opt>(&content)
            .with_context(|| format!("Error in configuration file {}", path.display()))?
    };

    info!("Configuration read from {}", path.display());
    Ok(Some(config))
}

fn run<V: SimVector>(args: &Args, config: &Config) -> Result<()> {
    let run_options = config.run_options::<V>();

    let flock = match config.seed {
        0 => Flock::new(run_options, &mut rand::thread_rng()),
        seed => Flock::seeded(run_options, seed),
    }
    .context("Invalid simulation parameters")?;

    match args.mode {
        Mode::Serve => {
            BoidServer::new(flock, config.dt, config.index_path.clone().into()).serve(&config.bind)
        }
        Mode::Run => headless::run(
            flock,
            args.iterations,
            config.sample_rate,
            args.format,
            args.output.as_deref(),
        ),
    }
}
