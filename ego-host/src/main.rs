//! ego host runner
//!
//! Runs one of the robot controllers on a desktop machine: simulated LEDs,
//! servos, range sensor and screen, the real UDP broadcast bus, and console
//! commands in place of buttons and joystick.
//!
//! ```text
//! ego-host run --config ego.toml [--record run.ego]
//! ego-host replay run.ego
//! ego-host check --config ego.toml
//! ```
//!
//! Log filtering follows the `EGO_LOG` environment variable
//! (`EGO_LOG=debug`, `EGO_LOG=info,sim::servo=warn`, ...).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use embassy_executor::{Executor, Spawner, SpawnToken};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod channels;
mod config;
mod device;
mod keyboard;
mod replay;
mod sim;
mod tasks;
mod transport;

use crate::config::HostConfig;
use crate::replay::{Recorder, Recording};
use crate::tasks::DeviceRunner;
use crate::transport::UdpBus;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run ego robot controllers on a desktop host")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the configured device in real time
    Run {
        #[arg(long, short, default_value = "ego.toml", value_name = "FILE")]
        config: PathBuf,
        /// Store every tick's inputs for later replay
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,
    },
    /// Re-run a recording offline and print the outputs
    Replay {
        file: PathBuf,
        /// Print ticks without outputs too
        #[arg(long)]
        all: bool,
    },
    /// Validate a configuration file
    Check {
        #[arg(long, short, default_value = "ego.toml", value_name = "FILE")]
        config: PathBuf,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("EGO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Cmd::Run { config, record } => run(&config, record.as_deref()),
        Cmd::Replay { file, all } => replay(&file, all),
        Cmd::Check { config } => check(&config),
    }
}

fn load(path: &Path) -> anyhow::Result<HostConfig> {
    HostConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

fn must_spawn<S>(spawner: &Spawner, name: &str, token: SpawnToken<S>) {
    if let Err(err) = spawner.spawn(token) {
        error!(?err, "cannot spawn {name}");
        std::process::exit(1);
    }
}

fn run(config_path: &Path, record: Option<&Path>) -> anyhow::Result<()> {
    let config = load(config_path)?;
    info!(device = ?config.device, tick_ms = config.tick_ms, "starting");

    let bus = UdpBus::bind(&config.network)?;
    let recorder = record
        .map(|path| {
            Recorder::create(path, &config)
                .with_context(|| format!("creating recording {}", path.display()))
        })
        .transpose()?;
    keyboard::spawn_reader().context("starting console reader")?;

    let period_ms = config.tick_ms;
    let runner = DeviceRunner::new(config, bus, recorder);

    // the executor runs until the process exits
    let executor: &'static mut Executor = Box::leak(Box::new(Executor::new()));
    executor.run(move |spawner| {
        must_spawn(&spawner, "tick task", tasks::tick_task(period_ms));
        must_spawn(&spawner, "device task", tasks::device_task(runner));
    })
}

fn replay(file: &Path, all: bool) -> anyhow::Result<()> {
    let recording =
        Recording::load(file).with_context(|| format!("reading recording {}", file.display()))?;
    info!(
        device = ?recording.config.device,
        ticks = recording.samples.len(),
        "replaying"
    );

    let outputs = recording.replay();
    let mut published = 0;
    for (tick, out) in outputs.iter().enumerate() {
        published += out.publishes().len();
        if all || !out.is_empty() {
            println!("{:>6} {:?}", tick + 1, out);
        }
    }
    println!("{} ticks, {} datagrams published", outputs.len(), published);
    Ok(())
}

fn check(path: &Path) -> anyhow::Result<()> {
    let config = load(path)?;
    println!(
        "{}: ok ({:?}, {} ms ticks, port {})",
        path.display(),
        config.device,
        config.tick_ms,
        config.network.port
    );
    Ok(())
}
