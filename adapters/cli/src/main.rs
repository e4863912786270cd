#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives food web simulation runs.

mod report;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use food_web_catalog::{Ecosystem, EcosystemCatalog};
use food_web_core::{
    EcosystemId, Event, InvaderRequest, OrganismId, SimulationConfig, MAX_INVADER_POPULATION,
    MAX_RUN_TICKS, MIN_INVADER_POPULATION, MIN_RUN_TICKS,
};
use food_web_world::Session;
use tracing::{info, warn};

use crate::report::Report;

/// Slowest accepted speed multiplier, two seconds between ticks.
const MIN_SPEED: f64 = 0.5;

/// Fastest accepted speed multiplier, 200 milliseconds between ticks.
const MAX_SPEED: f64 = 5.0;

/// Output format of the final report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Aligned plain-text tables.
    Table,
    /// A single JSON document.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "food-web",
    version,
    about = "Simulate population dynamics across a food web"
)]
struct Cli {
    /// Identifier of the ecosystem to simulate.
    #[arg(long, default_value = "ocean")]
    ecosystem: String,

    /// Species to include; defaults to the ecosystem's default selection.
    #[arg(long, value_delimiter = ',')]
    species: Vec<String>,

    /// Number of ticks to simulate.
    #[arg(
        long,
        default_value_t = 50,
        value_parser = clap::value_parser!(u32)
            .range(i64::from(MIN_RUN_TICKS)..=i64::from(MAX_RUN_TICKS))
    )]
    ticks: u32,

    /// Organism introduced as an invasive species halfway through the run.
    #[arg(long)]
    invader: Option<String>,

    /// Population the invader enters with.
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u32)
            .range(i64::from(MIN_INVADER_POPULATION)..=i64::from(MAX_INVADER_POPULATION))
    )]
    invader_population: u32,

    /// Speed multiplier between 0.5 and 5; waits 1000/speed milliseconds between ticks.
    #[arg(long, value_parser = parse_speed)]
    speed: Option<f64>,

    /// TOML file overriding the simulation parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TOML file describing additional ecosystems.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Format of the final report.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// List the available ecosystems and exit.
    #[arg(long)]
    list: bool,
}

/// Entry point for the food web command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let catalog = load_catalog(cli.catalog.as_deref())?;
    if cli.list {
        let mut stdout = std::io::stdout().lock();
        report::write_catalog(&catalog, &mut stdout).context("failed to write catalog listing")?;
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let ecosystem = catalog
        .get(&EcosystemId::new(cli.ecosystem.as_str()))
        .context("failed to select ecosystem")?;
    let selection = selection(ecosystem, &cli.species);
    let invader = cli.invader.as_deref().map(|id| {
        InvaderRequest::new(id).with_start_population(f64::from(cli.invader_population))
    });
    if let Some(request) = &invader {
        if ecosystem.organism(request.organism()).is_none() {
            warn!(invader = %request.organism(), "invader is not part of the ecosystem");
        }
    }

    let mut session = Session::new(ecosystem.clone(), cli.ticks)
        .with_selection(selection)
        .with_invader(invader)
        .with_config(config);
    run(&mut session, cli.speed)?;

    let report = Report::from_session(&session).context("run produced no state")?;
    let mut stdout = std::io::stdout().lock();
    match cli.format {
        Format::Table => report
            .write_table(&mut stdout)
            .context("failed to write report")?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut stdout, &report)
                .context("failed to serialize report")?;
            writeln!(stdout).context("failed to write report")?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_speed(value: &str) -> Result<f64, String> {
    let speed: f64 = value
        .parse()
        .map_err(|error| format!("`{value}` is not a number: {error}"))?;
    if (MIN_SPEED..=MAX_SPEED).contains(&speed) {
        Ok(speed)
    } else {
        Err(format!("speed must lie between {MIN_SPEED} and {MAX_SPEED}, got {value}"))
    }
}

fn tick_delay(speed: Option<f64>) -> Result<Option<Duration>> {
    speed
        .map(|speed| {
            Duration::try_from_secs_f64(1.0 / speed)
                .with_context(|| format!("speed {speed} does not map to a tick delay"))
        })
        .transpose()
}

fn load_catalog(path: Option<&Path>) -> Result<EcosystemCatalog> {
    let mut catalog = EcosystemCatalog::built_in();
    let Some(path) = path else {
        return Ok(catalog);
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let custom = EcosystemCatalog::from_toml_str(&contents)
        .with_context(|| format!("failed to load catalog {}", path.display()))?;
    for ecosystem in custom.iter() {
        info!(ecosystem = %ecosystem.id(), "registered custom ecosystem");
        catalog.insert(ecosystem.clone());
    }
    Ok(catalog)
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    SimulationConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn selection(ecosystem: &Ecosystem, species: &[String]) -> Vec<OrganismId> {
    if species.is_empty() {
        return ecosystem.default_species().to_vec();
    }
    species
        .iter()
        .map(|id| OrganismId::new(id.trim()))
        .inspect(|id| {
            if ecosystem.organism(id).is_none() {
                warn!(species = %id, ecosystem = %ecosystem.id(), "ignoring unknown species");
            }
        })
        .collect()
}

fn run(session: &mut Session, speed: Option<f64>) -> Result<()> {
    let delay = tick_delay(speed)?;
    let mut events = Vec::new();
    session.reset();
    info!(
        ecosystem = %session.ecosystem().id(),
        ticks = session.total_ticks(),
        "starting run"
    );

    while !session.is_complete() {
        session
            .advance(&mut events)
            .with_context(|| format!("failed to step tick {}", session.current_tick()))?;
        for event in events.drain(..) {
            if let Event::InvaderIntroduced {
                organism,
                population,
                tick,
            } = event
            {
                info!(invader = %organism, population, tick, "invader entered the ecosystem");
            }
        }
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
    }
    Ok(())
}
