use anyhow::{bail, Context, Result};
use biosim_core::world::Histogram;
use biosim_core::{Placement, RunSummary, SimConfig, Simulation, Species};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAP: &str = "
    WWWWWWWWWWWWWWWWWWWWW
    WWWWWWWWHWWWWLLLLLLLW
    WHHHHHLLLLWWLLLLLLLWW
    WHHHHHHHHHWWLLLLLLWWW
    WHHHHHLLLLLLLLLLLLWWW
    WHHHHHLLLDDLLLHLLLWWW
    WHHLLLLLDDDLLLHHHHWWW
    WWHHHHLLLDDLLLHWWWWWW
    WHHHLLLLLDDLLLLLLLWWW
    WHHHHLLLLDDLLLLWWWWWW
    WWHHHHLLLLLLLLWWWWWWW
    WWWHHHHLLLLLLLWWWWWWW
    WWWWWWWWWWWWWWWWWWWWW";

/// Run the island simulation and write a JSON report.
#[derive(Parser, Debug)]
#[command(name = "biosim", version, about)]
struct Cli {
    /// Island map file (rows of W/D/H/L). Defaults to the built-in island.
    #[arg(long)]
    map: Option<PathBuf>,

    /// Initial population as JSON: `[{"loc": [row, col], "pop": [...]}]`.
    #[arg(long)]
    population: Option<PathBuf>,

    /// Simulation parameters as JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the seed from --config.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 200)]
    years: usize,

    #[arg(long, default_value_t = 1)]
    sample_every: usize,

    /// Population added after --introduce-after years.
    #[arg(long, requires = "introduce_after")]
    introduce: Option<PathBuf>,

    #[arg(long, requires = "introduce")]
    introduce_after: Option<usize>,

    /// Report destination; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct SpeciesHistograms {
    age: Histogram,
    weight: Histogram,
    fitness: Histogram,
}

#[derive(Serialize)]
struct Report {
    seed: u64,
    phases: Vec<RunSummary>,
    histograms: BTreeMap<String, SpeciesHistograms>,
    density: BTreeMap<String, Vec<Vec<usize>>>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn default_population() -> Vec<Placement> {
    let herbivores = vec![biosim_core::AnimalSpec::new(Species::Herbivore, 5, 20.0); 50];
    let carnivores = vec![biosim_core::AnimalSpec::new(Species::Carnivore, 5, 20.0); 20];
    vec![Placement {
        loc: (10, 8),
        pop: herbivores.into_iter().chain(carnivores).collect(),
    }]
}

fn histograms(sim: &Simulation, species: Species) -> SpeciesHistograms {
    let samples = sim.animal_samples(species);
    let ages: Vec<f64> = samples.ages.iter().map(|&a| a as f64).collect();
    SpeciesHistograms {
        age: Histogram::from_samples(&ages, 60.0, 2.0),
        weight: Histogram::from_samples(&samples.weights, 60.0, 2.0),
        fitness: Histogram::from_samples(&samples.fitness, 1.0, 0.05),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config: SimConfig = match &cli.config {
        Some(path) => read_json(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    let map = match &cli.map {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => DEFAULT_MAP.to_string(),
    };
    let population = match &cli.population {
        Some(path) => read_json(path)?,
        None => default_population(),
    };
    let later: Option<(usize, Vec<Placement>)> = match (cli.introduce_after, &cli.introduce) {
        (Some(after), Some(path)) => {
            if after > cli.years {
                bail!("--introduce-after ({after}) is past --years ({})", cli.years);
            }
            Some((after, read_json(path)?))
        }
        _ => None,
    };

    let mut sim = Simulation::with_population(&map, &population, config)
        .context("setting up the island")?;
    info!(
        seed,
        rows = sim.island().rows(),
        cols = sim.island().cols(),
        animals = sim.num_animals(),
        years = cli.years,
        "simulation ready"
    );

    let mut phases = Vec::new();
    let mut remaining = cli.years;
    if let Some((after, placements)) = later {
        phases.push(sim.try_run_experiment(after, cli.sample_every)?);
        sim.add_population(&placements)
            .context("introducing the second population")?;
        remaining -= after;
    }
    phases.push(sim.try_run_experiment(remaining, cli.sample_every)?);

    let counts = sim.num_animals_per_species();
    info!(
        year = sim.year(),
        herbivores = counts.herbivore,
        carnivores = counts.carnivore,
        "simulation finished"
    );

    let report = Report {
        seed,
        phases,
        histograms: Species::ALL
            .into_iter()
            .map(|s| (s.name().to_string(), histograms(&sim, s)))
            .collect(),
        density: Species::ALL
            .into_iter()
            .map(|s| (s.name().to_string(), sim.population_density(s)))
            .collect(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
