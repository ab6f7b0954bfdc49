pub mod lifecycle;
pub mod metrics;

pub use metrics::*;

use crate::config::{SimConfig, SimConfigError};
use crate::island::{Island, MapError};
use crate::landscape::Terrain;
use crate::population::{self, Placement, PopulationError};
use crate::species::{ParameterError, Species, SpeciesTable};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::collections::BTreeMap;
use std::{error::Error, fmt};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationInitError {
    Config(SimConfigError),
    Map(MapError),
    Population(PopulationError),
}

impl fmt::Display for SimulationInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationInitError::Config(e) => write!(f, "{}", e),
            SimulationInitError::Map(e) => write!(f, "{}", e),
            SimulationInitError::Population(e) => write!(f, "{}", e),
        }
    }
}

impl From<SimConfigError> for SimulationInitError {
    fn from(err: SimConfigError) -> Self {
        SimulationInitError::Config(err)
    }
}

impl From<MapError> for SimulationInitError {
    fn from(err: MapError) -> Self {
        SimulationInitError::Map(err)
    }
}

impl From<PopulationError> for SimulationInitError {
    fn from(err: PopulationError) -> Self {
        SimulationInitError::Population(err)
    }
}

impl Error for SimulationInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationInitError::Config(e) => Some(e),
            SimulationInitError::Map(e) => Some(e),
            SimulationInitError::Population(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    InvalidSampleEvery,
    TooManyYears { max: usize, actual: usize },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            ExperimentError::TooManyYears { max, actual } => {
                write!(f, "years ({actual}) exceed supported maximum ({max})")
            }
        }
    }
}

impl Error for ExperimentError {}

/// The island together with everything needed to advance it year by year.
pub struct Simulation {
    pub(crate) island: Island,
    pub(crate) config: SimConfig,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) year: u32,
    pub(crate) births_last_year: usize,
    pub(crate) deaths_last_year: usize,
    pub(crate) kills_last_year: usize,
    pub(crate) migrations_last_year: usize,
    pub(crate) food_before_refill: f64,
    pub(crate) total_births: usize,
    pub(crate) total_deaths: usize,
}

impl Simulation {
    pub const MAX_SIMULATION_YEARS: usize = 1_000_000;

    pub fn new(map: &str, config: SimConfig) -> Self {
        Self::try_new(map, config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(map: &str, config: SimConfig) -> Result<Self, SimulationInitError> {
        config.validate()?;
        let island = Island::parse(map, &config.landscape)?;
        Ok(Self {
            island,
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            config,
            year: 0,
            births_last_year: 0,
            deaths_last_year: 0,
            kills_last_year: 0,
            migrations_last_year: 0,
            food_before_refill: 0.0,
            total_births: 0,
            total_deaths: 0,
        })
    }

    /// Build a simulation and place its initial population in one go.
    pub fn with_population(
        map: &str,
        placements: &[Placement],
        config: SimConfig,
    ) -> Result<Self, SimulationInitError> {
        let mut sim = Self::try_new(map, config)?;
        sim.add_population(placements)?;
        Ok(sim)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn species_table(&self) -> &SpeciesTable {
        &self.config.species
    }

    /// Last simulated year (0 before the first year has run).
    pub fn year(&self) -> u32 {
        self.year
    }

    /// Place animals on the island. The batch is validated in full first;
    /// on error nothing is added.
    pub fn add_population(&mut self, placements: &[Placement]) -> Result<(), PopulationError> {
        let animals = population::build_animals(placements, &self.island, &self.config.species)?;
        let added = animals.len();
        for animal in animals {
            // build_animals only accepts legal coordinates
            if let Some(cell) = self.island.cell_mut(animal.position()) {
                cell.animals_mut(animal.species()).push(animal);
            }
        }
        for cell in &mut self.island.cells {
            cell.refresh_stats();
        }
        info!(added, total = self.num_animals(), "population added");
        Ok(())
    }

    /// Override species-level parameters by name, for existing and future animals.
    pub fn set_animal_parameters(
        &mut self,
        species: &str,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), ParameterError> {
        let species: Species = species.parse()?;
        self.config
            .species
            .get_mut(species)
            .apply_overrides(species, overrides)?;

        let params = self.config.species.get(species);
        for cell in &mut self.island.cells {
            for animal in cell.animals_mut(species) {
                animal.refresh_fitness(params);
            }
        }
        info!(%species, ?overrides, "species parameters updated");
        Ok(())
    }

    /// Change the yearly food capacity of every Highland (`'H'`) or Lowland (`'L'`) cell.
    pub fn set_landscape_parameters(&mut self, code: char, f_max: f64) -> Result<(), ParameterError> {
        let terrain = match Terrain::from_code(code) {
            Some(t @ (Terrain::Highland | Terrain::Lowland)) => t,
            _ => return Err(ParameterError::UnsupportedTerrain(code)),
        };
        if !(f_max.is_finite() && f_max >= 0.0) {
            return Err(ParameterError::InvalidValue {
                name: "f_max".to_string(),
                value: f_max,
            });
        }
        match terrain {
            Terrain::Highland => self.config.landscape.highland_f_max = f_max,
            _ => self.config.landscape.lowland_f_max = f_max,
        }
        for cell in self
            .island
            .cells
            .iter_mut()
            .filter(|cell| cell.terrain() == terrain)
        {
            cell.set_food_capacity(f_max);
        }
        info!(terrain = %code, f_max, "landscape parameters updated");
        Ok(())
    }

    /// Run `years` full year cycles.
    pub fn simulate(&mut self, years: usize) {
        for _ in 0..years {
            self.step();
        }
    }

    pub fn run_experiment(&mut self, years: usize, sample_every: usize) -> RunSummary {
        self.try_run_experiment(years, sample_every)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Run `years` years, sampling metrics every `sample_every` years and after the last one.
    pub fn try_run_experiment(
        &mut self,
        years: usize,
        sample_every: usize,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if years > Self::MAX_SIMULATION_YEARS {
            return Err(ExperimentError::TooManyYears {
                max: Self::MAX_SIMULATION_YEARS,
                actual: years,
            });
        }
        let births_before = self.total_births;
        let deaths_before = self.total_deaths;
        let estimated_samples = if years == 0 {
            0
        } else {
            ((years - 1) / sample_every) + 1
        };
        let mut samples = Vec::with_capacity(estimated_samples);
        for year in 1..=years {
            self.step();
            if year % sample_every == 0 || year == years {
                samples.push(self.collect_year_metrics());
            }
        }
        Ok(RunSummary {
            schema_version: 1,
            years,
            sample_every,
            final_year: self.year,
            final_counts: self.num_animals_per_species(),
            samples,
            total_births: self.total_births - births_before,
            total_deaths: self.total_deaths - deaths_before,
        })
    }
}
