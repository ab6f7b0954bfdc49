use biosim_core::{Placement, SimConfig, Simulation, Species};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::BTreeMap;

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_species(name: &str) -> PyResult<Species> {
    name.parse().map_err(value_error)
}

fn parse_config(config_json: Option<&str>, seed: Option<u64>) -> PyResult<SimConfig> {
    let mut config: SimConfig = match config_json {
        Some(json) => serde_json::from_str(json).map_err(value_error)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

/// Python handle on one island simulation.
#[pyclass]
struct BioSim {
    inner: Simulation,
}

#[pymethods]
impl BioSim {
    /// `ini_pop` is a JSON list of `{"loc": [row, col], "pop": [...]}` records.
    #[new]
    #[pyo3(signature = (island_map, ini_pop = None, seed = None, config_json = None))]
    fn new(
        island_map: &str,
        ini_pop: Option<&str>,
        seed: Option<u64>,
        config_json: Option<&str>,
    ) -> PyResult<Self> {
        let config = parse_config(config_json, seed)?;
        let placements: Vec<Placement> = match ini_pop {
            Some(json) => serde_json::from_str(json).map_err(value_error)?,
            None => Vec::new(),
        };
        let inner =
            Simulation::with_population(island_map, &placements, config).map_err(value_error)?;
        Ok(Self { inner })
    }

    fn add_population(&mut self, population: &str) -> PyResult<()> {
        let placements: Vec<Placement> = serde_json::from_str(population).map_err(value_error)?;
        self.inner.add_population(&placements).map_err(value_error)
    }

    fn set_animal_parameters(&mut self, species: &str, params: BTreeMap<String, f64>) -> PyResult<()> {
        self.inner
            .set_animal_parameters(species, &params)
            .map_err(value_error)
    }

    fn set_landscape_parameters(&mut self, landscape: char, f_max: f64) -> PyResult<()> {
        self.inner
            .set_landscape_parameters(landscape, f_max)
            .map_err(value_error)
    }

    fn simulate(&mut self, num_years: usize) {
        self.inner.simulate(num_years);
    }

    /// Run and return the `RunSummary` as JSON.
    #[pyo3(signature = (num_years, sample_every = 1))]
    fn run_experiment(&mut self, num_years: usize, sample_every: usize) -> PyResult<String> {
        let summary = self
            .inner
            .try_run_experiment(num_years, sample_every)
            .map_err(value_error)?;
        serde_json::to_string(&summary).map_err(value_error)
    }

    #[getter]
    fn year(&self) -> u32 {
        self.inner.year()
    }

    #[getter]
    fn num_animals(&self) -> usize {
        self.inner.num_animals()
    }

    #[getter]
    fn num_animals_per_species(&self) -> BTreeMap<String, usize> {
        let counts = self.inner.num_animals_per_species();
        Species::ALL
            .into_iter()
            .map(|s| (s.name().to_string(), counts.get(s)))
            .collect()
    }

    fn population_density(&self, species: &str) -> PyResult<Vec<Vec<usize>>> {
        Ok(self.inner.population_density(parse_species(species)?))
    }

    /// `(ages, weights, fitness)` of every animal of `species`.
    fn animal_samples(&self, species: &str) -> PyResult<(Vec<u32>, Vec<f64>, Vec<f64>)> {
        let samples = self.inner.animal_samples(parse_species(species)?);
        Ok((samples.ages, samples.weights, samples.fitness))
    }
}

#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&SimConfig::default()).map_err(value_error)
}

/// One-shot run: build, simulate and return the `RunSummary` JSON.
#[pyfunction]
#[pyo3(signature = (island_map, population_json, years, sample_every = 1, config_json = None))]
fn run_simulation(
    island_map: &str,
    population_json: &str,
    years: usize,
    sample_every: usize,
    config_json: Option<&str>,
) -> PyResult<String> {
    let mut sim = BioSim::new(island_map, Some(population_json), None, config_json)?;
    sim.run_experiment(years, sample_every)
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<BioSim>()?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_simulation, m)?)?;
    Ok(())
}
