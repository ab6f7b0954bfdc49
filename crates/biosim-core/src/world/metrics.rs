use super::Simulation;
use crate::landscape::{CellStats, Coord};
use crate::species::Species;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct YearTimings {
    pub feeding_us: u64,
    pub breeding_us: u64,
    pub migration_us: u64,
    pub aging_us: u64,
    pub season_end_us: u64,
    pub total_us: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCounts {
    pub herbivore: usize,
    pub carnivore: usize,
}

impl SpeciesCounts {
    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivore,
            Species::Carnivore => self.carnivore,
        }
    }

    pub fn total(&self) -> usize {
        self.herbivore + self.carnivore
    }
}

/// Per-animal values of one species across the whole island.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimalSamples {
    pub ages: Vec<u32>,
    pub weights: Vec<f64>,
    pub fitness: Vec<f64>,
}

impl AnimalSamples {
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }
}

/// Fixed-width histogram over `[0, max)`; values at or above `max` land in the last bin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub max: f64,
    pub delta: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn from_samples(values: &[f64], max: f64, delta: f64) -> Self {
        let bins = if max > 0.0 && delta > 0.0 {
            ((max / delta).ceil() as usize).max(1)
        } else {
            1
        };
        let mut counts = vec![0usize; bins];
        for &value in values {
            let idx = if value <= 0.0 || delta <= 0.0 {
                0
            } else {
                ((value / delta) as usize).min(bins - 1)
            };
            counts[idx] += 1;
        }
        Self { max, delta, counts }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpeciesMetrics {
    pub count: usize,
    pub mean_age: f64,
    pub mean_weight: f64,
    pub mean_fitness: f64,
    pub fitness_std: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct YearMetrics {
    pub year: u32,
    pub herbivore: SpeciesMetrics,
    pub carnivore: SpeciesMetrics,
    /// Food left on the island just before the yearly refill.
    pub food_remaining: f64,
    pub birth_count: usize,
    pub death_count: usize,
    pub kill_count: usize,
    pub migration_count: usize,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub years: usize,
    pub sample_every: usize,
    pub final_year: u32,
    pub final_counts: SpeciesCounts,
    pub samples: Vec<YearMetrics>,
    #[serde(default)]
    pub total_births: usize,
    #[serde(default)]
    pub total_deaths: usize,
}

impl Simulation {
    pub fn num_animals(&self) -> usize {
        self.island.population()
    }

    pub fn num_animals_per_species(&self) -> SpeciesCounts {
        let mut counts = SpeciesCounts::default();
        for cell in self.island.cells() {
            counts.herbivore += cell.animals(Species::Herbivore).len();
            counts.carnivore += cell.animals(Species::Carnivore).len();
        }
        counts
    }

    pub fn animal_samples(&self, species: Species) -> AnimalSamples {
        let mut samples = AnimalSamples::default();
        for animal in self
            .island
            .cells()
            .iter()
            .flat_map(|cell| cell.animals(species))
        {
            samples.ages.push(animal.age());
            samples.weights.push(animal.weight());
            samples.fitness.push(animal.fitness());
        }
        samples
    }

    /// Animals of `species` per cell, as `rows × cols` (water cells are 0).
    pub fn population_density(&self, species: Species) -> Vec<Vec<usize>> {
        self.island
            .cells()
            .chunks(self.island.cols())
            .map(|row| row.iter().map(|cell| cell.animals(species).len()).collect())
            .collect()
    }

    /// Counts per passable cell as of the last season end.
    pub fn cell_stats(&self) -> Vec<(Coord, CellStats)> {
        self.island
            .cells()
            .iter()
            .filter(|cell| cell.terrain().is_passable())
            .map(|cell| (cell.coord(), cell.stats()))
            .collect()
    }

    fn species_metrics(&self, species: Species) -> SpeciesMetrics {
        let samples = self.animal_samples(species);
        let count = samples.len();
        if count == 0 {
            return SpeciesMetrics::default();
        }
        let denom = count as f64;
        let mean_fitness = samples.fitness.iter().sum::<f64>() / denom;
        let fitness_std = if count < 2 {
            0.0
        } else {
            let var = samples
                .fitness
                .iter()
                .map(|f| (f - mean_fitness).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            var.sqrt()
        };
        SpeciesMetrics {
            count,
            mean_age: samples.ages.iter().map(|&a| a as f64).sum::<f64>() / denom,
            mean_weight: samples.weights.iter().sum::<f64>() / denom,
            mean_fitness,
            fitness_std,
        }
    }

    pub(crate) fn collect_year_metrics(&self) -> YearMetrics {
        YearMetrics {
            year: self.year,
            herbivore: self.species_metrics(Species::Herbivore),
            carnivore: self.species_metrics(Species::Carnivore),
            food_remaining: self.food_before_refill,
            birth_count: self.births_last_year,
            death_count: self.deaths_last_year,
            kill_count: self.kills_last_year,
            migration_count: self.migrations_last_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_clamps_overflow_into_last_bin() {
        let hist = Histogram::from_samples(&[0.0, 1.9, 2.0, 5.5, 60.0, 1000.0], 60.0, 2.0);
        assert_eq!(hist.counts.len(), 30);
        assert_eq!(hist.counts[0], 2);
        assert_eq!(hist.counts[1], 1);
        assert_eq!(hist.counts[2], 1);
        assert_eq!(hist.counts[29], 2);
        assert_eq!(hist.counts.iter().sum::<usize>(), 6);
    }

    #[test]
    fn histogram_handles_fractional_bins() {
        let hist = Histogram::from_samples(&[0.04, 0.52, 0.99], 1.0, 0.05);
        assert_eq!(hist.counts.len(), 20);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[10], 1);
        assert_eq!(hist.counts[19], 1);
    }

    #[test]
    fn run_summary_defaults_optional_fields() {
        let json = r#"{
            "years": 3,
            "sample_every": 1,
            "final_year": 3,
            "final_counts": {"herbivore": 4, "carnivore": 1},
            "samples": []
        }"#;
        let summary: RunSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.schema_version, 1);
        assert_eq!(summary.final_counts.total(), 5);
        assert_eq!(summary.total_births, 0);
    }
}
