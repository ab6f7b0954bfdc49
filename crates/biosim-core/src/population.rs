use crate::animal::Animal;
use crate::island::Island;
use crate::landscape::Coord;
use crate::species::{Species, SpeciesTable};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// One animal of a placement request, as read from configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimalSpec {
    pub species: String,
    pub age: i64,
    pub weight: f64,
}

/// Animals to put on the island at `loc`, a 1-based `(row, col)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub loc: Coord,
    pub pop: Vec<AnimalSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopulationError {
    UnknownSpecies(String),
    IllegalCoordinate(Coord),
    NegativeAge { species: Species, age: i64 },
    AgeOutOfRange { species: Species, age: i64 },
    InvalidWeight { species: Species, weight: f64 },
}

impl fmt::Display for PopulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopulationError::UnknownSpecies(name) => {
                write!(f, "unknown species '{name}', expected Herbivore or Carnivore")
            }
            PopulationError::IllegalCoordinate((row, col)) => {
                write!(f, "animals cannot be placed at ({row}, {col})")
            }
            PopulationError::NegativeAge { species, age } => {
                write!(f, "{species} age must be non-negative (got {age})")
            }
            PopulationError::AgeOutOfRange { species, age } => {
                write!(f, "{species} age {age} exceeds the maximum of {}", u32::MAX)
            }
            PopulationError::InvalidWeight { species, weight } => {
                write!(f, "{species} weight must be finite and non-negative (got {weight})")
            }
        }
    }
}

impl Error for PopulationError {}

impl AnimalSpec {
    pub fn new(species: Species, age: i64, weight: f64) -> Self {
        Self {
            species: species.name().to_string(),
            age,
            weight,
        }
    }

    /// Validate and build the animal at `position`.
    pub fn to_animal(
        &self,
        position: Coord,
        table: &SpeciesTable,
    ) -> Result<Animal, PopulationError> {
        let species: Species = self
            .species
            .parse()
            .map_err(|_| PopulationError::UnknownSpecies(self.species.clone()))?;
        if self.age < 0 {
            return Err(PopulationError::NegativeAge {
                species,
                age: self.age,
            });
        }
        let age = u32::try_from(self.age).map_err(|_| PopulationError::AgeOutOfRange {
            species,
            age: self.age,
        })?;
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(PopulationError::InvalidWeight {
                species,
                weight: self.weight,
            });
        }
        Ok(Animal::new(
            species,
            age,
            self.weight,
            position,
            table.get(species),
        ))
    }
}

/// Validate a whole batch of placements, returning the animals to insert.
pub(crate) fn build_animals(
    placements: &[Placement],
    island: &Island,
    table: &SpeciesTable,
) -> Result<Vec<Animal>, PopulationError> {
    let mut animals = Vec::new();
    for placement in placements {
        if !island.is_legal(placement.loc) {
            return Err(PopulationError::IllegalCoordinate(placement.loc));
        }
        for spec in &placement.pop {
            animals.push(spec.to_animal(placement.loc, table)?);
        }
    }
    Ok(animals)
}
