use crate::landscape::Terrain;
use crate::species::{Species, SpeciesParams, SpeciesTable};
use serde::{Deserialize, Serialize};

/// Yearly food capacity of the terrains that grow food.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeParams {
    pub highland_f_max: f64,
    pub lowland_f_max: f64,
}

impl Default for LandscapeParams {
    fn default() -> Self {
        Self {
            highland_f_max: 300.0,
            lowland_f_max: 800.0,
        }
    }
}

impl LandscapeParams {
    pub fn capacity(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Water | Terrain::Desert => 0.0,
            Terrain::Highland => self.highland_f_max,
            Terrain::Lowland => self.lowland_f_max,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible runs.
    pub seed: u64,
    /// Species parameter table, keyed `herbivore` / `carnivore`.
    pub species: SpeciesTable,
    pub landscape: LandscapeParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            species: SpeciesTable::default(),
            landscape: LandscapeParams::default(),
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    InvalidSpeciesParameter { species: Species, name: &'static str, value: f64 } =>
        "{species} parameter {name} must be finite and non-negative (got {value})";
    MissingDeltaPhiMax => "carnivore DeltaPhiMax must be set and positive";
    UnexpectedDeltaPhiMax => "herbivore does not take a DeltaPhiMax parameter";
    InvalidHighlandCapacity => "highland_f_max must be finite and non-negative";
    InvalidLowlandCapacity => "lowland_f_max must be finite and non-negative";
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimConfigError> {
        for species in Species::ALL {
            self.validate_species(species, self.species.get(species))?;
        }
        self.validate_landscape()?;
        Ok(())
    }

    fn validate_species(
        &self,
        species: Species,
        params: &SpeciesParams,
    ) -> Result<(), SimConfigError> {
        for (name, value) in params.values() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimConfigError::InvalidSpeciesParameter {
                    species,
                    name,
                    value,
                });
            }
        }
        match (species, params.delta_phi_max) {
            (Species::Carnivore, Some(d)) if d.is_finite() && d > 0.0 => Ok(()),
            (Species::Carnivore, _) => Err(SimConfigError::MissingDeltaPhiMax),
            (Species::Herbivore, Some(_)) => Err(SimConfigError::UnexpectedDeltaPhiMax),
            (Species::Herbivore, None) => Ok(()),
        }
    }

    fn validate_landscape(&self) -> Result<(), SimConfigError> {
        let landscape = &self.landscape;
        if !(landscape.highland_f_max.is_finite() && landscape.highland_f_max >= 0.0) {
            return Err(SimConfigError::InvalidHighlandCapacity);
        }
        if !(landscape.lowland_f_max.is_finite() && landscape.lowland_f_max >= 0.0) {
            return Err(SimConfigError::InvalidLowlandCapacity);
        }
        Ok(())
    }
}
