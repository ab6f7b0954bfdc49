//! Predator-prey ecosystem on a grid island.
//!
//! Herbivores graze the cells' food, carnivores hunt herbivores, and both
//! breed, migrate, age and die on a fixed yearly cycle driven by
//! [`world::Simulation`].

pub mod animal;
pub mod config;
pub mod island;
pub mod landscape;
pub mod physiology;
pub mod population;
pub mod species;
pub mod world;

pub use config::{LandscapeParams, SimConfig, SimConfigError};
pub use island::{Island, MapError};
pub use landscape::{Cell, CellStats, Coord, Terrain};
pub use population::{AnimalSpec, Placement, PopulationError};
pub use species::{ParameterError, Species, SpeciesParams, SpeciesTable};
pub use world::{ExperimentError, RunSummary, Simulation, SimulationInitError, YearMetrics};
