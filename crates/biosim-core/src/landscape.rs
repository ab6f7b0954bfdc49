use crate::animal::Animal;
use crate::species::Species;
use serde::{Deserialize, Serialize};

/// Grid coordinate as 1-based `(row, col)`.
pub type Coord = (usize, usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Desert,
    Highland,
    Lowland,
}

impl Terrain {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(Terrain::Water),
            'D' => Some(Terrain::Desert),
            'H' => Some(Terrain::Highland),
            'L' => Some(Terrain::Lowland),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Terrain::Water => 'W',
            Terrain::Desert => 'D',
            Terrain::Highland => 'H',
            Terrain::Lowland => 'L',
        }
    }

    pub fn is_passable(self) -> bool {
        self != Terrain::Water
    }
}

/// Population counts cached at season end for reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStats {
    pub herbivores: usize,
    pub carnivores: usize,
}

/// One island tile: terrain, food stock and the animals living on it.
#[derive(Clone, Debug)]
pub struct Cell {
    coord: Coord,
    terrain: Terrain,
    food_capacity: f64,
    pub(crate) food: f64,
    pub(crate) herbivores: Vec<Animal>,
    pub(crate) carnivores: Vec<Animal>,
    /// Animals that decided to leave this year, positions already updated.
    pub(crate) emigrants: Vec<Animal>,
    stats: CellStats,
}

impl Cell {
    pub fn new(coord: Coord, terrain: Terrain, food_capacity: f64) -> Self {
        Self {
            coord,
            terrain,
            food_capacity,
            food: food_capacity,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
            emigrants: Vec::new(),
            stats: CellStats::default(),
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn food(&self) -> f64 {
        self.food
    }

    pub fn food_capacity(&self) -> f64 {
        self.food_capacity
    }

    pub fn stats(&self) -> CellStats {
        self.stats
    }

    pub fn animals(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    pub(crate) fn animals_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn population(&self) -> usize {
        self.herbivores.len() + self.carnivores.len()
    }

    /// Take up to `wanted` units of food, returning what was actually taken.
    pub(crate) fn take_food(&mut self, wanted: f64) -> f64 {
        let taken = self.food.min(wanted).max(0.0);
        self.food -= taken;
        taken
    }

    pub(crate) fn set_food_capacity(&mut self, capacity: f64) {
        self.food_capacity = capacity;
        self.food = capacity;
    }

    pub(crate) fn refresh_stats(&mut self) {
        self.stats = CellStats {
            herbivores: self.herbivores.len(),
            carnivores: self.carnivores.len(),
        };
    }

    /// Refill food and refresh the cached counts.
    pub(crate) fn end_season(&mut self) {
        self.food = self.food_capacity;
        self.refresh_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_codes_round_trip() {
        for code in ['W', 'D', 'H', 'L'] {
            assert_eq!(Terrain::from_code(code).map(Terrain::code), Some(code));
        }
        assert_eq!(Terrain::from_code('X'), None);
        assert!(!Terrain::Water.is_passable());
        assert!(Terrain::Desert.is_passable());
    }

    #[test]
    fn take_food_never_exceeds_stock() {
        let mut cell = Cell::new((2, 2), Terrain::Highland, 15.0);
        assert_eq!(cell.take_food(10.0), 10.0);
        assert_eq!(cell.take_food(10.0), 5.0);
        assert_eq!(cell.take_food(10.0), 0.0);
        assert_eq!(cell.food(), 0.0);
        cell.end_season();
        assert_eq!(cell.food(), 15.0);
    }
}
