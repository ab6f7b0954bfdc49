use crate::landscape::{Cell, Coord};
use crate::physiology;
use crate::species::{Species, SpeciesParams};
use rand::Rng;

/// Orthogonal single-step moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Neighbouring coordinate, or `None` when the step leaves the first row/column.
    pub fn step(self, (row, col): Coord) -> Option<Coord> {
        match self {
            Direction::North => row.checked_sub(1).map(|r| (r, col)),
            Direction::South => Some((row + 1, col)),
            Direction::East => Some((row, col + 1)),
            Direction::West => col.checked_sub(1).map(|c| (row, c)),
        }
    }
}

/// One simulated individual.
///
/// `fitness` is cached and refreshed after every change to age or weight; all
/// mutators therefore take the species parameters they need to recompute it.
#[derive(Clone, Debug, PartialEq)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    alive: bool,
    position: Coord,
}

impl Animal {
    pub fn new(
        species: Species,
        age: u32,
        weight: f64,
        position: Coord,
        params: &SpeciesParams,
    ) -> Self {
        Self {
            species,
            age,
            weight,
            fitness: physiology::fitness(age, weight, params),
            alive: true,
            position,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Coord) {
        self.position = position;
    }

    pub(crate) fn refresh_fitness(&mut self, params: &SpeciesParams) {
        self.fitness = physiology::fitness(self.age, self.weight, params);
    }

    pub(crate) fn grow_older(&mut self, params: &SpeciesParams) {
        self.age = self.age.saturating_add(1);
        self.refresh_fitness(params);
    }

    pub(crate) fn lose_weight(&mut self, params: &SpeciesParams) {
        self.weight = physiology::weight_after_loss(self.weight, params);
        self.refresh_fitness(params);
    }

    /// Graze on the cell's stock. Returns the amount of food removed from the cell.
    pub(crate) fn graze(&mut self, cell: &mut Cell, params: &SpeciesParams) -> f64 {
        let eaten = cell.take_food(params.appetite);
        self.weight += params.beta * eaten;
        self.refresh_fitness(params);
        eaten
    }

    /// Hunt through `prey` once, in slice order, until the appetite is spent.
    ///
    /// Killed prey are only flagged dead; the caller removes them. Returns the
    /// number of kills.
    pub(crate) fn hunt<R: Rng + ?Sized>(
        &mut self,
        prey: &mut [Animal],
        params: &SpeciesParams,
        rng: &mut R,
    ) -> usize {
        let Some(delta_phi_max) = params.delta_phi_max else {
            return 0;
        };
        let mut appetite = params.appetite;
        let mut kills = 0;
        for victim in prey.iter_mut() {
            if appetite <= 0.0 {
                break;
            }
            if !victim.alive {
                continue;
            }
            let p = physiology::hunt_probability(self.fitness, victim.fitness, delta_phi_max);
            if rng.random::<f64>() < p {
                victim.alive = false;
                let eaten = appetite.min(victim.weight);
                self.weight += params.beta * eaten;
                appetite -= eaten;
                self.refresh_fitness(params);
                kills += 1;
            }
        }
        kills
    }

    /// Attempt a birth given `same_species` animals of this species in the cell.
    pub(crate) fn try_give_birth<R: Rng + ?Sized>(
        &mut self,
        same_species: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        if self.weight < physiology::birth_weight_threshold(params) {
            return None;
        }
        let p = physiology::birth_probability(self.fitness, params, same_species);
        if rng.random::<f64>() >= p {
            return None;
        }
        let newborn_weight = physiology::sample_normal(rng, params.w_birth, params.sigma_birth);
        let cost = params.xi * newborn_weight;
        if newborn_weight <= 0.0 || self.weight <= cost {
            return None;
        }
        self.weight -= cost;
        self.refresh_fitness(params);
        Some(Animal::new(
            self.species,
            0,
            newborn_weight,
            self.position,
            params,
        ))
    }

    /// Decide whether this animal leaves its cell this year.
    ///
    /// `is_legal` rejects water and anything off the map; a rejected target
    /// means the animal stays.
    pub(crate) fn propose_move<R, F>(
        &self,
        params: &SpeciesParams,
        rng: &mut R,
        is_legal: F,
    ) -> Option<Coord>
    where
        R: Rng + ?Sized,
        F: Fn(Coord) -> bool,
    {
        if rng.random::<f64>() >= physiology::move_probability(self.fitness, params) {
            return None;
        }
        let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
        direction.step(self.position).filter(|&target| is_legal(target))
    }

    /// Roll the yearly death check; returns `true` if the animal died.
    pub(crate) fn roll_death<R: Rng + ?Sized>(
        &mut self,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> bool {
        let p = physiology::death_probability(self.weight, self.fitness, params);
        if self.weight <= 0.0 || rng.random::<f64>() < p {
            self.alive = false;
        }
        !self.alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landscape::Terrain;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn herbivore(age: u32, weight: f64) -> Animal {
        Animal::new(
            Species::Herbivore,
            age,
            weight,
            (2, 2),
            &SpeciesParams::herbivore(),
        )
    }

    #[test]
    fn fitness_tracks_age_and_weight_changes() {
        let params = SpeciesParams::herbivore();
        let mut animal = herbivore(5, 20.0);
        let before = animal.fitness();
        animal.grow_older(&params);
        assert_eq!(animal.age(), 6);
        assert_eq!(animal.fitness(), physiology::fitness(6, 20.0, &params));
        animal.lose_weight(&params);
        assert!((animal.weight() - 19.0).abs() < 1e-12);
        assert!(animal.fitness() < before);
    }

    #[test]
    fn graze_takes_at_most_appetite() {
        let params = SpeciesParams::herbivore();
        let mut cell = Cell::new((2, 2), Terrain::Lowland, 800.0);
        let mut animal = herbivore(5, 20.0);
        let eaten = animal.graze(&mut cell, &params);
        assert_eq!(eaten, 10.0);
        assert_eq!(cell.food(), 790.0);
        assert!((animal.weight() - 29.0).abs() < 1e-12);

        let mut sparse = Cell::new((2, 2), Terrain::Highland, 4.0);
        let eaten = animal.graze(&mut sparse, &params);
        assert_eq!(eaten, 4.0);
        assert_eq!(sparse.food(), 0.0);
        assert!((animal.weight() - 32.6).abs() < 1e-12);
    }

    #[test]
    fn starving_animal_always_dies() {
        let params = SpeciesParams {
            omega: 0.0,
            ..SpeciesParams::herbivore()
        };
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let mut animal = herbivore(5, 0.0);
        assert!(animal.roll_death(&params, &mut rng));
        assert!(!animal.is_alive());
    }

    #[test]
    fn zero_omega_healthy_animal_never_dies() {
        let params = SpeciesParams {
            omega: 0.0,
            ..SpeciesParams::herbivore()
        };
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        for _ in 0..100 {
            let mut animal = herbivore(5, 30.0);
            assert!(!animal.roll_death(&params, &mut rng));
        }
    }

    #[test]
    fn birth_needs_weight_above_threshold() {
        let params = SpeciesParams {
            gamma: 100.0,
            ..SpeciesParams::herbivore()
        };
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        // threshold = 3.5 * (8 + 1.5) = 33.25
        let mut light = herbivore(5, 33.0);
        assert!(light.try_give_birth(10, &params, &mut rng).is_none());
        assert_eq!(light.weight(), 33.0);
    }

    #[test]
    fn successful_birth_charges_the_mother() {
        let params = SpeciesParams {
            gamma: 100.0,
            ..SpeciesParams::herbivore()
        };
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let mut mother = herbivore(5, 100.0);
        let child = mother
            .try_give_birth(10, &params, &mut rng)
            .expect("certain birth");
        assert_eq!(child.age(), 0);
        assert_eq!(child.position(), mother.position());
        assert!((mother.weight() - (100.0 - params.xi * child.weight())).abs() < 1e-9);
        assert_eq!(
            mother.fitness(),
            physiology::fitness(5, mother.weight(), &params)
        );
    }

    #[test]
    fn hunt_with_certain_success_fills_appetite_weakest_first() {
        let carn_params = SpeciesParams {
            delta_phi_max: Some(0.01),
            appetite: 30.0,
            ..SpeciesParams::carnivore()
        };
        let herb_params = SpeciesParams::herbivore();
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        let mut hunter = Animal::new(Species::Carnivore, 2, 40.0, (2, 2), &carn_params);
        let mut prey: Vec<Animal> = [(90, 2.0), (90, 30.0), (90, 30.0)]
            .iter()
            .map(|&(age, w)| Animal::new(Species::Herbivore, age, w, (2, 2), &herb_params))
            .collect();
        prey.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
        let kills = hunter.hunt(&mut prey, &carn_params, &mut rng);
        assert_eq!(kills, 2);
        assert!(!prey[0].is_alive());
        assert!(!prey[1].is_alive());
        assert!(prey[2].is_alive());
        // 2.0 from the first victim, 28.0 of the second
        assert!((hunter.weight() - (40.0 + 0.75 * 30.0)).abs() < 1e-9);
    }

    #[test]
    fn kill_raises_fitness_enough_to_reach_stronger_prey() {
        let carn_params = SpeciesParams {
            delta_phi_max: Some(0.1),
            ..SpeciesParams::carnivore()
        };
        let herb_params = SpeciesParams::herbivore();
        let mut rng = ChaCha12Rng::seed_from_u64(17);
        let weak = Animal::new(Species::Herbivore, 90, 20.0, (2, 2), &herb_params);
        let strong = Animal::new(Species::Herbivore, 40, 100.0, (2, 2), &herb_params);

        let mut lean = Animal::new(Species::Carnivore, 0, 2.0, (2, 2), &carn_params);
        assert!(lean.fitness() < strong.fitness());
        let mut only_strong = vec![strong.clone()];
        assert_eq!(lean.hunt(&mut only_strong, &carn_params, &mut rng), 0);
        assert!(only_strong[0].is_alive());

        let mut hunter = Animal::new(Species::Carnivore, 0, 2.0, (2, 2), &carn_params);
        let mut prey = vec![weak, strong];
        assert_eq!(hunter.hunt(&mut prey, &carn_params, &mut rng), 2);
        assert!(prey.iter().all(|p| !p.is_alive()));
        // 20 from the weak prey, then the remaining 30 of appetite
        assert!((hunter.weight() - (2.0 + 0.75 * 50.0)).abs() < 1e-9);
    }

    #[test]
    fn directions_are_orthogonal_single_steps() {
        assert_eq!(Direction::North.step((3, 3)), Some((2, 3)));
        assert_eq!(Direction::South.step((3, 3)), Some((4, 3)));
        assert_eq!(Direction::East.step((3, 3)), Some((3, 4)));
        assert_eq!(Direction::West.step((3, 3)), Some((3, 2)));
        assert_eq!(Direction::North.step((0, 3)), None);
    }

    #[test]
    fn blocked_move_keeps_animal_in_place() {
        let params = SpeciesParams {
            mu: 100.0,
            ..SpeciesParams::herbivore()
        };
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let animal = herbivore(5, 50.0);
        for _ in 0..50 {
            assert_eq!(animal.propose_move(&params, &mut rng, |_| false), None);
        }
    }
}
