use super::metrics::YearTimings;
use super::Simulation;
use crate::animal::Animal;
use crate::species::Species;
use rand::seq::SliceRandom;
use std::time::Instant;
use tracing::{debug, info, trace};

fn by_fitness_ascending(a: &Animal, b: &Animal) -> std::cmp::Ordering {
    a.fitness().total_cmp(&b.fitness())
}

impl Simulation {
    /// Herbivores graze in random order, then carnivores hunt fittest-first.
    pub(crate) fn season_feeding(&mut self) {
        let Self {
            island,
            config,
            rng,
            kills_last_year,
            ..
        } = self;
        let herbivore = &config.species.herbivore;
        let carnivore = &config.species.carnivore;

        for cell in island.cells.iter_mut().filter(|c| c.population() > 0) {
            let mut herbivores = std::mem::take(&mut cell.herbivores);
            herbivores.shuffle(rng);
            for animal in herbivores.iter_mut() {
                if cell.food <= 0.0 {
                    break;
                }
                animal.graze(cell, herbivore);
            }

            if !herbivores.is_empty() && !cell.carnivores.is_empty() {
                herbivores.sort_by(by_fitness_ascending);
                cell.carnivores.sort_by(|a, b| by_fitness_ascending(b, a));
                let mut kills = 0;
                for predator in cell.carnivores.iter_mut() {
                    if herbivores.iter().all(|prey| !prey.is_alive()) {
                        break;
                    }
                    kills += predator.hunt(&mut herbivores, carnivore, rng);
                }
                if kills > 0 {
                    herbivores.retain(Animal::is_alive);
                    trace!(cell = ?cell.coord(), kills, "carnivores fed");
                }
                *kills_last_year += kills;
            }
            cell.herbivores = herbivores;
        }
    }

    /// Every animal tries to give birth against a head count taken before any birth.
    pub(crate) fn season_breeding(&mut self) {
        let Self {
            island,
            config,
            rng,
            births_last_year,
            ..
        } = self;
        for cell in island.cells.iter_mut().filter(|c| c.population() > 0) {
            for species in Species::ALL {
                let params = config.species.get(species);
                let parents = cell.animals_mut(species);
                let same_species = parents.len();
                let newborns: Vec<Animal> = parents
                    .iter_mut()
                    .filter_map(|parent| parent.try_give_birth(same_species, params, rng))
                    .collect();
                *births_last_year += newborns.len();
                parents.extend(newborns);
            }
        }
    }

    /// Two passes over the grid: stage every mover, then drop them into their new cells.
    pub(crate) fn season_migration(&mut self) {
        let Self {
            island,
            config,
            rng,
            migrations_last_year,
            ..
        } = self;
        let before = island.population();

        for idx in 0..island.cells.len() {
            if island.cells[idx].population() == 0 {
                continue;
            }
            for species in Species::ALL {
                let params = config.species.get(species);
                let residents = std::mem::take(island.cells[idx].animals_mut(species));
                let mut stayers = Vec::with_capacity(residents.len());
                let mut movers = Vec::new();
                for mut animal in residents {
                    match animal.propose_move(params, rng, |c| island.is_legal(c)) {
                        Some(target) => {
                            animal.set_position(target);
                            movers.push(animal);
                        }
                        None => stayers.push(animal),
                    }
                }
                let cell = &mut island.cells[idx];
                *cell.animals_mut(species) = stayers;
                cell.emigrants.extend(movers);
            }
        }

        let mut moved = 0;
        for idx in 0..island.cells.len() {
            let emigrants = std::mem::take(&mut island.cells[idx].emigrants);
            for animal in emigrants {
                let Some(dest) = island.index_of(animal.position()) else {
                    unreachable!("migration staged an animal off the map");
                };
                island.cells[dest]
                    .animals_mut(animal.species())
                    .push(animal);
                moved += 1;
            }
        }

        debug_assert_eq!(before, island.population(), "migration changed the head count");
        *migrations_last_year += moved;
    }

    pub(crate) fn season_aging(&mut self) {
        for cell in &mut self.island.cells {
            for species in Species::ALL {
                let params = self.config.species.get(species);
                for animal in cell.animals_mut(species) {
                    animal.grow_older(params);
                }
            }
        }
    }

    pub(crate) fn season_weight_loss(&mut self) {
        for cell in &mut self.island.cells {
            for species in Species::ALL {
                let params = self.config.species.get(species);
                for animal in cell.animals_mut(species) {
                    animal.lose_weight(params);
                }
            }
        }
    }

    pub(crate) fn season_death(&mut self) {
        let Self {
            island,
            config,
            rng,
            deaths_last_year,
            ..
        } = self;
        for cell in island.cells.iter_mut().filter(|c| c.population() > 0) {
            for species in Species::ALL {
                let params = config.species.get(species);
                let animals = cell.animals_mut(species);
                for animal in animals.iter_mut() {
                    animal.roll_death(params, rng);
                }
                let before = animals.len();
                animals.retain(Animal::is_alive);
                *deaths_last_year += before - animals.len();
            }
        }
    }

    pub(crate) fn season_end(&mut self) {
        self.food_before_refill = self.island.cells.iter().map(|c| c.food).sum();
        for cell in &mut self.island.cells {
            cell.end_season();
        }
    }

    /// Advance the island by one full year.
    pub fn step(&mut self) -> YearTimings {
        let total_start = Instant::now();
        self.year = self.year.saturating_add(1);
        self.births_last_year = 0;
        self.deaths_last_year = 0;
        self.kills_last_year = 0;
        self.migrations_last_year = 0;
        let counts_before = self.num_animals_per_species();

        let t0 = Instant::now();
        self.season_feeding();
        let feeding_us = t0.elapsed().as_micros() as u64;

        let t1 = Instant::now();
        self.season_breeding();
        let breeding_us = t1.elapsed().as_micros() as u64;

        let t2 = Instant::now();
        self.season_migration();
        let migration_us = t2.elapsed().as_micros() as u64;

        let t3 = Instant::now();
        self.season_aging();
        self.season_weight_loss();
        self.season_death();
        let aging_us = t3.elapsed().as_micros() as u64;

        let t4 = Instant::now();
        self.season_end();
        let season_end_us = t4.elapsed().as_micros() as u64;

        // kills are removed during feeding, so they count as deaths too
        self.deaths_last_year += self.kills_last_year;
        self.total_births += self.births_last_year;
        self.total_deaths += self.deaths_last_year;

        let counts = self.num_animals_per_species();
        debug!(
            year = self.year,
            herbivores = counts.herbivore,
            carnivores = counts.carnivore,
            births = self.births_last_year,
            deaths = self.deaths_last_year,
            kills = self.kills_last_year,
            migrations = self.migrations_last_year,
            "year complete"
        );
        for species in Species::ALL {
            if counts_before.get(species) > 0 && counts.get(species) == 0 {
                info!(%species, year = self.year, "species went extinct");
            }
        }

        YearTimings {
            feeding_us,
            breeding_us,
            migration_us,
            aging_us,
            season_end_us,
            total_us: total_start.elapsed().as_micros() as u64,
        }
    }
}
