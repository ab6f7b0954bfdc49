use biosim_core::{AnimalSpec, Placement, SimConfig, Simulation, Species};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::Instant;

const SIDE: usize = 40;

/// Square island: water ring around a lowland core with a highland band.
fn build_map() -> String {
    (1..=SIDE)
        .map(|row| {
            (1..=SIDE)
                .map(|col| {
                    if row == 1 || row == SIDE || col == 1 || col == SIDE {
                        'W'
                    } else if row % 7 == 0 {
                        'H'
                    } else {
                        'L'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn random_population(seed: u64, placements: usize) -> Vec<Placement> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    (0..placements)
        .map(|_| {
            let loc = (rng.random_range(2..SIDE), rng.random_range(2..SIDE));
            let pop = (0..20)
                .map(|i| {
                    let species = if i < 16 {
                        Species::Herbivore
                    } else {
                        Species::Carnivore
                    };
                    AnimalSpec::new(
                        species,
                        rng.random_range(0..20),
                        rng.random_range(10.0..40.0),
                    )
                })
                .collect();
            Placement { loc, pop }
        })
        .collect()
}

fn main() {
    let map = build_map();
    let config = SimConfig {
        seed: 42,
        ..SimConfig::default()
    };
    let population = random_population(config.seed, 200);
    let initial: usize = population.iter().map(|p| p.pop.len()).sum();
    println!("Benchmarking a {SIDE}x{SIDE} island with {initial} initial animals");

    let mut sim1 = Simulation::with_population(&map, &population, config.clone())
        .unwrap_or_else(|e| panic!("{e}"));
    let mut sim2 = Simulation::with_population(&map, &population, config)
        .unwrap_or_else(|e| panic!("{e}"));

    let years = 50;

    let start = Instant::now();
    let mut feeding_us = 0;
    let mut migration_us = 0;
    for _ in 0..years {
        let timings = sim1.step();
        feeding_us += timings.feeding_us;
        migration_us += timings.migration_us;
    }
    let duration_no_metrics = start.elapsed();
    println!("Time for {years} years WITHOUT metrics: {duration_no_metrics:?}");
    println!(
        "Avg time per year (no metrics): {:?}",
        duration_no_metrics / years as u32
    );
    println!("  feeding {feeding_us} us, migration {migration_us} us in total");

    let start = Instant::now();
    let summary = sim2.run_experiment(years, 1);
    let duration_metrics = start.elapsed();
    println!("Time for {years} years WITH metrics: {duration_metrics:?}");
    println!(
        "Avg time per year (with metrics): {:?}",
        duration_metrics / years as u32
    );

    let diff = duration_metrics.saturating_sub(duration_no_metrics);
    println!("Total metrics overhead: {diff:?}");
    println!(
        "Final population: {} herbivores, {} carnivores",
        summary.final_counts.herbivore, summary.final_counts.carnivore
    );
}
