//! Pure functions of an animal's age and weight and its species parameters.
//!
//! Every stochastic rule is expressed as a probability here; the draw itself
//! happens in [`crate::animal`] so the order of random numbers stays in one place.

use crate::species::SpeciesParams;
use rand::Rng;

/// Logistic term that decreases with `x`; 0.5 at `x_half`.
pub fn q_plus(x: f64, x_half: f64, phi: f64) -> f64 {
    1.0 / (1.0 + (phi * (x - x_half)).exp())
}

/// Logistic term that increases with `x`; 0.5 at `x_half`.
pub fn q_minus(x: f64, x_half: f64, phi: f64) -> f64 {
    1.0 / (1.0 + (-phi * (x - x_half)).exp())
}

/// Fitness Φ in [0, 1]. Zero for any non-positive weight.
pub fn fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    let phi = q_plus(age as f64, params.a_half, params.phi_age)
        * q_minus(weight, params.w_half, params.phi_weight);
    phi.clamp(0.0, 1.0)
}

/// Weight after one year of weight loss.
pub fn weight_after_loss(weight: f64, params: &SpeciesParams) -> f64 {
    weight - params.eta * weight
}

pub fn death_probability(weight: f64, fitness: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        1.0
    } else {
        params.omega * (1.0 - fitness)
    }
}

/// Minimum weight a mother needs before a birth is considered at all.
pub fn birth_weight_threshold(params: &SpeciesParams) -> f64 {
    params.zeta * (params.w_birth + params.sigma_birth)
}

/// `same_species` counts the mother herself, so a lone animal never breeds.
pub fn birth_probability(fitness: f64, params: &SpeciesParams, same_species: usize) -> f64 {
    let others = same_species.saturating_sub(1) as f64;
    (fitness * params.gamma * others).clamp(0.0, 1.0)
}

pub fn hunt_probability(attacker_fitness: f64, prey_fitness: f64, delta_phi_max: f64) -> f64 {
    ((attacker_fitness - prey_fitness) / delta_phi_max).clamp(0.0, 1.0)
}

pub fn move_probability(fitness: f64, params: &SpeciesParams) -> f64 {
    (params.mu * fitness).clamp(0.0, 1.0)
}

/// Draw from N(mean, std_dev) with the Box-Muller transform.
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::EPSILON);
    let u2: f64 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + z * std_dev
}
