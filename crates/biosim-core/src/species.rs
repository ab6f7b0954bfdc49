use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::{error::Error, fmt};

/// The closed set of simulated species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    pub fn name(self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }

    /// Parameter names a species accepts in overrides.
    pub fn parameter_names(self) -> &'static [&'static str] {
        // carnivores take every name; herbivores all but the trailing DeltaPhiMax
        const NAMES: &[&str] = &[
            "w_birth",
            "sigma_birth",
            "beta",
            "eta",
            "a_half",
            "phi_age",
            "w_half",
            "phi_weight",
            "mu",
            "gamma",
            "zeta",
            "xi",
            "omega",
            "F",
            "DeltaPhiMax",
        ];
        match self {
            Species::Herbivore => &NAMES[..NAMES.len() - 1],
            Species::Carnivore => NAMES,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSpecies(pub String);

impl fmt::Display for UnknownSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown species '{}', expected Herbivore or Carnivore", self.0)
    }
}

impl Error for UnknownSpecies {}

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(UnknownSpecies(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    UnknownSpecies(String),
    UnknownParameter { species: Species, name: String },
    InvalidValue { name: String, value: f64 },
    UnsupportedTerrain(char),
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::UnknownSpecies(name) => {
                write!(f, "unknown species '{name}', expected Herbivore or Carnivore")
            }
            ParameterError::UnknownParameter { species, name } => {
                write!(f, "'{name}' is not a parameter of {species}")
            }
            ParameterError::InvalidValue { name, value } => {
                write!(f, "{name} must be finite and non-negative (got {value})")
            }
            ParameterError::UnsupportedTerrain(code) => {
                write!(f, "terrain '{code}' carries no food; only 'H' and 'L' accept f_max")
            }
        }
    }
}

impl Error for ParameterError {}

impl From<UnknownSpecies> for ParameterError {
    fn from(err: UnknownSpecies) -> Self {
        ParameterError::UnknownSpecies(err.0)
    }
}

/// Physiological constants shared by every animal of one species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean newborn weight.
    pub w_birth: f64,
    /// Standard deviation of newborn weight.
    pub sigma_birth: f64,
    /// Fraction of eaten food turned into body weight.
    pub beta: f64,
    /// Fraction of body weight lost every year.
    pub eta: f64,
    pub a_half: f64,
    pub phi_age: f64,
    pub w_half: f64,
    pub phi_weight: f64,
    /// Movement propensity, scaled by fitness.
    pub mu: f64,
    /// Birth probability factor.
    pub gamma: f64,
    /// Birth weight threshold factor.
    pub zeta: f64,
    /// Weight the mother loses per unit of newborn weight.
    pub xi: f64,
    /// Death probability factor.
    pub omega: f64,
    /// Maximum food (or prey weight) eaten per year.
    #[serde(rename = "F")]
    pub appetite: f64,
    /// Fitness difference at which a hunt always succeeds. Carnivores only.
    #[serde(
        rename = "DeltaPhiMax",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            appetite: 10.0,
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            appetite: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    pub fn defaults_for(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    /// Set one parameter by its external name. `species` decides which names exist.
    pub fn set(&mut self, species: Species, name: &str, value: f64) -> Result<(), ParameterError> {
        if !species.parameter_names().contains(&name) {
            return Err(ParameterError::UnknownParameter {
                species,
                name: name.to_string(),
            });
        }
        let positive_only = name == "DeltaPhiMax";
        if !value.is_finite() || value < 0.0 || (positive_only && value == 0.0) {
            return Err(ParameterError::InvalidValue {
                name: name.to_string(),
                value,
            });
        }
        let slot = match name {
            "w_birth" => &mut self.w_birth,
            "sigma_birth" => &mut self.sigma_birth,
            "beta" => &mut self.beta,
            "eta" => &mut self.eta,
            "a_half" => &mut self.a_half,
            "phi_age" => &mut self.phi_age,
            "w_half" => &mut self.w_half,
            "phi_weight" => &mut self.phi_weight,
            "mu" => &mut self.mu,
            "gamma" => &mut self.gamma,
            "zeta" => &mut self.zeta,
            "xi" => &mut self.xi,
            "omega" => &mut self.omega,
            "F" => &mut self.appetite,
            "DeltaPhiMax" => {
                self.delta_phi_max = Some(value);
                return Ok(());
            }
            _ => unreachable!("parameter_names and set disagree on '{name}'"),
        };
        *slot = value;
        Ok(())
    }

    /// Apply a whole override map. Nothing changes unless every entry is valid.
    pub fn apply_overrides(
        &mut self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), ParameterError> {
        let mut updated = self.clone();
        for (name, &value) in overrides {
            updated.set(species, name, value)?;
        }
        *self = updated;
        Ok(())
    }

    pub(crate) fn values(&self) -> [(&'static str, f64); 14] {
        [
            ("w_birth", self.w_birth),
            ("sigma_birth", self.sigma_birth),
            ("beta", self.beta),
            ("eta", self.eta),
            ("a_half", self.a_half),
            ("phi_age", self.phi_age),
            ("w_half", self.w_half),
            ("phi_weight", self.phi_weight),
            ("mu", self.mu),
            ("gamma", self.gamma),
            ("zeta", self.zeta),
            ("xi", self.xi),
            ("omega", self.omega),
            ("F", self.appetite),
        ]
    }
}

/// Per-simulation parameter table, one record per species.
///
/// Each record deserializes as a partial override of the species defaults,
/// validated like [`SpeciesParams::apply_overrides`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesTable {
    #[serde(deserialize_with = "herbivore_overrides")]
    pub herbivore: SpeciesParams,
    #[serde(deserialize_with = "carnivore_overrides")]
    pub carnivore: SpeciesParams,
}

fn params_from_overrides<'de, D>(species: Species, deserializer: D) -> Result<SpeciesParams, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, f64>::deserialize(deserializer)?;
    let mut params = SpeciesParams::defaults_for(species);
    params
        .apply_overrides(species, &overrides)
        .map_err(<D::Error as serde::de::Error>::custom)?;
    Ok(params)
}

fn herbivore_overrides<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpeciesParams, D::Error> {
    params_from_overrides(Species::Herbivore, deserializer)
}

fn carnivore_overrides<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpeciesParams, D::Error> {
    params_from_overrides(Species::Carnivore, deserializer)
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
        }
    }
}

impl SpeciesTable {
    pub fn get(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn get_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_round_trips_through_names() {
        for species in Species::ALL {
            assert_eq!(species.name().parse::<Species>(), Ok(species));
        }
        assert_eq!(
            "Wolf".parse::<Species>(),
            Err(UnknownSpecies("Wolf".to_string()))
        );
    }

    #[test]
    fn set_rejects_unknown_and_negative_parameters() {
        let mut params = SpeciesParams::herbivore();
        assert!(matches!(
            params.set(Species::Herbivore, "DeltaPhiMax", 5.0),
            Err(ParameterError::UnknownParameter { .. })
        ));
        assert!(matches!(
            params.set(Species::Herbivore, "gamma", -0.1),
            Err(ParameterError::InvalidValue { .. })
        ));
        assert!(matches!(
            params.set(Species::Herbivore, "beta", f64::NAN),
            Err(ParameterError::InvalidValue { .. })
        ));
        assert_eq!(params, SpeciesParams::herbivore());
    }

    #[test]
    fn delta_phi_max_must_be_positive() {
        let mut params = SpeciesParams::carnivore();
        assert!(params.set(Species::Carnivore, "DeltaPhiMax", 0.0).is_err());
        params.set(Species::Carnivore, "DeltaPhiMax", 0.5).unwrap();
        assert_eq!(params.delta_phi_max, Some(0.5));
    }

    #[test]
    fn apply_overrides_is_all_or_nothing() {
        let mut params = SpeciesParams::carnivore();
        let overrides = BTreeMap::from([
            ("gamma".to_string(), 100.0),
            ("nonsense".to_string(), 1.0),
        ]);
        assert!(params
            .apply_overrides(Species::Carnivore, &overrides)
            .is_err());
        assert_eq!(params.gamma, 0.8);

        let overrides = BTreeMap::from([("gamma".to_string(), 100.0), ("F".to_string(), 5.0)]);
        params
            .apply_overrides(Species::Carnivore, &overrides)
            .unwrap();
        assert_eq!(params.gamma, 100.0);
        assert_eq!(params.appetite, 5.0);
    }

    #[test]
    fn table_records_fill_missing_parameters_from_defaults() {
        let table: SpeciesTable =
            serde_json::from_str(r#"{"herbivore": {"gamma": 0.3}, "carnivore": {"F": 20.0}}"#)
                .unwrap();
        assert_eq!(
            table.herbivore,
            SpeciesParams {
                gamma: 0.3,
                ..SpeciesParams::herbivore()
            }
        );
        assert_eq!(table.carnivore.appetite, 20.0);
        assert_eq!(table.carnivore.delta_phi_max, Some(10.0));
    }

    #[test]
    fn table_records_reject_what_overrides_reject() {
        assert!(serde_json::from_str::<SpeciesTable>(r#"{"herbivore": {"DeltaPhiMax": 1.0}}"#).is_err());
        assert!(serde_json::from_str::<SpeciesTable>(r#"{"carnivore": {"F": -1.0}}"#).is_err());
        assert!(serde_json::from_str::<SpeciesTable>(r#"{"carnivore": {"DeltaPhiMax": 0.0}}"#).is_err());
    }

    #[test]
    fn herbivores_do_not_accept_delta_phi_max() {
        assert!(!Species::Herbivore.parameter_names().contains(&"DeltaPhiMax"));
        assert!(Species::Carnivore.parameter_names().contains(&"DeltaPhiMax"));
        assert_eq!(
            Species::Carnivore.parameter_names().len(),
            Species::Herbivore.parameter_names().len() + 1
        );
    }

    #[test]
    fn params_serialize_with_original_key_names() {
        let json = serde_json::to_value(SpeciesParams::carnivore()).unwrap();
        assert_eq!(json["F"], 50.0);
        assert_eq!(json["DeltaPhiMax"], 10.0);
        let json = serde_json::to_value(SpeciesParams::herbivore()).unwrap();
        assert!(json.get("DeltaPhiMax").is_none());
    }
}
