//! Named scenarios: a [`ModelConfig`] plus the labels used when reporting on it.
//!
//! Scenarios come either from [`builtin_scenarios`] or from a JSON file read with
//! [`load_scenarios`]. The file holds a single scenario object or an array of them:
//!
//! ```json
//! [
//!   {
//!     "name": "Late intervention",
//!     "color": "green",
//!     "population": 100000,
//!     "initial_infected": 10,
//!     "transmission_rate": 0.5,
//!     "recovery_rate": 0.1,
//!     "horizon": 200,
//!     "steps": 200,
//!     "intervention_time": 50,
//!     "intervention_rate": 0.15
//!   }
//! ]
//! ```
//!
//! `initial_recovered` defaults to zero. `intervention_time` and `intervention_rate` must be
//! given together or not at all.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{Intervention, ModelConfig};
use crate::error::SirError;
use crate::log::debug;

/// The on-disk form of a scenario. Unvalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub population: f64,
    pub initial_infected: f64,
    #[serde(default)]
    pub initial_recovered: f64,
    pub transmission_rate: f64,
    pub recovery_rate: f64,
    pub horizon: f64,
    pub steps: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_rate: Option<f64>,
}

/// A validated scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    /// Display color for presentation layers; purely cosmetic.
    pub color: Option<String>,
    pub config: ModelConfig,
}

impl Scenario {
    /// Validates `config` and wraps it with a name.
    ///
    /// # Errors
    ///
    /// Returns [`SirError::InvalidConfig`] if `config` is invalid.
    pub fn new(name: impl Into<String>, config: ModelConfig) -> Result<Self, SirError> {
        config.validate()?;
        Ok(Scenario {
            name: name.into(),
            color: None,
            config,
        })
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl TryFrom<ScenarioSpec> for Scenario {
    type Error = SirError;

    fn try_from(spec: ScenarioSpec) -> Result<Self, Self::Error> {
        let intervention = match (spec.intervention_time, spec.intervention_rate) {
            (Some(time), Some(rate)) => Some(Intervention { time, rate }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(SirError::InvalidConfig(format!(
                    "scenario `{}` sets intervention_time without intervention_rate",
                    spec.name
                )))
            }
            (None, Some(_)) => {
                return Err(SirError::InvalidConfig(format!(
                    "scenario `{}` sets intervention_rate without intervention_time",
                    spec.name
                )))
            }
        };
        let config = ModelConfig {
            population: spec.population,
            initial_infected: spec.initial_infected,
            initial_recovered: spec.initial_recovered,
            transmission_rate: spec.transmission_rate,
            recovery_rate: spec.recovery_rate,
            horizon: spec.horizon,
            steps: spec.steps,
            intervention,
        };
        config.validate().map_err(|e| match e {
            SirError::InvalidConfig(message) => {
                SirError::InvalidConfig(format!("scenario `{}`: {message}", spec.name))
            }
            other => other,
        })?;
        Ok(Scenario {
            name: spec.name,
            color: spec.color,
            config,
        })
    }
}

impl From<&Scenario> for ScenarioSpec {
    fn from(scenario: &Scenario) -> Self {
        let config = &scenario.config;
        ScenarioSpec {
            name: scenario.name.clone(),
            color: scenario.color.clone(),
            population: config.population,
            initial_infected: config.initial_infected,
            initial_recovered: config.initial_recovered,
            transmission_rate: config.transmission_rate,
            recovery_rate: config.recovery_rate,
            horizon: config.horizon,
            steps: config.steps,
            intervention_time: config.intervention.map(|i| i.time),
            intervention_rate: config.intervention.map(|i| i.rate),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Many(Vec<ScenarioSpec>),
    One(ScenarioSpec),
}

/// Parses and validates scenarios from a JSON string.
///
/// # Errors
///
/// Returns [`SirError::JsonError`] if the text is not a scenario object or array, and
/// [`SirError::InvalidConfig`] if any scenario is invalid or the array is empty.
pub fn parse_scenarios(json: &str) -> Result<Vec<Scenario>, SirError> {
    let specs = match serde_json::from_str::<ScenarioFile>(json)? {
        ScenarioFile::Many(specs) => specs,
        ScenarioFile::One(spec) => vec![spec],
    };
    if specs.is_empty() {
        return Err(SirError::InvalidConfig(
            "scenario file contains no scenarios".to_string(),
        ));
    }
    specs.into_iter().map(Scenario::try_from).collect()
}

/// Reads and validates scenarios from the JSON file at `path`.
///
/// # Errors
///
/// Returns [`SirError::IoError`] if the file cannot be read, otherwise as [`parse_scenarios`].
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>, SirError> {
    debug!("loading scenarios from {}", path.display());
    let json = fs::read_to_string(path)?;
    let scenarios = parse_scenarios(&json)?;
    debug!("loaded {} scenarios from {}", scenarios.len(), path.display());
    Ok(scenarios)
}

const BUILTIN_POPULATION: f64 = 100_000.0;
const BUILTIN_INITIAL_INFECTED: f64 = 10.0;
const BUILTIN_HORIZON: f64 = 200.0;
const BUILTIN_STEPS: usize = 200;

fn builtin(
    name: &str,
    color: &str,
    transmission_rate: f64,
    recovery_rate: f64,
    intervention: Option<Intervention>,
) -> Scenario {
    Scenario {
        name: name.to_string(),
        color: Some(color.to_string()),
        config: ModelConfig {
            population: BUILTIN_POPULATION,
            initial_infected: BUILTIN_INITIAL_INFECTED,
            initial_recovered: 0.0,
            transmission_rate,
            recovery_rate,
            horizon: BUILTIN_HORIZON,
            steps: BUILTIN_STEPS,
            intervention,
        },
    }
}

/// Four scenarios over a population of 100,000 with 10 initial infections, simulated for 200
/// days at one step per day:
///
/// 1. A highly contagious disease, β = 0.5, γ = 0.1 (R0 = 5).
/// 2. A mildly contagious disease, β = 0.2, γ = 0.1 (R0 = 2).
/// 3. The first disease with an intervention on day 50 that lowers β to 0.15.
/// 4. Slow recovery, β = 0.3, γ = 0.05 (R0 = 6).
#[must_use]
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        builtin(
            "Highly contagious disease (high beta)",
            "red",
            0.5,
            0.1,
            None,
        ),
        builtin(
            "Mildly contagious disease (low beta)",
            "blue",
            0.2,
            0.1,
            None,
        ),
        builtin(
            "Late intervention (beta reduction)",
            "green",
            0.5,
            0.1,
            Some(Intervention {
                time: 50.0,
                rate: 0.15,
            }),
        ),
        builtin("Slow recovery (low gamma)", "purple", 0.3, 0.05, None),
    ]
}
