//! Display quantities derived from a finished run.
use serde::Serialize;

use crate::result::SimulationResult;
use crate::scenarios::Scenario;

/// One row of the scenario comparison: the inputs a reader needs to label a run and the
/// headline numbers of its outbreak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub color: Option<String>,
    pub population: f64,
    pub transmission_rate: f64,
    pub recovery_rate: f64,
    /// `β / γ` from the baseline transmission rate.
    pub basic_reproduction_number: f64,
    pub intervention_time: Option<f64>,
    pub intervention_rate: Option<f64>,
    pub peak_infected: f64,
    pub peak_time: f64,
    pub final_susceptible: f64,
    pub final_recovered: f64,
    /// Share of the initially susceptible population infected over the run.
    pub attack_rate: f64,
}

impl ScenarioSummary {
    #[must_use]
    pub fn new(scenario: &Scenario, result: &SimulationResult) -> Self {
        let config = &scenario.config;
        let (peak_time, peak_infected) = result.peak_infected();
        let last = result.final_point();
        let initial_susceptible = config.initial_susceptible();
        let attack_rate = if initial_susceptible > 0.0 {
            (initial_susceptible - last.susceptible) / initial_susceptible
        } else {
            0.0
        };

        ScenarioSummary {
            name: scenario.name.clone(),
            color: scenario.color.clone(),
            population: config.population,
            transmission_rate: config.transmission_rate,
            recovery_rate: config.recovery_rate,
            basic_reproduction_number: config.basic_reproduction_number(),
            intervention_time: config.intervention.map(|i| i.time),
            intervention_rate: config.intervention.map(|i| i.rate),
            peak_infected,
            peak_time,
            final_susceptible: last.susceptible,
            final_recovered: last.recovered,
            attack_rate,
        }
    }
}
