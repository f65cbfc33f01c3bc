//! Model configuration for a single SIR scenario.
//!
//! A [`ModelConfig`] is an immutable set of scalars: population size, initial compartment sizes,
//! the transmission and recovery rates, the simulated horizon and how many steps to divide it
//! into, and at most one [`Intervention`] that replaces the transmission rate from a given time
//! onwards.
//!
//! Construct one with [`ModelConfigBuilder`], which validates on `build()`, or deserialize a
//! [`ScenarioSpec`](crate::scenarios::ScenarioSpec) from JSON.
use serde::{Deserialize, Serialize};

use crate::error::SirError;

/// A single change of the transmission rate. From `time` onwards (inclusive) the model uses
/// `rate` in place of the baseline transmission rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub time: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Total population `N`; constant over the run.
    pub population: f64,
    pub initial_infected: f64,
    pub initial_recovered: f64,
    /// Baseline transmission rate β.
    pub transmission_rate: f64,
    /// Recovery rate γ, the inverse of the mean infectious duration.
    pub recovery_rate: f64,
    /// Total simulated time span.
    pub horizon: f64,
    /// Number of equal time intervals the horizon is divided into.
    pub steps: usize,
    pub intervention: Option<Intervention>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            population: 1000.0,
            initial_infected: 1.0,
            initial_recovered: 0.0,
            transmission_rate: 0.5,
            recovery_rate: 0.1,
            horizon: 200.0,
            steps: 200,
            intervention: None,
        }
    }
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<(), SirError> {
    if condition {
        Ok(())
    } else {
        Err(SirError::InvalidConfig(message()))
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), SirError> {
    check(value.is_finite(), || format!("{name} must be finite, got {value}"))
}

impl ModelConfig {
    /// Checks every constraint on the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SirError::InvalidConfig`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), SirError> {
        check_finite("population", self.population)?;
        check_finite("initial_infected", self.initial_infected)?;
        check_finite("initial_recovered", self.initial_recovered)?;
        check_finite("transmission_rate", self.transmission_rate)?;
        check_finite("recovery_rate", self.recovery_rate)?;
        check_finite("horizon", self.horizon)?;

        check(self.population > 0.0, || {
            format!("population must be positive, got {}", self.population)
        })?;
        check(self.steps > 0, || "steps must be positive, got 0".to_string())?;
        check(self.steps.checked_add(1).is_some(), || {
            format!("steps must leave room for the initial point, got {}", self.steps)
        })?;
        check(self.horizon > 0.0, || {
            format!("horizon must be positive, got {}", self.horizon)
        })?;
        check(self.initial_infected >= 0.0, || {
            format!(
                "initial_infected must be non-negative, got {}",
                self.initial_infected
            )
        })?;
        check(self.initial_recovered >= 0.0, || {
            format!(
                "initial_recovered must be non-negative, got {}",
                self.initial_recovered
            )
        })?;
        check(self.initial_infected <= self.population, || {
            format!(
                "initial_infected ({}) exceeds population ({})",
                self.initial_infected, self.population
            )
        })?;
        check(
            self.initial_recovered <= self.population - self.initial_infected,
            || {
                format!(
                    "initial_recovered ({}) exceeds population minus initial_infected ({})",
                    self.initial_recovered,
                    self.population - self.initial_infected
                )
            },
        )?;
        check(self.transmission_rate >= 0.0, || {
            format!(
                "transmission_rate must be non-negative, got {}",
                self.transmission_rate
            )
        })?;
        check(self.recovery_rate > 0.0, || {
            format!(
                "recovery_rate must be positive, got {}",
                self.recovery_rate
            )
        })?;

        if let Some(Intervention { time, rate }) = self.intervention {
            check_finite("intervention_time", time)?;
            check_finite("intervention_rate", rate)?;
            check(rate >= 0.0, || {
                format!("intervention_rate must be non-negative, got {rate}")
            })?;
        }
        Ok(())
    }

    #[must_use]
    pub fn initial_susceptible(&self) -> f64 {
        self.population - self.initial_infected - self.initial_recovered
    }

    /// The fixed step size `horizon / steps`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn step_size(&self) -> f64 {
        self.horizon / self.steps as f64
    }

    /// Basic reproduction number `R0 = β / γ`, computed from the baseline transmission rate.
    #[must_use]
    pub fn basic_reproduction_number(&self) -> f64 {
        self.transmission_rate / self.recovery_rate
    }

    /// Fraction of the population that must be immune for the infected count to decline,
    /// `1 - 1 / R0`. Zero when `R0 <= 1`.
    #[must_use]
    pub fn herd_immunity_threshold(&self) -> f64 {
        let r0 = self.basic_reproduction_number();
        if r0 <= 1.0 {
            0.0
        } else {
            1.0 - 1.0 / r0
        }
    }

    /// The transmission rate in effect for a step that starts at time `t`.
    ///
    /// This is a step function evaluated at the left endpoint: the intervention rate applies
    /// from the first step whose start time is at or after the intervention time, never earlier.
    #[must_use]
    pub fn transmission_rate_at(&self, t: f64) -> f64 {
        match self.intervention {
            Some(Intervention { time, rate }) if t >= time => rate,
            _ => self.transmission_rate,
        }
    }
}

/// Builds a [`ModelConfig`], starting from [`ModelConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct ModelConfigBuilder {
    config: ModelConfig,
}

impl ModelConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn population(mut self, population: f64) -> Self {
        self.config.population = population;
        self
    }

    #[must_use]
    pub fn initial_infected(mut self, initial_infected: f64) -> Self {
        self.config.initial_infected = initial_infected;
        self
    }

    #[must_use]
    pub fn initial_recovered(mut self, initial_recovered: f64) -> Self {
        self.config.initial_recovered = initial_recovered;
        self
    }

    #[must_use]
    pub fn transmission_rate(mut self, transmission_rate: f64) -> Self {
        self.config.transmission_rate = transmission_rate;
        self
    }

    #[must_use]
    pub fn recovery_rate(mut self, recovery_rate: f64) -> Self {
        self.config.recovery_rate = recovery_rate;
        self
    }

    #[must_use]
    pub fn horizon(mut self, horizon: f64) -> Self {
        self.config.horizon = horizon;
        self
    }

    #[must_use]
    pub fn steps(mut self, steps: usize) -> Self {
        self.config.steps = steps;
        self
    }

    #[must_use]
    pub fn intervention(mut self, time: f64, rate: f64) -> Self {
        self.config.intervention = Some(Intervention { time, rate });
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SirError::InvalidConfig`] if any constraint is violated.
    pub fn build(self) -> Result<ModelConfig, SirError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    fn expect_invalid(builder: ModelConfigBuilder, fragment: &str) {
        match builder.build() {
            Err(SirError::InvalidConfig(message)) => assert!(
                message.contains(fragment),
                "expected `{fragment}` in `{message}`"
            ),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = ModelConfigBuilder::new().build().unwrap();
        assert_eq!(config, ModelConfig::default());
        assert_almost_eq!(config.initial_susceptible(), 999.0, 1e-12);
    }

    #[test]
    fn derived_quantities() {
        let config = ModelConfigBuilder::new()
            .transmission_rate(0.5)
            .recovery_rate(0.1)
            .horizon(100.0)
            .steps(400)
            .build()
            .unwrap();
        assert_almost_eq!(config.basic_reproduction_number(), 5.0, 1e-12);
        assert_almost_eq!(config.herd_immunity_threshold(), 0.8, 1e-12);
        assert_almost_eq!(config.step_size(), 0.25, 1e-15);
    }

    #[test]
    fn herd_immunity_threshold_is_zero_below_one() {
        let config = ModelConfigBuilder::new()
            .transmission_rate(0.05)
            .recovery_rate(0.1)
            .build()
            .unwrap();
        assert_eq!(config.herd_immunity_threshold(), 0.0);
    }

    #[test]
    fn transmission_rate_switches_at_intervention_time() {
        let config = ModelConfigBuilder::new()
            .transmission_rate(0.5)
            .intervention(50.0, 0.15)
            .build()
            .unwrap();
        assert_eq!(config.transmission_rate_at(0.0), 0.5);
        assert_eq!(config.transmission_rate_at(49.999), 0.5);
        assert_eq!(config.transmission_rate_at(50.0), 0.15);
        assert_eq!(config.transmission_rate_at(150.0), 0.15);
    }

    #[test]
    fn transmission_rate_without_intervention_is_constant() {
        let config = ModelConfig::default();
        assert_eq!(config.transmission_rate_at(1e9), config.transmission_rate);
    }

    #[test]
    fn rejects_zero_steps() {
        expect_invalid(ModelConfigBuilder::new().steps(0), "steps");
    }

    #[test]
    fn rejects_step_count_without_room_for_the_initial_point() {
        expect_invalid(ModelConfigBuilder::new().steps(usize::MAX), "steps");
        assert!(ModelConfigBuilder::new().steps(usize::MAX - 1).build().is_ok());
    }

    #[test]
    fn rejects_non_positive_population() {
        expect_invalid(ModelConfigBuilder::new().population(0.0), "population");
        expect_invalid(ModelConfigBuilder::new().population(-5.0), "population");
    }

    #[test]
    fn rejects_non_positive_horizon() {
        expect_invalid(ModelConfigBuilder::new().horizon(0.0), "horizon");
    }

    #[test]
    fn rejects_initial_compartments_exceeding_population() {
        expect_invalid(
            ModelConfigBuilder::new()
                .population(100.0)
                .initial_infected(101.0),
            "initial_infected",
        );
        expect_invalid(
            ModelConfigBuilder::new()
                .population(100.0)
                .initial_infected(60.0)
                .initial_recovered(50.0),
            "initial_recovered",
        );
    }

    #[test]
    fn rejects_negative_values() {
        expect_invalid(
            ModelConfigBuilder::new().initial_infected(-1.0),
            "initial_infected",
        );
        expect_invalid(
            ModelConfigBuilder::new().transmission_rate(-0.1),
            "transmission_rate",
        );
        expect_invalid(ModelConfigBuilder::new().recovery_rate(0.0), "recovery_rate");
        expect_invalid(
            ModelConfigBuilder::new().intervention(10.0, -0.2),
            "intervention_rate",
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        expect_invalid(ModelConfigBuilder::new().population(f64::NAN), "finite");
        expect_invalid(
            ModelConfigBuilder::new().horizon(f64::INFINITY),
            "finite",
        );
        expect_invalid(
            ModelConfigBuilder::new().intervention(f64::NAN, 0.1),
            "intervention_time",
        );
    }
}
