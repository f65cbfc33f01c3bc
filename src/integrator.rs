//! Fixed-step forward integration of the SIR equations.
//!
//! Each step of [`integrate`] does four things, in order:
//!
//! 1. Picks the transmission rate for the step from the time at the *start* of the step (see
//!    [`ModelConfig::transmission_rate_at`]).
//! 2. Advances the three compartments with a [`StepScheme`]; the only scheme is
//!    [`ForwardEuler`].
//! 3. [`clamp`]s each compartment to its physical bounds.
//! 4. [`renormalize`]s so that the compartments again sum to the population.
//!
//! Steps 3 and 4 run unconditionally. They are kept separate from the scheme so that the update
//! rule can change without touching the conservation correction. Use
//! [`integrate_with_diagnostics`] to see how much correcting a run needed.
use serde::Serialize;

use crate::config::ModelConfig;
use crate::error::SirError;
use crate::log::{debug, trace};
use crate::numeric::relative_deviation;
use crate::result::SimulationResult;

/// The state of the three compartments at one instant, or their rates of change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compartments {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
}

impl Compartments {
    #[must_use]
    pub fn new(susceptible: f64, infected: f64, recovered: f64) -> Self {
        Compartments {
            susceptible,
            infected,
            recovered,
        }
    }

    /// The initial state described by `config`.
    #[must_use]
    pub fn initial(config: &ModelConfig) -> Self {
        Compartments::new(
            config.initial_susceptible(),
            config.initial_infected,
            config.initial_recovered,
        )
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.recovered
    }

    #[must_use]
    fn scaled(self, factor: f64) -> Self {
        Compartments::new(
            self.susceptible * factor,
            self.infected * factor,
            self.recovered * factor,
        )
    }
}

/// The right-hand side of the SIR equations at `state` for transmission rate `beta`.
#[must_use]
pub fn derivatives(config: &ModelConfig, beta: f64, state: Compartments) -> Compartments {
    let infections = beta * state.susceptible * state.infected / config.population;
    let recoveries = config.recovery_rate * state.infected;
    Compartments::new(-infections, infections - recoveries, recoveries)
}

/// A rule that advances the compartments by one step of length `dt`. Implementations only
/// compute the raw update; clamping and renormalization are applied by the integrator afterwards.
pub trait StepScheme {
    fn advance(&self, config: &ModelConfig, beta: f64, state: Compartments, dt: f64)
        -> Compartments;
}

/// Explicit (forward) Euler: `x(t + dt) = x(t) + dt * f(x(t))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardEuler;

impl StepScheme for ForwardEuler {
    fn advance(
        &self,
        config: &ModelConfig,
        beta: f64,
        state: Compartments,
        dt: f64,
    ) -> Compartments {
        let rates = derivatives(config, beta, state);
        Compartments::new(
            state.susceptible + rates.susceptible * dt,
            state.infected + rates.infected * dt,
            state.recovered + rates.recovered * dt,
        )
    }
}

/// Floors susceptible and infected at zero and caps recovered at the population. Each bound is
/// applied independently; nothing is redistributed.
#[must_use]
pub fn clamp(state: Compartments, population: f64) -> Compartments {
    Compartments::new(
        state.susceptible.max(0.0),
        state.infected.max(0.0),
        state.recovered.min(population),
    )
}

/// Rescales `state` so that its compartments sum to `population`.
///
/// Returns `state` unchanged when it already sums to `population` exactly, and also when every
/// compartment is zero, since there is nothing to scale.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn renormalize(state: Compartments, population: f64) -> Compartments {
    let total = state.total();
    if total != population && total > 0.0 {
        state.scaled(population / total)
    } else {
        state
    }
}

/// The evenly spaced time axis `0, dt, 2 dt, ..., horizon`. The last point is exactly the
/// horizon.
#[allow(clippy::cast_precision_loss)]
fn time_axis(horizon: f64, steps: usize, dt: f64) -> Vec<f64> {
    let mut time: Vec<f64> = (0..=steps).map(|index| index as f64 * dt).collect();
    time[steps] = horizon;
    time
}

/// How much clamping and renormalization a run needed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CorrectionDiagnostics {
    /// Steps in which clamping changed at least one compartment.
    pub clamped_steps: usize,
    /// Steps in which renormalization rescaled the compartments.
    pub renormalized_steps: usize,
    /// Largest `|total - population| / population` seen before renormalization.
    pub max_relative_drift: f64,
    /// Index of the step producing `max_relative_drift`; `None` if no step drifted.
    pub max_drift_step: Option<usize>,
}

impl CorrectionDiagnostics {
    #[allow(clippy::float_cmp)]
    fn record(&mut self, step: usize, raw: Compartments, clamped: Compartments, population: f64) {
        if raw != clamped {
            self.clamped_steps += 1;
        }
        let total = clamped.total();
        if total != population && total > 0.0 {
            self.renormalized_steps += 1;
            let drift = relative_deviation(total, population);
            if drift > self.max_relative_drift {
                self.max_relative_drift = drift;
                self.max_drift_step = Some(step);
            }
        }
    }
}

/// Integrates `config` with [`ForwardEuler`].
///
/// # Errors
///
/// Returns [`SirError::InvalidConfig`] if the configuration is invalid. No arrays are allocated
/// in that case.
pub fn integrate(config: &ModelConfig) -> Result<SimulationResult, SirError> {
    integrate_with_scheme(config, &ForwardEuler).map(|(result, _)| result)
}

/// Integrates `config` with [`ForwardEuler`] and reports how much correcting the run needed.
/// The returned result is identical to that of [`integrate`].
///
/// # Errors
///
/// Returns [`SirError::InvalidConfig`] if the configuration is invalid.
pub fn integrate_with_diagnostics(
    config: &ModelConfig,
) -> Result<(SimulationResult, CorrectionDiagnostics), SirError> {
    integrate_with_scheme(config, &ForwardEuler)
}

/// Integrates `config` using `scheme` for the raw update of each step.
///
/// # Errors
///
/// Returns [`SirError::InvalidConfig`] if the configuration is invalid.
pub fn integrate_with_scheme<S: StepScheme>(
    config: &ModelConfig,
    scheme: &S,
) -> Result<(SimulationResult, CorrectionDiagnostics), SirError> {
    config.validate()?;

    let steps = config.steps;
    let population = config.population;
    let dt = config.step_size();
    debug!(
        "integrating {} steps of size {} (population {}, R0 {})",
        steps,
        dt,
        population,
        config.basic_reproduction_number()
    );

    let time = time_axis(config.horizon, steps, dt);
    let mut susceptible = vec![0.0; steps + 1];
    let mut infected = vec![0.0; steps + 1];
    let mut recovered = vec![0.0; steps + 1];
    let mut diagnostics = CorrectionDiagnostics::default();

    let mut state = Compartments::initial(config);
    susceptible[0] = state.susceptible;
    infected[0] = state.infected;
    recovered[0] = state.recovered;

    for i in 0..steps {
        let beta = config.transmission_rate_at(time[i]);
        let raw = scheme.advance(config, beta, state, dt);
        let clamped = clamp(raw, population);
        diagnostics.record(i, raw, clamped, population);
        state = renormalize(clamped, population);
        if state != clamped {
            trace!(
                "step {}: renormalized total {} to {}",
                i,
                clamped.total(),
                population
            );
        }

        susceptible[i + 1] = state.susceptible;
        infected[i + 1] = state.infected;
        recovered[i + 1] = state.recovered;
    }

    debug!(
        "integration finished: {} clamped steps, {} renormalized steps, max relative drift {:e}",
        diagnostics.clamped_steps, diagnostics.renormalized_steps, diagnostics.max_relative_drift
    );
    Ok((
        SimulationResult::new(time, susceptible, infected, recovered),
        diagnostics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfigBuilder;
    use crate::{assert_almost_eq, assert_conserved};

    fn baseline() -> ModelConfigBuilder {
        ModelConfigBuilder::new()
            .population(1000.0)
            .initial_infected(1.0)
            .initial_recovered(0.0)
            .transmission_rate(0.5)
            .recovery_rate(0.1)
            .horizon(200.0)
            .steps(200)
    }

    #[test]
    fn derivatives_match_sir_equations() {
        let config = baseline().build().unwrap();
        let rates = derivatives(&config, 0.5, Compartments::new(900.0, 100.0, 0.0));
        // 0.5 * 900 * 100 / 1000 = 45
        assert_almost_eq!(rates.susceptible, -45.0, 1e-12);
        assert_almost_eq!(rates.infected, 45.0 - 10.0, 1e-12);
        assert_almost_eq!(rates.recovered, 10.0, 1e-12);
        assert_almost_eq!(rates.total(), 0.0, 1e-12);
    }

    #[test]
    fn forward_euler_single_step() {
        let config = baseline().build().unwrap();
        let next = ForwardEuler.advance(&config, 0.5, Compartments::new(900.0, 100.0, 0.0), 0.5);
        assert_almost_eq!(next.susceptible, 877.5, 1e-12);
        assert_almost_eq!(next.infected, 117.5, 1e-12);
        assert_almost_eq!(next.recovered, 5.0, 1e-12);
    }

    #[test]
    fn clamp_applies_one_sided_bounds() {
        let clamped = clamp(Compartments::new(-3.0, -0.5, 1200.0), 1000.0);
        assert_eq!(clamped, Compartments::new(0.0, 0.0, 1000.0));

        let untouched = Compartments::new(10.0, 20.0, 30.0);
        assert_eq!(clamp(untouched, 1000.0), untouched);
    }

    #[test]
    fn clamp_does_not_floor_recovered() {
        // Only the ceiling applies to recovered.
        let clamped = clamp(Compartments::new(1.0, 1.0, -2.0), 1000.0);
        assert_eq!(clamped.recovered, -2.0);
    }

    #[test]
    fn renormalize_rescales_to_population() {
        let state = renormalize(Compartments::new(500.0, 300.0, 300.0), 1000.0);
        assert_almost_eq!(state.total(), 1000.0, 1e-9);
        // Ratios are preserved.
        assert_almost_eq!(state.infected / state.recovered, 1.0, 1e-12);
        assert_almost_eq!(state.susceptible, 500.0 * 1000.0 / 1100.0, 1e-9);
    }

    #[test]
    fn renormalize_leaves_exact_total_alone() {
        let state = Compartments::new(600.0, 300.0, 100.0);
        assert_eq!(renormalize(state, 1000.0), state);
    }

    #[test]
    fn renormalize_skips_all_zero_state() {
        let state = Compartments::new(0.0, 0.0, 0.0);
        assert_eq!(renormalize(state, 1000.0), state);
    }

    #[test]
    fn time_axis_is_evenly_spaced_and_ends_at_horizon() {
        let config = baseline().horizon(10.0).steps(3).build().unwrap();
        let result = integrate(&config).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result.time()[0], 0.0);
        assert_almost_eq!(result.time()[1], 10.0 / 3.0, 1e-12);
        assert_almost_eq!(result.time()[2], 20.0 / 3.0, 1e-12);
        assert_eq!(result.time()[3], 10.0);
    }

    #[test]
    fn initial_point_matches_config() {
        let config = baseline()
            .initial_infected(5.0)
            .initial_recovered(20.0)
            .build()
            .unwrap();
        let point = integrate(&config).unwrap().point(0);
        assert_eq!(point.susceptible, 975.0);
        assert_eq!(point.infected, 5.0);
        assert_eq!(point.recovered, 20.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        for steps in [0, usize::MAX] {
            let config = ModelConfig {
                steps,
                ..ModelConfig::default()
            };
            assert!(matches!(
                integrate(&config),
                Err(SirError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn compartments_are_conserved_and_bounded() {
        let config = baseline().build().unwrap();
        let result = integrate(&config).unwrap();
        for point in result.points() {
            assert_conserved!(
                point.susceptible,
                point.infected,
                point.recovered,
                config.population
            );
            assert!(point.susceptible >= 0.0);
            assert!(point.infected >= 0.0);
            assert!(point.recovered >= 0.0 && point.recovered <= config.population);
        }
    }

    #[test]
    fn coarse_steps_stay_bounded() {
        // dt = 10 makes raw Euler updates overshoot; clamping and renormalization must hold.
        let config = baseline()
            .transmission_rate(2.0)
            .recovery_rate(0.5)
            .horizon(200.0)
            .steps(20)
            .build()
            .unwrap();
        let (result, diagnostics) = integrate_with_diagnostics(&config).unwrap();
        assert!(diagnostics.clamped_steps > 0);
        assert!(diagnostics.renormalized_steps > 0);
        assert!(diagnostics.max_drift_step.is_some());
        for point in result.points() {
            assert_conserved!(
                point.susceptible,
                point.infected,
                point.recovered,
                config.population
            );
            assert!(point.susceptible >= 0.0 && point.infected >= 0.0);
            assert!(point.recovered <= config.population);
        }
    }

    #[test]
    fn diagnostics_do_not_change_result() {
        let config = baseline().intervention(50.0, 0.15).build().unwrap();
        let (with_diagnostics, _) = integrate_with_diagnostics(&config).unwrap();
        assert_eq!(with_diagnostics, integrate(&config).unwrap());
    }

    #[test]
    fn fine_steps_need_little_correction() {
        let config = baseline().steps(20_000).build().unwrap();
        let (_, diagnostics) = integrate_with_diagnostics(&config).unwrap();
        assert_eq!(diagnostics.clamped_steps, 0);
        assert!(diagnostics.max_relative_drift < 1e-9);
    }

    #[test]
    fn integration_is_deterministic() {
        let config = baseline().intervention(50.0, 0.15).build().unwrap();
        assert_eq!(integrate(&config).unwrap(), integrate(&config).unwrap());
    }

    #[test]
    fn zero_initial_infected_means_no_epidemic() {
        let config = baseline()
            .initial_infected(0.0)
            .initial_recovered(10.0)
            .build()
            .unwrap();
        let result = integrate(&config).unwrap();
        for point in result.points() {
            assert_eq!(point.infected, 0.0);
            assert_eq!(point.susceptible, config.initial_susceptible());
            assert_eq!(point.recovered, 10.0);
        }
    }

    #[test]
    fn intervention_takes_effect_at_first_step_at_or_after_its_time() {
        // With dt = 1 the steps starting at t = 0..=49 use the baseline rate, so the two runs
        // agree up to and including index 50 and diverge from index 51.
        let without = integrate(&baseline().build().unwrap()).unwrap();
        let with = integrate(&baseline().intervention(50.0, 0.15).build().unwrap()).unwrap();
        assert_eq!(without.infected()[..=50], with.infected()[..=50]);
        assert_ne!(without.infected()[51], with.infected()[51]);
    }

    #[test]
    fn intervention_between_step_starts_waits_for_next_step() {
        // The step starting at t = 49 does not yet see an intervention at 49.5.
        let without = integrate(&baseline().build().unwrap()).unwrap();
        let with = integrate(&baseline().intervention(49.5, 0.15).build().unwrap()).unwrap();
        assert_eq!(without.infected()[..=50], with.infected()[..=50]);
        assert_ne!(without.infected()[51], with.infected()[51]);
    }

    struct Frozen;

    impl StepScheme for Frozen {
        fn advance(&self, _: &ModelConfig, _: f64, state: Compartments, _: f64) -> Compartments {
            Compartments::new(state.susceptible * 2.0, state.infected, state.recovered)
        }
    }

    #[test]
    fn custom_scheme_is_still_renormalized() {
        let config = baseline().steps(5).build().unwrap();
        let (result, diagnostics) = integrate_with_scheme(&config, &Frozen).unwrap();
        assert_eq!(diagnostics.renormalized_steps, 5);
        for point in result.points() {
            assert_conserved!(
                point.susceptible,
                point.infected,
                point.recovered,
                config.population
            );
        }
    }
}
