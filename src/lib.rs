//! Deterministic simulation of an infectious-disease outbreak with the
//! Susceptible–Infected–Recovered (SIR) compartmental model.
//!
//! A run is described by a [`ModelConfig`](config::ModelConfig): the population, the initial
//! sizes of the three compartments, the transmission rate β, the recovery rate γ, how long to
//! simulate and in how many steps, and optionally one [`Intervention`](config::Intervention)
//! that replaces β from a given time onwards.
//!
//! The [`integrator`] advances the compartments with fixed-step forward Euler. After every step
//! it clamps each compartment to its physical bounds and rescales the three so that they sum to
//! the population again. The output is a [`SimulationResult`](result::SimulationResult): a time
//! axis and one series per compartment, all `steps + 1` long.
//!
//! ```rust
//! use sir_euler::prelude::*;
//!
//! let config = ModelConfigBuilder::new()
//!     .population(1000.0)
//!     .initial_infected(1.0)
//!     .transmission_rate(0.5)
//!     .recovery_rate(0.1)
//!     .intervention(50.0, 0.15)
//!     .build()
//!     .unwrap();
//! let result = integrate(&config).unwrap();
//! let (day, peak) = result.peak_infected();
//! println!("peak of {peak:.0} infected on day {day}");
//! ```
//!
//! Around the integrator sit the pieces needed to run it as a tool:
//! * [`scenarios`]: named scenarios, built-in or loaded from JSON
//! * [`summary`]: peak, attack rate and R0 of a finished run
//! * [`report`]: CSV output of time series and summaries
//! * [`runner`]: the command line entry point used by the `sir-euler` binary
//! * [`log`]: console logging
pub mod config;
pub mod error;
pub mod integrator;
pub mod log;
mod macros;
pub mod numeric;
pub mod prelude;
pub mod report;
pub mod result;
pub mod runner;
pub mod scenarios;
pub mod summary;

pub use error::SirError;
