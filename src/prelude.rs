pub use crate::config::{Intervention, ModelConfig, ModelConfigBuilder};
pub use crate::error::SirError;
pub use crate::integrator::{
    integrate, integrate_with_diagnostics, integrate_with_scheme, CorrectionDiagnostics,
    ForwardEuler, StepScheme,
};
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::report::ReportOptions;
pub use crate::result::{CompartmentPoint, SimulationResult};
pub use crate::scenarios::{builtin_scenarios, load_scenarios, Scenario, ScenarioSpec};
pub use crate::summary::ScenarioSummary;
pub use crate::{assert_almost_eq, assert_conserved};
