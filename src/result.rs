use serde::Serialize;

/// The values of all three compartments at one time point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompartmentPoint {
    pub t: f64,
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
}

impl CompartmentPoint {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.recovered
    }
}

/// The output of one integration: a time axis evenly spaced from 0 to the horizon (inclusive)
/// and one value per time point for each compartment.
///
/// All four sequences have the same length, `steps + 1`. A result is never modified after the
/// integrator hands it out.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    time: Vec<f64>,
    susceptible: Vec<f64>,
    infected: Vec<f64>,
    recovered: Vec<f64>,
}

impl SimulationResult {
    pub(crate) fn new(
        time: Vec<f64>,
        susceptible: Vec<f64>,
        infected: Vec<f64>,
        recovered: Vec<f64>,
    ) -> Self {
        debug_assert!(
            time.len() == susceptible.len()
                && time.len() == infected.len()
                && time.len() == recovered.len()
        );
        SimulationResult {
            time,
            susceptible,
            infected,
            recovered,
        }
    }

    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    #[must_use]
    pub fn susceptible(&self) -> &[f64] {
        &self.susceptible
    }

    #[must_use]
    pub fn infected(&self) -> &[f64] {
        &self.infected
    }

    #[must_use]
    pub fn recovered(&self) -> &[f64] {
        &self.recovered
    }

    /// Number of time points (`steps + 1`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn point(&self, index: usize) -> CompartmentPoint {
        CompartmentPoint {
            t: self.time[index],
            susceptible: self.susceptible[index],
            infected: self.infected[index],
            recovered: self.recovered[index],
        }
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = CompartmentPoint> + '_ {
        (0..self.len()).map(|index| self.point(index))
    }

    /// The last time point, at the horizon.
    #[must_use]
    pub fn final_point(&self) -> CompartmentPoint {
        self.point(self.len() - 1)
    }

    /// Returns `(time, infected)` at the largest infected value. Ties resolve to the earliest
    /// time point.
    #[must_use]
    pub fn peak_infected(&self) -> (f64, f64) {
        let mut peak_index = 0;
        for (index, &value) in self.infected.iter().enumerate() {
            if value > self.infected[peak_index] {
                peak_index = index;
            }
        }
        (self.time[peak_index], self.infected[peak_index])
    }
}
