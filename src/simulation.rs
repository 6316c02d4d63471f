//! Monte Carlo simulation of an agent following a solved consumption policy.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VfiError};
use crate::interpolation::{Extrapolation, LinearInterpolant, ValueInterpolant};
use crate::solver::Solution;
use crate::transition::TransitionMatrix;

/// Starting point and length of a simulated path.
#[derive(Clone, Debug)]
pub struct SimulationOptions {
    /// Wealth at the start of the first period.
    pub initial_wealth: f64,
    /// Index of the shock state in the first period.
    pub initial_shock: usize,
    /// Number of periods to simulate.
    pub periods: usize,
    /// Seed for the shock draws.
    pub seed: u64,
}

impl SimulationOptions {
    pub fn new(initial_wealth: f64, periods: usize) -> Self {
        Self {
            initial_wealth,
            initial_shock: 0,
            periods,
            seed: 0,
        }
    }

    pub fn with_initial_shock(mut self, shock: usize) -> Self {
        self.initial_shock = shock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Realized shock indices, beginning-of-period wealth and consumption, one entry per period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPath {
    pub shocks: Vec<usize>,
    pub wealth: Vec<f64>,
    pub consumption: Vec<f64>,
}

impl SimulatedPath {
    pub fn len(&self) -> usize {
        self.wealth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wealth.is_empty()
    }
}

/// Simulates one agent under `solution`'s consumption policy.
///
/// Off-grid wealth levels use the linearly interpolated policy, held flat
/// beyond the grid and capped to the wealth available in that period. Shocks
/// evolve according to `transition`; use [`TransitionMatrix::degenerate`] for
/// deterministic solutions.
pub fn simulate(
    solution: &Solution,
    transition: &TransitionMatrix,
    options: &SimulationOptions,
) -> Result<SimulatedPath> {
    let shock_count = solution.states.shock_count();
    if transition.size() != shock_count {
        return Err(VfiError::dimension_mismatch(
            "transition matrix size",
            shock_count,
            transition.size(),
        ));
    }
    if options.initial_shock >= shock_count {
        return Err(VfiError::dimension_mismatch(
            "initial shock index",
            shock_count,
            options.initial_shock,
        ));
    }
    if !(options.initial_wealth.is_finite() && options.initial_wealth >= 0.0) {
        return Err(VfiError::NumericalError {
            context: "initial wealth validation",
        });
    }

    let wealth_grid = solution.states.wealth().as_slice();
    let policies = (0..shock_count)
        .map(|s| {
            let row = solution.consumption_policy.row(s);
            LinearInterpolant::new(wealth_grid, row.as_slice(), Extrapolation::Flat)
        })
        .collect::<Result<Vec<_>>>()?;
    let samplers = (0..shock_count)
        .map(|s| {
            WeightedIndex::<f64>::new(transition.row(s).iter().copied()).map_err(|_| {
                VfiError::NumericalError {
                    context: "transition sampling",
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let multipliers: Vec<f64> = match solution.states.shocks() {
        Some(shocks) => shocks.iter().copied().collect(),
        None => vec![1.0],
    };

    let mut rng = SmallRng::seed_from_u64(options.seed);
    let mut path = SimulatedPath {
        shocks: Vec::with_capacity(options.periods),
        wealth: Vec::with_capacity(options.periods),
        consumption: Vec::with_capacity(options.periods),
    };
    let mut wealth = options.initial_wealth;
    let mut shock = options.initial_shock;

    for _ in 0..options.periods {
        let available = multipliers[shock] * wealth;
        let consumption = policies[shock].evaluate(wealth).clamp(0.0, available.max(0.0));

        path.shocks.push(shock);
        path.wealth.push(wealth);
        path.consumption.push(consumption);

        wealth = available - consumption;
        shock = samplers[shock].sample(&mut rng);
    }

    Ok(path)
}
