//! Generic value function iteration driver and the solution it returns.

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::error::{Result, VfiError};
use crate::grid::{validate_lower_bound, ControlGrids, StateGrids};
use crate::interpolation::LinearInterpolant;
use crate::model::{BellmanModel, StateActionValues};
use crate::solving::{History, IterationReport, SolveOptions};

/// Value assigned to wealth levels outside the sampled grid.
const EXTRAPOLATION_FILL: f64 = 0.0;

/// Solves any [`BellmanModel`] by iterating the Bellman operator to a fixed point.
#[derive(Clone, Debug)]
pub struct ValueFunctionIterator<M> {
    model: M,
}

impl<M: BellmanModel> ValueFunctionIterator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Runs value function iteration without progress reporting.
    pub fn solve(
        &self,
        states: &StateGrids,
        controls: &ControlGrids,
        options: &SolveOptions,
    ) -> Result<Solution> {
        self.solve_with_observer(states, controls, options, |_| {})
    }

    /// Runs value function iteration, calling `observer` after every Bellman update.
    ///
    /// Exhausting `max_iterations` is not an error: the best-effort solution is
    /// returned with `converged == false`.
    pub fn solve_with_observer<F>(
        &self,
        states: &StateGrids,
        controls: &ControlGrids,
        options: &SolveOptions,
        mut observer: F,
    ) -> Result<Solution>
    where
        F: FnMut(IterationReport),
    {
        let shocks = states.shock_count();
        let wealth = states.wealth();
        validate_lower_bound(states, controls)?;
        self.model.validate(states, controls)?;
        options.validate(shocks, wealth.len())?;

        let mut value = options
            .initial_value
            .clone()
            .unwrap_or_else(|| DMatrix::zeros(shocks, wealth.len()));
        let mut history = History::default();
        let mut converged = false;
        let mut last_rhs = None;

        for iteration in 1..=options.max_iterations {
            let interpolants = (0..shocks)
                .map(|s| {
                    let row: Vec<f64> = value.row(s).iter().copied().collect();
                    LinearInterpolant::with_fill(wealth.as_slice(), &row, EXTRAPOLATION_FILL)
                })
                .collect::<Result<Vec<_>>>()?;

            let rhs = self
                .model
                .state_action_value(&interpolants, states, controls)?;
            check_shape(&rhs, shocks, wealth.len(), controls.consumption().len())?;

            let updated = maximize_values(&rhs)?;
            let distance = (&updated - &value).amax();
            value = updated;

            debug!("iteration {iteration}: distance {distance:.3e}");
            observer(IterationReport {
                iteration,
                distance,
            });
            history.push(value.clone(), distance);
            last_rhs = Some(rhs);

            if distance < options.tolerance {
                info!("value function converged in {iteration} iterations");
                converged = true;
                break;
            }
        }

        let iterations = history.len();
        if !converged {
            warn!(
                "maximum iterations ({}) reached; last distance {:?}",
                options.max_iterations,
                history.last_distance()
            );
        }

        let rhs = last_rhs.ok_or(VfiError::InvalidMaxIterations)?;
        let (consumption, wealth_next) = extract_policy(&rhs, states, controls)?;

        Ok(Solution {
            states: states.clone(),
            controls: controls.clone(),
            value: Squeezed::from_matrix(value),
            consumption_policy: Squeezed::from_matrix(consumption),
            wealth_policy: Squeezed::from_matrix(wealth_next),
            history,
            iterations,
            converged,
        })
    }
}

fn check_shape(
    rhs: &StateActionValues,
    shocks: usize,
    wealth: usize,
    controls: usize,
) -> Result<()> {
    let (found_shocks, found_wealth, found_controls) = rhs.shape();
    if found_shocks != shocks {
        return Err(VfiError::dimension_mismatch(
            "state-action shocks",
            shocks,
            found_shocks,
        ));
    }
    if found_wealth != wealth {
        return Err(VfiError::dimension_mismatch(
            "state-action wealth axis",
            wealth,
            found_wealth,
        ));
    }
    if found_controls != controls {
        return Err(VfiError::dimension_mismatch(
            "state-action control axis",
            controls,
            found_controls,
        ));
    }
    Ok(())
}

/// First index of the largest finite-or-infinite entry, `None` when every action is infeasible.
fn best_control(values: impl Iterator<Item = f64>) -> Result<Option<(usize, f64)>> {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.enumerate() {
        if value.is_nan() {
            return Err(VfiError::NumericalError {
                context: "state-action evaluation",
            });
        }
        if value == f64::NEG_INFINITY {
            continue;
        }
        match best {
            Some((_, current)) if current >= value => {}
            _ => best = Some((index, value)),
        }
    }
    Ok(best)
}

/// Bellman update: max over consumption, with all-infeasible states set to zero.
fn maximize_values(rhs: &StateActionValues) -> Result<DMatrix<f64>> {
    let (shocks, wealth, _) = rhs.shape();
    let mut value = DMatrix::zeros(shocks, wealth);
    for s in 0..shocks {
        let slice = rhs.slice(s);
        for w in 0..wealth {
            if let Some((_, best)) = best_control(slice.row(w).iter().copied())? {
                value[(s, w)] = best;
            }
        }
    }
    Ok(value)
}

/// Arg-max consumption and implied next-period wealth `available - c`.
///
/// States without a feasible action consume nothing and carry their
/// available wealth forward.
fn extract_policy(
    rhs: &StateActionValues,
    states: &StateGrids,
    controls: &ControlGrids,
) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
    let (shocks, wealth, _) = rhs.shape();
    let grid = controls.consumption();
    let mut consumption = DMatrix::zeros(shocks, wealth);
    let mut next_wealth = DMatrix::zeros(shocks, wealth);

    for s in 0..shocks {
        let slice = rhs.slice(s);
        for w in 0..wealth {
            let available = states.available_wealth(s, w);
            let chosen = best_control(slice.row(w).iter().copied())?
                .map_or(0.0, |(index, _)| grid[index]);
            consumption[(s, w)] = chosen;
            next_wealth[(s, w)] = available - chosen;
        }
    }

    Ok((consumption, next_wealth))
}

/// A `[shocks, |W|]` array with the shock axis dropped when it has length one.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Squeezed {
    /// Deterministic problems: one entry per wealth point.
    Vector(DVector<f64>),
    /// Stochastic problems: one row per shock state.
    Matrix(DMatrix<f64>),
}

impl Squeezed {
    pub fn from_matrix(matrix: DMatrix<f64>) -> Self {
        if matrix.nrows() == 1 {
            Self::Vector(matrix.row(0).transpose())
        } else {
            Self::Matrix(matrix)
        }
    }

    pub fn shock_count(&self) -> usize {
        match self {
            Self::Vector(_) => 1,
            Self::Matrix(matrix) => matrix.nrows(),
        }
    }

    /// Entry for shock state `shock` at wealth index `wealth`.
    pub fn get(&self, shock: usize, wealth: usize) -> f64 {
        match self {
            Self::Vector(vector) => vector[wealth],
            Self::Matrix(matrix) => matrix[(shock, wealth)],
        }
    }

    /// All wealth entries for one shock state.
    pub fn row(&self, shock: usize) -> DVector<f64> {
        match self {
            Self::Vector(vector) => vector.clone(),
            Self::Matrix(matrix) => matrix.row(shock).transpose(),
        }
    }

    /// Restores the `[shocks, |W|]` layout.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        match self {
            Self::Vector(vector) => DMatrix::from_row_slice(1, vector.len(), vector.as_slice()),
            Self::Matrix(matrix) => matrix.clone(),
        }
    }

    pub fn as_vector(&self) -> Option<&DVector<f64>> {
        match self {
            Self::Vector(vector) => Some(vector),
            Self::Matrix(_) => None,
        }
    }
}

/// Output of [`ValueFunctionIterator::solve`].
#[derive(Clone, Debug, Serialize)]
pub struct Solution {
    /// State grids used for the solve.
    pub states: StateGrids,
    /// Control grids used for the solve.
    pub controls: ControlGrids,
    /// Final value function.
    #[serde(rename = "V")]
    pub value: Squeezed,
    /// Optimal consumption per state.
    #[serde(rename = "cpol")]
    pub consumption_policy: Squeezed,
    /// Next-period wealth implied by the consumption policy.
    #[serde(rename = "wpol")]
    pub wealth_policy: Squeezed,
    /// Value functions and distances of every iteration.
    pub history: History,
    /// Number of Bellman updates performed.
    pub iterations: usize,
    /// Whether the final distance fell below the tolerance.
    pub converged: bool,
}

impl Solution {
    /// Un-squeezed value function, suitable as [`SolveOptions::with_initial_value`].
    pub fn value_matrix(&self) -> DMatrix<f64> {
        self.value.to_matrix()
    }

    /// Turns a best-effort solution into [`VfiError::DidNotConverge`].
    pub fn ensure_converged(&self) -> Result<&Self> {
        if self.converged {
            return Ok(self);
        }
        Err(VfiError::DidNotConverge {
            iterations: self.iterations,
            distance: self.history.last_distance().unwrap_or(f64::INFINITY),
        })
    }
}
