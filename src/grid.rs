//! State and control grids, plus the validation that runs before any numerical work.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VfiError};

/// Key of the mandatory wealth state grid.
pub const WEALTH_KEY: &str = "W";
/// Key of the optional shock state grid.
pub const SHOCK_KEY: &str = "epsilon";
/// Key of the mandatory consumption control grid.
pub const CONSUMPTION_KEY: &str = "c";

/// Key reported by grids deserialized on their own, outside a named dimension.
pub const UNNAMED_KEY: &str = "grid";

/// Ordered, finite sample points for one state or control dimension.
///
/// Serializes as a plain list of numbers; deserialization runs the same
/// validation as [`Grid::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Grid {
    points: DVector<f64>,
}

impl Grid {
    /// Validates that `values` is non-empty, finite and non-decreasing.
    ///
    /// `key` names the dimension in error messages.
    pub fn new(key: &'static str, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(VfiError::EmptyGrid { key });
        }
        for (index, value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(VfiError::NonFiniteGridPoint {
                    key,
                    index,
                    value: *value,
                });
            }
        }
        if let Some(index) = values.windows(2).position(|w| w[1] < w[0]) {
            return Err(VfiError::UnsortedGrid {
                key,
                index: index + 1,
            });
        }

        Ok(Self {
            points: DVector::from_vec(values),
        })
    }

    /// `n` evenly spaced points on `[start, end]`, both ends included.
    ///
    /// `key` names the dimension in error messages, as in [`Grid::new`].
    pub fn linspace(key: &'static str, start: f64, end: f64, n: usize) -> Result<Self> {
        let values = match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                    .collect()
            }
        };
        Self::new(key, values)
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Grids are never empty; provided for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest grid point.
    pub fn min(&self) -> f64 {
        self.points[0]
    }

    /// Largest grid point.
    pub fn max(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Returns a read-only view of the grid points.
    pub fn values(&self) -> &DVector<f64> {
        &self.points
    }

    pub fn as_slice(&self) -> &[f64] {
        self.points.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.points.iter()
    }
}

impl std::ops::Index<usize> for Grid {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.points[index]
    }
}

impl TryFrom<Vec<f64>> for Grid {
    type Error = VfiError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(UNNAMED_KEY, values)
    }
}

impl From<Grid> for Vec<f64> {
    fn from(grid: Grid) -> Self {
        grid.points.as_slice().to_vec()
    }
}

/// State dimensions of a problem: wealth, optionally crossed with a discrete shock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStateGrids")]
pub struct StateGrids {
    #[serde(rename = "W")]
    wealth: Grid,
    #[serde(rename = "epsilon", skip_serializing_if = "Option::is_none")]
    shocks: Option<Grid>,
}

impl StateGrids {
    /// Starts a builder; the wealth grid is mandatory.
    pub fn builder() -> StateGridsBuilder {
        StateGridsBuilder::default()
    }

    /// Deterministic state space consisting of wealth only.
    pub fn wealth_only(wealth: Grid) -> Self {
        Self {
            wealth,
            shocks: None,
        }
    }

    /// Wealth crossed with a discrete multiplicative shock.
    pub fn with_shocks(wealth: Grid, shocks: Grid) -> Self {
        Self {
            wealth,
            shocks: Some(shocks),
        }
    }

    pub fn wealth(&self) -> &Grid {
        &self.wealth
    }

    pub fn shocks(&self) -> Option<&Grid> {
        self.shocks.as_ref()
    }

    /// Size of the non-wealth state dimension (1 when there is no shock).
    pub fn shock_count(&self) -> usize {
        self.shocks.as_ref().map_or(1, Grid::len)
    }

    /// Resources available for consumption in state `(shock, wealth_index)`:
    /// `W` without a shock grid, `ε·W` otherwise.
    pub fn available_wealth(&self, shock: usize, wealth_index: usize) -> f64 {
        let wealth = self.wealth[wealth_index];
        match &self.shocks {
            Some(shocks) => shocks[shock] * wealth,
            None => wealth,
        }
    }
}

/// Wire form of [`StateGrids`], validated per dimension so errors carry `W` or `epsilon`.
#[derive(Deserialize)]
struct RawStateGrids {
    #[serde(rename = "W")]
    wealth: Vec<f64>,
    #[serde(rename = "epsilon", default)]
    shocks: Option<Vec<f64>>,
}

impl TryFrom<RawStateGrids> for StateGrids {
    type Error = VfiError;

    fn try_from(raw: RawStateGrids) -> Result<Self> {
        Ok(Self {
            wealth: Grid::new(WEALTH_KEY, raw.wealth)?,
            shocks: raw
                .shocks
                .map(|values| Grid::new(SHOCK_KEY, values))
                .transpose()?,
        })
    }
}

/// Builder that reports a missing wealth grid before any numerical work starts.
#[derive(Debug, Default)]
pub struct StateGridsBuilder {
    wealth: Option<Grid>,
    shocks: Option<Grid>,
}

impl StateGridsBuilder {
    /// Sets the wealth grid (`"W"`).
    pub fn wealth(mut self, grid: Grid) -> Self {
        self.wealth = Some(grid);
        self
    }

    /// Sets the shock grid (`"epsilon"`).
    pub fn shocks(mut self, grid: Grid) -> Self {
        self.shocks = Some(grid);
        self
    }

    pub fn build(self) -> Result<StateGrids> {
        let wealth = self
            .wealth
            .ok_or_else(|| VfiError::missing_grid(WEALTH_KEY))?;
        Ok(StateGrids {
            wealth,
            shocks: self.shocks,
        })
    }
}

/// Control dimensions of a problem. Only consumption is supported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawControlGrids")]
pub struct ControlGrids {
    #[serde(rename = "c")]
    consumption: Grid,
}

impl ControlGrids {
    pub fn builder() -> ControlGridsBuilder {
        ControlGridsBuilder::default()
    }

    pub fn consumption_only(consumption: Grid) -> Self {
        Self { consumption }
    }

    pub fn consumption(&self) -> &Grid {
        &self.consumption
    }
}

#[derive(Deserialize)]
struct RawControlGrids {
    #[serde(rename = "c")]
    consumption: Vec<f64>,
}

impl TryFrom<RawControlGrids> for ControlGrids {
    type Error = VfiError;

    fn try_from(raw: RawControlGrids) -> Result<Self> {
        Ok(Self {
            consumption: Grid::new(CONSUMPTION_KEY, raw.consumption)?,
        })
    }
}

/// Builder that reports a missing consumption grid before any numerical work starts.
#[derive(Debug, Default)]
pub struct ControlGridsBuilder {
    consumption: Option<Grid>,
}

impl ControlGridsBuilder {
    /// Sets the consumption grid (`"c"`).
    pub fn consumption(mut self, grid: Grid) -> Self {
        self.consumption = Some(grid);
        self
    }

    pub fn build(self) -> Result<ControlGrids> {
        let consumption = self
            .consumption
            .ok_or_else(|| VfiError::missing_grid(CONSUMPTION_KEY))?;
        Ok(ControlGrids { consumption })
    }
}

/// Rejects grids whose lowest wealth point cannot afford the cheapest consumption choice.
pub fn validate_lower_bound(states: &StateGrids, controls: &ControlGrids) -> Result<()> {
    let min_wealth = states.wealth().min();
    let min_consumption = controls.consumption().min();
    if min_wealth < min_consumption {
        return Err(VfiError::InfeasibleLowerBound {
            min_wealth,
            min_consumption,
        });
    }
    Ok(())
}
