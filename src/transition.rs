//! Markov transition matrices for the discrete shock.

use nalgebra::{DMatrix, RowDVector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VfiError};

/// Largest admissible deviation of a row sum from one.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Row-stochastic matrix `P` with `P[i, j] = Pr(next shock = j | current shock = i)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DMatrix<f64>", into = "DMatrix<f64>")]
pub struct TransitionMatrix {
    matrix: DMatrix<f64>,
}

impl TransitionMatrix {
    /// Validates squareness, entry bounds and row sums.
    pub fn new(matrix: DMatrix<f64>) -> Result<Self> {
        let n = matrix.nrows();
        if n == 0 {
            return Err(VfiError::dimension_mismatch("transition matrix rows", 1, 0));
        }
        if matrix.ncols() != n {
            return Err(VfiError::dimension_mismatch(
                "transition matrix columns",
                n,
                matrix.ncols(),
            ));
        }

        for row in 0..n {
            for col in 0..n {
                let value = matrix[(row, col)];
                if !(0.0..=1.0).contains(&value) {
                    return Err(VfiError::InvalidProbability { row, col, value });
                }
            }
            let slack = (matrix.row(row).sum() - 1.0).abs();
            if slack > ROW_SUM_TOLERANCE {
                return Err(VfiError::InvalidTransitionMatrix { row, slack });
            }
        }

        Ok(Self { matrix })
    }

    /// Builds a matrix from `n * n` entries in row-major order.
    pub fn from_row_slice(n: usize, entries: &[f64]) -> Result<Self> {
        if entries.len() != n * n {
            return Err(VfiError::dimension_mismatch(
                "transition matrix entries",
                n * n,
                entries.len(),
            ));
        }
        Self::new(DMatrix::from_row_slice(n, n, entries))
    }

    /// The single-state chain `[[1.0]]`.
    pub fn degenerate() -> Self {
        Self {
            matrix: DMatrix::from_element(1, 1, 1.0),
        }
    }

    /// Number of shock states.
    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn probability(&self, from: usize, to: usize) -> f64 {
        self.matrix[(from, to)]
    }

    /// Conditional distribution of next period's shock given current shock `from`.
    pub fn row(&self, from: usize) -> RowDVector<f64> {
        self.matrix.row(from).into_owned()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

impl TryFrom<DMatrix<f64>> for TransitionMatrix {
    type Error = VfiError;

    fn try_from(matrix: DMatrix<f64>) -> Result<Self> {
        Self::new(matrix)
    }
}

impl From<TransitionMatrix> for DMatrix<f64> {
    fn from(value: TransitionMatrix) -> Self {
        value.matrix
    }
}
