use thiserror::Error;

/// Unified error type for `bellmanrs` operations.
#[derive(Debug, Error)]
pub enum VfiError {
    /// Raised when provided arrays or matrices have incompatible dimensions.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required dimension, often the model-implied value.
        expected: usize,
        /// The dimension that was actually supplied.
        found: usize,
    },

    /// Raised when a required state or control grid has not been supplied.
    #[error("grid `{key}` must be provided before solving the problem")]
    MissingGrid { key: &'static str },

    /// Raised when a grid is supplied that the model has no dimension for.
    #[error("grid `{key}` is not used by this model")]
    UnexpectedGrid { key: &'static str },

    /// Raised when a grid has no points.
    #[error("grid `{key}` must contain at least one point")]
    EmptyGrid { key: &'static str },

    /// Raised when grid points decrease.
    #[error("grid `{key}` must be non-decreasing; point {index} is below its predecessor")]
    UnsortedGrid { key: &'static str, index: usize },

    /// Raised when a grid point is NaN or infinite.
    #[error("grid `{key}` has a non-finite point {value} at index {index}")]
    NonFiniteGridPoint {
        key: &'static str,
        index: usize,
        value: f64,
    },

    /// Raised when the smallest wealth point admits no consumption choice.
    #[error(
        "minimum wealth {min_wealth} is below minimum consumption {min_consumption}; \
         the lowest state would have no feasible action"
    )]
    InfeasibleLowerBound {
        min_wealth: f64,
        min_consumption: f64,
    },

    /// Raised when the discount factor lies outside `(0, 1)`.
    #[error("discount factor must lie strictly between 0 and 1, found {beta}")]
    InvalidDiscountFactor { beta: f64 },

    /// Raised when a transition matrix row does not sum to one.
    #[error("transition matrix row {row} must sum to one (slack {slack})")]
    InvalidTransitionMatrix { row: usize, slack: f64 },

    /// Raised when a transition probability lies outside `[0, 1]`.
    #[error("transition probability at ({row}, {col}) must lie in [0, 1], found {value}")]
    InvalidProbability { row: usize, col: usize, value: f64 },

    /// Raised when the convergence tolerance is not a positive finite number.
    #[error("tolerance must be positive and finite, found {tolerance}")]
    InvalidTolerance { tolerance: f64 },

    /// Raised when the iteration budget is zero.
    #[error("at least one iteration must be allowed")]
    InvalidMaxIterations,

    /// Raised when numerical routines produce NaN.
    #[error("encountered NaN during {context}")]
    NumericalError { context: &'static str },

    /// Raised by [`Solution::ensure_converged`](crate::Solution::ensure_converged) when the
    /// iteration budget ran out before the tolerance was met.
    #[error(
        "value function iteration did not converge after {iterations} iterations; last distance {distance}"
    )]
    DidNotConverge {
        /// Number of iterations performed before termination.
        iterations: usize,
        /// Sup-norm distance between the last two value functions.
        distance: f64,
    },
}

impl VfiError {
    /// Helper to format a [`DimensionMismatch`](VfiError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper for bubbling up missing grids from builders and models.
    pub fn missing_grid(key: &'static str) -> Self {
        Self::MissingGrid { key }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, VfiError>;
