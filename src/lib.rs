//! Value function iteration for discrete-time, infinite-horizon Bellman problems.
//!
//! The crate solves consumption-savings ("cake eating") problems with one
//! continuous state (wealth `W`), one continuous control (consumption `c`) and
//! an optional discrete shock `ε` that follows a Markov chain. It offers tools to
//!
//! - describe validated state and control grids (`grid` module),
//! - express a model through the [`BellmanModel`] contract (`model` module),
//!   with deterministic and stochastic cake-eating implementations,
//! - iterate the Bellman operator to a fixed point and extract policies
//!   (`solver` module), and
//! - simulate agents under the solved policy (`simulation` module).
//!
//! Infeasible state-action pairs are represented by `-∞` in the state-action
//! tensor and never surface as errors. Value functions are extended off the
//! wealth grid by linear interpolation with a zero fill value.
//!
//! # Quick start
//!
//! ```no_run
//! use bellmanrs::grid::{ControlGrids, Grid, StateGrids, WEALTH_KEY};
//! use bellmanrs::{
//!     DeterministicCakeEating, ModelParameters, SolveOptions, Utility, ValueFunctionIterator,
//! };
//!
//! let wealth = Grid::linspace(WEALTH_KEY, 1e-2, 4.0, 200).expect("valid grid");
//! let states = StateGrids::wealth_only(wealth.clone());
//! let controls = ControlGrids::consumption_only(wealth);
//!
//! let params = ModelParameters::new(0.98, Utility::sqrt()).expect("beta in (0, 1)");
//! let solver = ValueFunctionIterator::new(DeterministicCakeEating::new(params));
//!
//! let solution = solver
//!     .solve(&states, &controls, &SolveOptions::default())
//!     .expect("well-formed problem");
//! println!("converged after {} iterations", solution.iterations);
//! println!("consumption policy: {:?}", solution.consumption_policy);
//! ```
//!
//! Progress is reported through the `log` facade and through the optional
//! observer accepted by [`ValueFunctionIterator::solve_with_observer`].

pub mod deterministic;
pub mod error;
pub mod grid;
pub mod interpolation;
pub mod model;
pub mod simulation;
pub mod solver;
pub mod solving;
pub mod stochastic;
pub mod transition;
pub mod utility;

pub use deterministic::DeterministicCakeEating;
pub use error::{Result, VfiError};
pub use model::{BellmanModel, ModelParameters, StateActionValues};
pub use solver::{Solution, Squeezed, ValueFunctionIterator};
pub use solving::{History, IterationReport, SolveOptions};
pub use stochastic::StochasticCakeEating;
pub use transition::TransitionMatrix;
pub use utility::Utility;
