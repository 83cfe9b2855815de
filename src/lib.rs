//! Stable-fluids solver on a 2D grid with obstacles and bounded or
//! periodic edges.

pub mod config;
pub mod error;
pub mod fluid;
pub mod shape;
pub mod solver;
pub mod state;

pub use error::{FluidError, Result};
pub use fluid::{Edge, Environment, FluidProperties, FluidType};
pub use shape::{Shape, ShapeKind, ShapeParams};
pub use solver::diagnostics::Statistics;
pub use solver::{SolverParams, Spacing};
pub use state::GridState;
