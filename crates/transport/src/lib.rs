//! Entropic optimal transport between weighted point clouds.
//!
//! Computes regularized transport plans and dual potentials between two
//! discrete distributions embedded in a shared Euclidean space. Solves are
//! warm-startable through the [`Initializer`] seam.
//!
//! ## Algorithms
//!
//! - [`Sinkhorn`]: alternating marginal projections, in the log domain
//!   (stable for small epsilon) or the kernel domain (cheaper per step)
//!
//! ## Core Types
//!
//! - [`PointCloud`]: ground cost geometry, materialized or batched
//! - [`LinearProblem`]: geometry plus source and target [`Marginal`]s
//! - [`SinkhornOutput`]: potentials, convergence record, and the dual objective
//! - [`Plan`]: the coupling recovered from a solve
//!
//! ## Traits
//!
//! - [`Coupling`]: a transport plan between two distributions
//! - [`Density`]: a discrete probability distribution
//! - [`Measure`]: ground cost between support elements
//! - [`Support`]: marker for support elements
mod axis;
mod config;
mod cost;
mod coupling;
mod density;
mod error;
mod generator;
mod initializer;
mod lse;
mod marginal;
mod measure;
mod output;
mod plan;
mod pointcloud;
mod problem;
mod sinkhorn;
mod support;

pub use axis::*;
pub use config::*;
pub use cost::*;
pub use coupling::*;
pub use density::*;
pub use error::*;
pub use generator::*;
pub use initializer::*;
pub use lse::*;
pub use marginal::*;
pub use measure::*;
pub use output::*;
pub use plan::*;
pub use pointcloud::*;
pub use problem::*;
pub use sinkhorn::*;
pub use support::*;
