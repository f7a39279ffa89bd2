//! Entropic optimal transport with learned warm starts.
//!
//! This facade crate re-exports the warmkhorn crates and hosts the
//! end-to-end comparison between a cold Sinkhorn solve and one warm-started
//! by a trained meta initializer.
//!
//! ## Crate Organization
//!
//! - [`core`]: Type aliases, constants, and logging setup
//! - [`transport`]: Point clouds, problems, and the Sinkhorn solver
//! - [`meta`]: Neural meta initializer trained on the dual objective
mod scenario;

pub use scenario::*;

pub use warmkhorn_core      as core;
pub use warmkhorn_meta      as meta;
pub use warmkhorn_transport as transport;
