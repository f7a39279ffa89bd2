//! Neural meta initializer for Sinkhorn solves.
//!
//! A feed-forward network maps the marginals `[a ; b]` of a transport
//! problem over a fixed geometry to a guess of the optimal source potential
//! `f`. Training maximizes the entropic dual objective of `f` and its
//! c-transform, so a trained network hands the solver potentials that are
//! already close to optimal.
//!
//! ## Core Types
//!
//! - [`MetaMlp`]: the network, built from a [`MetaMlpConfig`]
//! - [`DualObjective`]: geometry-bound loss and gradient step
//! - [`MetaState`]: network weights plus optimizer bookkeeping
//! - [`MetaInitializer`]: objective and state together, usable as an
//!   [`Initializer`](warmkhorn_transport::Initializer)
mod initializer;
mod model;
mod objective;
mod state;

pub use initializer::*;
pub use model::*;
pub use objective::*;
pub use state::*;
