/// Marker trait for types that form the support of a probability distribution.
///
/// Point clouds index their samples by position, so the support of a
/// [`Marginal`](crate::Marginal) is a range of `usize`.
pub trait Support: Clone {}

impl Support for usize {}
