//! Removal predicates: should the instance at a working position go?
//!
//! Both criteria look only at the *associates* of the candidate P, i.e. the
//! instances whose neighbourhood P belongs to, and compare their local
//! predictions with P in the neighbourhood and without it.
//!
//! - [`ThresholdPredicate`]: counts associates predicted within θ.
//! - [`ErrorPredicate`]: sums the absolute error of a local model.
//!
//! Associates that were already removed from the solution set still count.
//! The decision is about the whole working population, not only the retained
//! part.

mod error;
mod threshold;

pub use error::ErrorPredicate;
pub use threshold::{is_within_threshold, ThresholdPredicate};

use crate::config::EditParams;
use crate::data::Dataset;
use crate::error::Result;
use crate::graph::NeighborGraph;

/// Read-only view handed to a predicate.
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood<'a> {
    pub working: &'a Dataset,
    pub graph: &'a NeighborGraph,
    pub params: &'a EditParams,
}

/// Outcome of one evaluation, kept for tracing and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub remove: bool,
    /// Score with the candidate in the neighbourhood.
    pub with: f64,
    /// Score with the candidate left out.
    pub without: f64,
}

/// Strategy deciding whether a working position is removed.
pub trait RemovalPredicate {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    fn evaluate(&self, hood: &Neighborhood<'_>, position: usize) -> Result<Verdict>;
}

impl<P: RemovalPredicate + ?Sized> RemovalPredicate for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn evaluate(&self, hood: &Neighborhood<'_>, position: usize) -> Result<Verdict> {
        (**self).evaluate(hood, position)
    }
}
