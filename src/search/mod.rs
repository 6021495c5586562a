//! Nearest-neighbour search service.
//!
//! The editing engine never scans the dataset itself; it asks a
//! [`NeighborSearch`] for the k nearest members of the current reference set
//! (the live solution set). The service is re-pointed at the shrunk set after
//! every removal, so implementations should make `set_reference_set` cheap or
//! at least proportional to the set size.
//!
//! [`LinearSearch`] is the exact brute-force implementation used by default.

mod linear;

pub use linear::LinearSearch;

use crate::data::{Dataset, Instance};
use crate::error::Result;

/// One search hit: position in the reference set and distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

impl Neighbor {
    pub fn new(index: usize, distance: f64) -> Self {
        Self { index, distance }
    }
}

/// k-NN query service over a reference set.
pub trait NeighborSearch {
    /// Replace the reference set. Previous results become meaningless.
    fn set_reference_set(&mut self, reference: &Dataset) -> Result<()>;

    /// The k nearest members of the reference set to `query`.
    ///
    /// Members equal to the query are skipped, so an instance is never its own
    /// neighbour. Results are sorted by ascending distance. Implementations may
    /// return more than `k` hits when several tie at the k-th distance; callers
    /// that need exactly `k` truncate.
    fn k_nearest(&self, query: &Instance, k: usize) -> Result<Vec<Neighbor>>;

    /// Distance between two instances under the current reference set's metric.
    fn distance(&self, a: &Instance, b: &Instance) -> f64;

    /// Size of the current reference set.
    fn reference_len(&self) -> usize;
}

impl<S: NeighborSearch + ?Sized> NeighborSearch for Box<S> {
    fn set_reference_set(&mut self, reference: &Dataset) -> Result<()> {
        (**self).set_reference_set(reference)
    }

    fn k_nearest(&self, query: &Instance, k: usize) -> Result<Vec<Neighbor>> {
        (**self).k_nearest(query, k)
    }

    fn distance(&self, a: &Instance, b: &Instance) -> f64 {
        (**self).distance(a, b)
    }

    fn reference_len(&self) -> usize {
        (**self).reference_len()
    }
}
