//! Threshold criterion (DROP-RT).
//!
//! For each associate A of the candidate P:
//!
//! - `with`: A is predicted from its neighbour list minus the last entry.
//!   On a full k+1 list these are the k nearest, which include P; a list left
//!   short by repair or by a small population loses its last entry as well;
//! - `without`: A is predicted from its neighbour list minus P. The (k+1)-th
//!   neighbour steps in for P.
//!
//! A prediction is the mean target of the subset and is correct when
//!
//! ```text
//! |prediction - y_A| <= θ,   θ = alpha · σ(y over NeighborSet[A])
//! ```
//!
//! θ always uses the full k+1 list, so `with` and `without` share one
//! tolerance. P is removed when `without >= with`.

use tracing::trace;

use crate::data::{mean_target, target_std_dev, Instance};
use crate::error::Result;

use super::{Neighborhood, RemovalPredicate, Verdict};

/// Counts associates predicted within θ with and without the candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdPredicate;

/// Whether the mean target of `neighbors` lies within `theta` of `subject`.
///
/// An empty neighbourhood predicts nothing and is never within threshold.
pub fn is_within_threshold<'a>(
    subject: &Instance,
    neighbors: impl IntoIterator<Item = &'a Instance>,
    theta: f64,
) -> bool {
    mean_target(neighbors).map_or(false, |p| (p - subject.target()).abs() <= theta)
}

impl RemovalPredicate for ThresholdPredicate {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn evaluate(&self, hood: &Neighborhood<'_>, position: usize) -> Result<Verdict> {
        let working = hood.working;
        let mut with = 0usize;
        let mut without = 0usize;

        for &assoc in hood.graph.associates(position) {
            let subject = &working[assoc];
            let list = hood.graph.neighbors(assoc);
            let theta = hood.params.alpha * target_std_dev(list.iter().map(|&n| &working[n]));

            let nearer = &list[..list.len().saturating_sub(1)];
            if is_within_threshold(subject, nearer.iter().map(|&n| &working[n]), theta) {
                with += 1;
            }

            let rest = list.iter().filter(|&&n| n != position).map(|&n| &working[n]);
            if is_within_threshold(subject, rest, theta) {
                without += 1;
            }
        }

        trace!(position, with, without, "threshold criterion");
        Ok(Verdict {
            remove: without >= with,
            with: with as f64,
            without: without as f64,
        })
    }
}
