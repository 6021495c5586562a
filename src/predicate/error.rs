//! Error criterion (DROP-RE).
//!
//! For each associate A of the candidate P a local regressor is trained twice
//! on A's neighbourhood: once without P and once with P added. Both models
//! predict A, and the absolute errors are summed over all associates.
//!
//! P is removed when `error_without <= error_with + alpha`: leaving P out
//! costs at most `alpha` of summed error.

use tracing::trace;

use crate::data::Dataset;
use crate::error::Result;
use crate::regressor::{KnnRegressor, Regressor};

use super::{Neighborhood, RemovalPredicate, Verdict};

/// Compares summed local-model error with and without the candidate.
#[derive(Debug, Clone)]
pub struct ErrorPredicate<R = KnnRegressor> {
    regressor: R,
}

impl ErrorPredicate<KnnRegressor> {
    /// Uniform k-NN regressor with the editing k.
    pub fn knn(k: usize) -> Self {
        Self::new(KnnRegressor::new(k))
    }
}

impl<R: Regressor> ErrorPredicate<R> {
    pub fn new(regressor: R) -> Self {
        Self { regressor }
    }

    pub fn regressor(&self) -> &R {
        &self.regressor
    }
}

impl<R: Regressor> RemovalPredicate for ErrorPredicate<R> {
    fn name(&self) -> &'static str {
        "error"
    }

    fn evaluate(&self, hood: &Neighborhood<'_>, position: usize) -> Result<Verdict> {
        let working = hood.working;
        let candidate = &working[position];
        let mut error_with = 0.0;
        let mut error_without = 0.0;

        for &assoc in hood.graph.associates(position) {
            let test = &working[assoc];
            let mut train: Dataset = hood
                .graph
                .neighbors(assoc)
                .iter()
                .filter(|&&n| n != position)
                .map(|&n| working[n].clone())
                .collect();

            let model = self.regressor.train(&train)?;
            error_without += self.regressor.evaluate(&model, test)?;

            train.push(candidate.clone());
            let model = self.regressor.train(&train)?;
            error_with += self.regressor.evaluate(&model, test)?;
        }

        let remove = error_without <= error_with + hood.params.alpha;
        trace!(position, error_with, error_without, remove, "error criterion");
        Ok(Verdict {
            remove,
            with: error_with,
            without: error_without,
        })
    }
}
