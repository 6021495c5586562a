//! Noise pre-filter: edited nearest neighbour for regression (ENN-Reg).
//!
//! Every instance is predicted by the mean target of its k nearest neighbours
//! in the full input set. It is discarded as noise when
//!
//! ```text
//! |prediction - y| > alpha · σ(y over its k+1 nearest neighbours)
//! ```
//!
//! The spread is taken over k+1 neighbours, like the editing lists, so the
//! tolerance is not zero for k = 1.
//!
//! All decisions are taken against the unfiltered set and applied together,
//! so the result does not depend on the input order.

use tracing::debug;

use crate::data::{mean_target, target_std_dev, Dataset};
use crate::distance::DistanceMetric;
use crate::error::{EditError, Result};
use crate::search::{LinearSearch, NeighborSearch};

/// Removes noisy instances before the decision loop.
pub trait NoiseFilter {
    /// Filter `dataset`; `indices` is its original-index map and is filtered in
    /// lockstep.
    fn run(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        alpha: f64,
        k: usize,
    ) -> Result<(Dataset, Vec<usize>)>;
}

impl<F: NoiseFilter + ?Sized> NoiseFilter for Box<F> {
    fn run(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        alpha: f64,
        k: usize,
    ) -> Result<(Dataset, Vec<usize>)> {
        (**self).run(dataset, indices, alpha, k)
    }
}

/// ENN-Reg over a brute-force search.
#[derive(Debug, Clone, Copy)]
pub struct EnnReg {
    metric: DistanceMetric,
    normalize: bool,
}

impl Default for EnnReg {
    fn default() -> Self {
        Self::new(DistanceMetric::Euclidean, true)
    }
}

impl EnnReg {
    pub fn new(metric: DistanceMetric, normalize: bool) -> Self {
        Self { metric, normalize }
    }

    /// Flags for every instance: `true` when it is noise.
    pub fn noisy(&self, dataset: &Dataset, alpha: f64, k: usize) -> Result<Vec<bool>> {
        let mut search = LinearSearch::new(self.metric, self.normalize);
        search.set_reference_set(dataset)?;

        dataset
            .iter()
            .map(|instance| {
                let mut hits = search.k_nearest(instance, k + 1)?;
                hits.truncate(k + 1);
                let spread = hits.iter().map(|h| &dataset[h.index]);
                let Some(prediction) = mean_target(spread.clone().take(k)) else {
                    return Ok(false);
                };
                let theta = alpha * target_std_dev(spread);
                Ok((prediction - instance.target()).abs() > theta)
            })
            .collect()
    }
}

impl NoiseFilter for EnnReg {
    fn run(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        alpha: f64,
        k: usize,
    ) -> Result<(Dataset, Vec<usize>)> {
        if indices.len() != dataset.len() {
            return Err(EditError::IndexMismatch {
                instances: dataset.len(),
                indices: indices.len(),
            });
        }
        let noisy = self
            .noisy(dataset, alpha, k)
            .map_err(|e| EditError::NoiseFilter(e.to_string()))?;

        let mut kept = Dataset::with_capacity(dataset.len());
        let mut kept_indices = Vec::with_capacity(indices.len());
        for ((instance, &index), &noise) in dataset.iter().zip(indices).zip(&noisy) {
            if !noise {
                kept.push(instance.clone());
                kept_indices.push(index);
            }
        }
        debug!(
            input = dataset.len(),
            removed = dataset.len() - kept.len(),
            "noise filter done"
        );
        Ok((kept, kept_indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Instance;

    fn doubling_line(targets: &[f64]) -> Dataset {
        targets
            .iter()
            .enumerate()
            .map(|(i, &y)| Instance::new(vec![(1u64 << i) as f64 - 1.0], y))
            .collect()
    }

    #[test]
    fn removes_isolated_outlier() {
        let mut targets = vec![1.0; 10];
        targets[9] = 50.0;
        let data = doubling_line(&targets);
        let indices: Vec<usize> = (100..110).collect();

        let (kept, kept_indices) = EnnReg::default().run(&data, &indices, 1.0, 1).unwrap();
        assert_eq!(kept.len(), 9);
        assert_eq!(kept_indices, (100..109).collect::<Vec<_>>());
    }

    #[test]
    fn smooth_targets_survive() {
        let targets: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let data = doubling_line(&targets);
        let indices: Vec<usize> = (0..8).collect();
        // The nearest neighbour is off by 1; its two nearest are 1 apart (σ = 0.5).
        let (kept, _) = EnnReg::default().run(&data, &indices, 2.0, 1).unwrap();
        assert_eq!(kept.len(), 8);
    }

    #[test]
    fn alpha_zero_removes_every_disagreement() {
        let data = doubling_line(&[0.0, 0.0, 1.0]);
        let flags = EnnReg::default().noisy(&data, 0.0, 1).unwrap();
        // 2's nearest is 1 (target 0).
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn index_map_must_match() {
        let data = doubling_line(&[0.0, 1.0]);
        let err = EnnReg::default().run(&data, &[0], 1.0, 1).unwrap_err();
        assert_eq!(
            err,
            EditError::IndexMismatch {
                instances: 2,
                indices: 1
            }
        );
    }

    #[test]
    fn single_instance_is_never_noise() {
        let data = doubling_line(&[3.0]);
        let (kept, idx) = EnnReg::default().run(&data, &[7], 1.0, 1).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(idx, vec![7]);
    }
}
