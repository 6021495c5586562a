//! Exact brute-force k-NN search.
//!
//! Every query scans the full reference set: O(n·d) per query. For the dataset
//! sizes instance selection is applied to this is usually faster than building
//! a tree that is invalidated after every removal.
//!
//! Ties at the k-th distance are all returned, so a query for k=1 on a point
//! equidistant from two others yields both. The editing engine truncates.

use crate::data::{Dataset, Instance};
use crate::distance::{DistanceMetric, FeatureRanges};
use crate::error::{EditError, Result};

use super::{Neighbor, NeighborSearch};

/// Brute-force search with optional range normalisation.
#[derive(Debug, Clone)]
pub struct LinearSearch {
    reference: Dataset,
    metric: DistanceMetric,
    normalize: bool,
    ranges: FeatureRanges,
}

impl Default for LinearSearch {
    fn default() -> Self {
        Self::new(DistanceMetric::Euclidean, true)
    }
}

impl LinearSearch {
    pub fn new(metric: DistanceMetric, normalize: bool) -> Self {
        Self {
            reference: Dataset::new(),
            metric,
            normalize,
            ranges: FeatureRanges::default(),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn reference(&self) -> &Dataset {
        &self.reference
    }

    fn ranges(&self) -> Option<&FeatureRanges> {
        self.normalize.then_some(&self.ranges)
    }
}

impl NeighborSearch for LinearSearch {
    fn set_reference_set(&mut self, reference: &Dataset) -> Result<()> {
        let dim = reference.dimension();
        if let Some(bad) = reference.iter().find(|i| i.dimension() != dim) {
            return Err(EditError::DimensionMismatch {
                expected: dim,
                found: bad.dimension(),
            });
        }
        self.reference = reference.clone();
        self.ranges = if self.normalize {
            FeatureRanges::from_rows(reference.iter().map(Instance::features))
        } else {
            FeatureRanges::default()
        };
        Ok(())
    }

    fn k_nearest(&self, query: &Instance, k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 || self.reference.is_empty() {
            return Ok(Vec::new());
        }
        let dim = self.reference.dimension();
        if query.dimension() != dim {
            return Err(EditError::DimensionMismatch {
                expected: dim,
                found: query.dimension(),
            });
        }

        let mut hits: Vec<Neighbor> = self
            .reference
            .iter()
            .enumerate()
            .filter(|(_, candidate)| *candidate != query)
            .map(|(i, candidate)| Neighbor::new(i, self.distance(query, candidate)))
            .collect();

        // Stable: equal distances keep reference order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        if hits.len() > k {
            let kth = hits[k - 1].distance;
            let end = hits[k..]
                .iter()
                .position(|n| n.distance != kth)
                .map_or(hits.len(), |p| k + p);
            hits.truncate(end);
        }
        Ok(hits)
    }

    fn distance(&self, a: &Instance, b: &Instance) -> f64 {
        self.metric
            .distance_scaled(a.features(), b.features(), self.ranges())
    }

    fn reference_len(&self) -> usize {
        self.reference.len()
    }
}
