//! Local regression model used as a black-box error estimator.
//!
//! The error criterion trains a tiny model on an associate's neighbourhood
//! (at most k+1 instances) and measures how well it predicts the associate.
//! The default [`KnnRegressor`] predicts the mean target of the k nearest
//! training instances, optionally inverse-distance weighted. Like the search
//! service it scales every attribute by its range, taken over the training set
//! plus the query, so the local model and the neighbour lists agree on what
//! "near" means.

use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Instance};
use crate::distance::{DistanceMetric, FeatureRanges};
use crate::error::Result;

/// Train/evaluate interface of the local model.
pub trait Regressor {
    type Model;

    /// Fit a model on `train`. An empty training set must still produce a model.
    fn train(&self, train: &Dataset) -> Result<Self::Model>;

    /// Absolute prediction error on `test`.
    ///
    /// A model that cannot predict (trained on nothing) reports `f64::INFINITY`.
    fn evaluate(&self, model: &Self::Model, test: &Instance) -> Result<f64>;
}

/// Weighting scheme for neighbor targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightScheme {
    /// All neighbors have equal weight
    #[default]
    Uniform,
    /// Closer neighbors have more weight (inverse distance)
    Distance,
}

/// k-NN regressor with range-normalised distance.
#[derive(Debug, Clone)]
pub struct KnnRegressor {
    k: usize,
    metric: DistanceMetric,
    weights: WeightScheme,
    normalize: bool,
}

impl KnnRegressor {
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            metric: DistanceMetric::Euclidean,
            weights: WeightScheme::Uniform,
            normalize: true,
        }
    }

    /// Measure raw distance instead of scaling attributes by their range.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_weights(mut self, weights: WeightScheme) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

/// A fitted k-NN model: the training set itself.
#[derive(Debug, Clone)]
pub struct KnnModel {
    train: Dataset,
}

impl KnnModel {
    pub fn len(&self) -> usize {
        self.train.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty()
    }
}

impl KnnRegressor {
    /// Predict a target, `None` when the model has no training data.
    pub fn predict(&self, model: &KnnModel, query: &Instance) -> Option<f64> {
        if model.train.is_empty() {
            return None;
        }
        let ranges = self.normalize.then(|| {
            FeatureRanges::from_rows(
                model
                    .train
                    .iter()
                    .map(Instance::features)
                    .chain(std::iter::once(query.features())),
            )
        });
        let mut scored: Vec<(f64, f64)> = model
            .train
            .iter()
            .map(|t| {
                let d = self
                    .metric
                    .distance_scaled(query.features(), t.features(), ranges.as_ref());
                (d, t.target())
            })
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(self.k);

        let prediction = match self.weights {
            WeightScheme::Uniform => {
                scored.iter().map(|&(_, y)| y).sum::<f64>() / scored.len() as f64
            }
            WeightScheme::Distance => {
                let mut weighted_sum = 0.0;
                let mut weight_total = 0.0;
                for &(dist, y) in &scored {
                    let w = 1.0 / (dist + 1e-10);
                    weighted_sum += w * y;
                    weight_total += w;
                }
                weighted_sum / weight_total
            }
        };
        Some(prediction)
    }
}

impl Regressor for KnnRegressor {
    type Model = KnnModel;

    fn train(&self, train: &Dataset) -> Result<KnnModel> {
        Ok(KnnModel {
            train: train.clone(),
        })
    }

    fn evaluate(&self, model: &KnnModel, test: &Instance) -> Result<f64> {
        Ok(self
            .predict(model, test)
            .map_or(f64::INFINITY, |p| (p - test.target()).abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn data(points: &[(f64, f64)]) -> Dataset {
        points
            .iter()
            .map(|&(x, y)| Instance::new(vec![x], y))
            .collect()
    }

    #[test]
    fn uniform_mean_of_k_nearest() {
        let reg = KnnRegressor::new(2);
        let model = reg.train(&data(&[(0.0, 1.0), (1.0, 3.0), (10.0, 100.0)])).unwrap();
        let q = Instance::new(vec![0.4], 0.0);
        assert_relative_eq!(reg.predict(&model, &q).unwrap(), 2.0);
        assert_relative_eq!(reg.evaluate(&model, &q).unwrap(), 2.0);
    }

    #[test]
    fn k_larger_than_training_set_uses_all() {
        let reg = KnnRegressor::new(5);
        let model = reg.train(&data(&[(0.0, 1.0), (1.0, 3.0)])).unwrap();
        let q = Instance::new(vec![0.0], 2.0);
        assert_relative_eq!(reg.evaluate(&model, &q).unwrap(), 0.0);
    }

    #[test]
    fn empty_model_cannot_predict() {
        let reg = KnnRegressor::new(1);
        let model = reg.train(&Dataset::new()).unwrap();
        assert!(model.is_empty());
        let q = Instance::new(vec![0.0], 2.0);
        assert!(reg.predict(&model, &q).is_none());
        assert!(reg.evaluate(&model, &q).unwrap().is_infinite());
    }

    #[test]
    fn attributes_are_compared_on_their_ranges() {
        // x spans 3, y spans 1: after scaling (1.5, 1) is nearer to (0, 1).
        let train: Dataset = [(0.0, 0.0, 0.0), (1.5, 1.0, 10.0), (3.0, 1.0, 10.0)]
            .iter()
            .map(|&(x, y, t)| Instance::new(vec![x, y], t))
            .collect();
        let q = Instance::new(vec![0.0, 1.0], 10.0);

        let reg = KnnRegressor::new(1);
        let model = reg.train(&train).unwrap();
        assert_relative_eq!(reg.evaluate(&model, &q).unwrap(), 0.0);

        let raw = KnnRegressor::new(1).with_normalize(false);
        assert_relative_eq!(raw.evaluate(&model, &q).unwrap(), 10.0);
    }

    #[test]
    fn query_widens_the_ranges() {
        // Training x spans 1; with the query at 10 it spans 10, so the gap in
        // y decides and (0, 0) wins over (1, 3).
        let train: Dataset = [(0.0, 0.0, 1.0), (1.0, 3.0, 2.0)]
            .iter()
            .map(|&(x, y, t)| Instance::new(vec![x, y], t))
            .collect();
        let q = Instance::new(vec![10.0, 0.0], 0.0);
        let reg = KnnRegressor::new(1);
        let model = reg.train(&train).unwrap();
        assert_relative_eq!(reg.predict(&model, &q).unwrap(), 1.0);
    }

    #[test]
    fn distance_weighting_favours_close_points() {
        let reg = KnnRegressor::new(2).with_weights(WeightScheme::Distance);
        let model = reg.train(&data(&[(0.0, 0.0), (10.0, 10.0)])).unwrap();
        let p = reg.predict(&model, &Instance::new(vec![1.0], 0.0)).unwrap();
        assert!(p < 5.0, "closer neighbour should dominate, got {p}");
    }
}
