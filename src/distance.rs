//! Distance metrics over instance features.
//!
//! Neighbourhoods in instance selection are computed between *rows of a
//! dataset*, whose attributes usually live on very different scales. Like the
//! classic Weka setup this crate normalises every attribute by its range over
//! the current reference set before measuring distance ([`FeatureRanges`]).
//! An attribute with zero range contributes nothing.
//!
//! ## Important nuance
//!
//! Ranges are taken from the *reference set*, which shrinks while editing.
//! Distances from two different reference sets are therefore not comparable;
//! only the ordering within a single query is meaningful.

use serde::{Deserialize, Serialize};

/// Distance metric for feature vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    #[default]
    Euclidean,
    /// Manhattan (L1) distance.
    Manhattan,
    /// Chebyshev (L∞) distance.
    Chebyshev,
}

impl DistanceMetric {
    /// Compute distance between two vectors.
    ///
    /// If dimensions mismatch, this returns `f64::INFINITY` (so it is never selected as a
    /// nearest neighbor).
    #[inline]
    #[must_use]
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        self.distance_scaled(a, b, None)
    }

    /// Distance with each coordinate difference divided by the attribute range.
    #[must_use]
    pub fn distance_scaled(self, a: &[f64], b: &[f64], ranges: Option<&FeatureRanges>) -> f64 {
        if a.len() != b.len() {
            return f64::INFINITY;
        }
        let diffs = a.iter().zip(b).enumerate().map(|(i, (x, y))| {
            let d = x - y;
            match ranges {
                Some(r) => r.scale(i, d),
                None => d,
            }
        });
        match self {
            DistanceMetric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            DistanceMetric::Manhattan => diffs.map(f64::abs).sum(),
            DistanceMetric::Chebyshev => diffs.map(f64::abs).fold(0.0, f64::max),
        }
    }
}

/// Per-attribute min/max over a reference set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRanges {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl FeatureRanges {
    /// Compute ranges over rows. `NaN` values are ignored.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a [f64]>) -> Self {
        let mut ranges = Self::default();
        for row in rows {
            if ranges.min.is_empty() {
                ranges.min = vec![f64::INFINITY; row.len()];
                ranges.max = vec![f64::NEG_INFINITY; row.len()];
            }
            for (i, &v) in row.iter().enumerate().take(ranges.min.len()) {
                if v.is_nan() {
                    continue;
                }
                ranges.min[i] = ranges.min[i].min(v);
                ranges.max[i] = ranges.max[i].max(v);
            }
        }
        ranges
    }

    pub fn dimension(&self) -> usize {
        self.min.len()
    }

    /// Width of attribute `i`, 0 when unknown or degenerate.
    pub fn width(&self, i: usize) -> f64 {
        match (self.min.get(i), self.max.get(i)) {
            (Some(lo), Some(hi)) if hi > lo => hi - lo,
            _ => 0.0,
        }
    }

    #[inline]
    fn scale(&self, i: usize, diff: f64) -> f64 {
        let w = self.width(i);
        if w > 0.0 {
            diff / w
        } else {
            0.0
        }
    }
}
