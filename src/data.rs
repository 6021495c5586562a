//! Instances and datasets.
//!
//! An [`Instance`] is a feature vector plus a numeric target. Features live in
//! an `Arc<[f64]>`, so copying an instance into a neighbour set or a training
//! subset is a reference-count bump rather than a vector copy.
//!
//! Equality is *value* equality, compared bitwise (`f64::to_bits`). Two `NaN`
//! features with the same payload are equal, and `0.0` differs from `-0.0`.
//! This makes duplicate removal deterministic for any input.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{EditError, Result};

/// A feature vector with a numeric target.
#[derive(Debug, Clone)]
pub struct Instance {
    features: Arc<[f64]>,
    target: f64,
}

impl Instance {
    pub fn new(features: impl Into<Arc<[f64]>>, target: f64) -> Self {
        Self {
            features: features.into(),
            target,
        }
    }

    #[inline]
    pub fn features(&self) -> &[f64] {
        &self.features
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.features.len()
    }

    fn key(&self) -> (Vec<u64>, u64) {
        (
            self.features.iter().map(|f| f.to_bits()).collect(),
            self.target.to_bits(),
        )
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.target.to_bits() == other.target.to_bits()
            && self.features.len() == other.features.len()
            && self
                .features
                .iter()
                .zip(other.features.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Instance {}

/// Ordered, index-addressable collection of instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    instances: Vec<Instance>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    /// Build a dataset from rows of features and a parallel target column.
    pub fn from_rows(rows: &[Vec<f64>], targets: &[f64]) -> Result<Self> {
        if rows.len() != targets.len() {
            return Err(EditError::IndexMismatch {
                instances: rows.len(),
                indices: targets.len(),
            });
        }
        let mut data = Self::with_capacity(rows.len());
        for (row, &target) in rows.iter().zip(targets) {
            data.try_push(Instance::new(row.clone(), target))?;
        }
        Ok(data)
    }

    /// Append an instance, checking that its dimension matches the others.
    pub fn try_push(&mut self, instance: Instance) -> Result<()> {
        if let Some(first) = self.instances.first() {
            if first.dimension() != instance.dimension() {
                return Err(EditError::DimensionMismatch {
                    expected: first.dimension(),
                    found: instance.dimension(),
                });
            }
        }
        self.instances.push(instance);
        Ok(())
    }

    /// Append without a dimension check.
    pub fn push(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn remove(&mut self, position: usize) -> Instance {
        self.instances.remove(position)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&Instance> {
        self.instances.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.instances.iter()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Feature count of the first instance, or 0 when empty.
    pub fn dimension(&self) -> usize {
        self.instances.first().map_or(0, Instance::dimension)
    }

    /// Position of the first instance equal to `instance`.
    pub fn position_of(&self, instance: &Instance) -> Option<usize> {
        self.instances.iter().position(|i| i == instance)
    }

    pub fn targets(&self) -> impl Iterator<Item = f64> + '_ {
        self.instances.iter().map(Instance::target)
    }

    /// Drop value-identical duplicates, keeping the first occurrence.
    ///
    /// `indices` is the original-index map and is edited in lockstep.
    pub fn remove_duplicates(&mut self, indices: &mut Vec<usize>) -> Result<usize> {
        if indices.len() != self.instances.len() {
            return Err(EditError::IndexMismatch {
                instances: self.instances.len(),
                indices: indices.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.instances.len());
        let mut keep = Vec::with_capacity(self.instances.len());
        for instance in &self.instances {
            keep.push(seen.insert(instance.key()));
        }

        let before = self.instances.len();
        let mut flags = keep.iter();
        self.instances.retain(|_| *flags.next().unwrap_or(&true));
        let mut flags = keep.iter();
        indices.retain(|_| *flags.next().unwrap_or(&true));
        Ok(before - self.instances.len())
    }

    /// Reorder by a permutation where `order[new] = old`.
    pub(crate) fn permuted(&self, order: &[usize]) -> Self {
        Self {
            instances: order.iter().map(|&old| self.instances[old].clone()).collect(),
        }
    }
}

impl std::ops::Index<usize> for Dataset {
    type Output = Instance;

    fn index(&self, position: usize) -> &Instance {
        &self.instances[position]
    }
}

impl FromIterator<Instance> for Dataset {
    fn from_iter<I: IntoIterator<Item = Instance>>(iter: I) -> Self {
        Self {
            instances: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

/// Mean of the targets, `None` when empty.
pub fn mean_target<'a>(instances: impl IntoIterator<Item = &'a Instance>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for instance in instances {
        sum += instance.target();
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}

/// Population standard deviation of the targets; 0 for fewer than two.
pub fn target_std_dev<'a>(instances: impl IntoIterator<Item = &'a Instance> + Clone) -> f64 {
    let Some(mean) = mean_target(instances.clone()) else {
        return 0.0;
    };
    let mut sq = 0.0;
    let mut n = 0usize;
    for instance in instances {
        let d = instance.target() - mean;
        sq += d * d;
        n += 1;
    }
    if n < 2 {
        0.0
    } else {
        (sq / n as f64).sqrt()
    }
}
