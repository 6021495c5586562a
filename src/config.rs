//! Editing parameters and selector configuration.
//!
//! [`EditParams`] carries the three numeric knobs shared by every variant.
//! Setters validate and never clamp. [`SelectorConfig`] bundles the parameters
//! with the variant and distance choice and can be deserialised (all fields
//! default), mirroring the `-K`, `-A`, `-B`, `-T` options of the classic filter.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMetric;
use crate::error::ConfigError;
use crate::variant::Variant;

/// Default number of neighbours.
pub const DEFAULT_K: usize = 1;
/// Default removal leniency.
pub const DEFAULT_ALPHA: f64 = 1.0;
/// Default enemy sensitivity.
pub const DEFAULT_BETA: f64 = 5.0;

/// k, alpha and beta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditParams {
    /// Number of neighbours; positive and odd.
    pub k: usize,
    /// Leniency of the error criterion and of the noise pre-filter, in [0, 100].
    pub alpha: f64,
    /// Sensitivity of the enemy test used when ordering, in [0, 100].
    pub beta: f64,
}

impl Default for EditParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
        }
    }
}

impl EditParams {
    pub fn set_num_neighbors(&mut self, k: usize) -> Result<(), ConfigError> {
        self.k = check_neighbors(k)?;
        Ok(())
    }

    pub fn set_alpha(&mut self, alpha: f64) -> Result<(), ConfigError> {
        if !in_percent_range(alpha) {
            return Err(ConfigError::AlphaOutOfRange(alpha));
        }
        self.alpha = alpha;
        Ok(())
    }

    pub fn set_beta(&mut self, beta: f64) -> Result<(), ConfigError> {
        if !in_percent_range(beta) {
            return Err(ConfigError::BetaOutOfRange(beta));
        }
        self.beta = beta;
        Ok(())
    }

    /// Re-check every field, e.g. after deserialisation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut checked = Self::default();
        checked.set_num_neighbors(self.k)?;
        checked.set_alpha(self.alpha)?;
        checked.set_beta(self.beta)?;
        Ok(())
    }

    /// Neighbour lists hold k+1 entries.
    #[inline]
    pub fn list_len(&self) -> usize {
        self.k + 1
    }
}

fn check_neighbors(k: usize) -> Result<usize, ConfigError> {
    if k == 0 || k % 2 == 0 {
        return Err(ConfigError::InvalidNeighbors(k));
    }
    Ok(k)
}

fn in_percent_range(v: f64) -> bool {
    (0.0..=100.0).contains(&v)
}

/// Full configuration of an [`InstanceSelector`](crate::InstanceSelector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub variant: Variant,
    pub params: EditParams,
    pub metric: DistanceMetric,
    /// Normalise attributes by range before measuring distance.
    pub normalize: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            params: EditParams::default(),
            metric: DistanceMetric::Euclidean,
            normalize: true,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()
    }
}
