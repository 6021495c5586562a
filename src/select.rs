//! Batch front end: run a whole variant over a dataset.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::SelectorConfig;
use crate::data::Dataset;
use crate::engine::DropEngine;
use crate::enn::EnnReg;
use crate::error::{ConfigError, EditError, Result};
use crate::search::LinearSearch;

/// Edited dataset and bookkeeping from one selection run.
#[derive(Debug, Clone)]
pub struct Selection {
    pub dataset: Dataset,
    /// Index of every selected instance in the input dataset.
    pub indices: Vec<usize>,
    /// `false` when the input was too small to edit and came back deduplicated.
    pub reduced: bool,
    pub cpu_time: Option<Duration>,
    pub wall_time: Duration,
}

impl Selection {
    /// Fraction of the input that was kept.
    pub fn retention(&self, input_len: usize) -> f64 {
        if input_len == 0 {
            return 0.0;
        }
        self.dataset.len() as f64 / input_len as f64
    }
}

/// Runs a configured DROP variant to completion.
#[derive(Debug, Clone, Default)]
pub struct InstanceSelector {
    config: SelectorConfig,
}

impl InstanceSelector {
    pub fn new(config: SelectorConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// A fresh engine wired up from the configuration.
    pub fn engine(&self) -> std::result::Result<DropEngine, ConfigError> {
        let cfg = &self.config;
        DropEngine::new(cfg.variant)
            .with_search(LinearSearch::new(cfg.metric, cfg.normalize))
            .with_noise_filter(EnnReg::new(cfg.metric, cfg.normalize))
            .with_params(cfg.params)
    }

    /// Select instances from `dataset`.
    ///
    /// Too few distinct instances is not an error: the deduplicated (or
    /// noise-filtered) set is returned unreduced.
    pub fn select(&self, dataset: &Dataset) -> Result<Selection> {
        let mut engine = self.engine()?;
        engine.reset_with_identity(dataset.clone())?;

        let reduced = match engine.all_steps() {
            Ok(()) => true,
            Err(EditError::NotEnoughInstances { remaining }) => {
                warn!(
                    variant = %self.config.variant,
                    remaining,
                    "too few instances, returning input unreduced"
                );
                false
            }
            Err(err) => return Err(err),
        };

        let selection = Selection {
            dataset: engine.solution_set().clone(),
            indices: engine.output_indices().to_vec(),
            reduced,
            cpu_time: engine.elapsed_cpu_time(),
            wall_time: engine.elapsed_wall_time(),
        };
        info!(
            variant = %self.config.variant,
            input = dataset.len(),
            selected = selection.dataset.len(),
            wall_ms = selection.wall_time.as_secs_f64() * 1e3,
            "instance selection finished"
        );
        Ok(selection)
    }
}
