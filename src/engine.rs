//! The stepping DROP engine.
//!
//! One engine runs every variant; a [`VariantSpec`] switches the noise
//! pre-filter, the ordering pass and the removal criterion.
//!
//! # Life cycle
//!
//! ```text
//! reset ─▶ Uninitialized ─step─▶ [NoiseFiltered] ─▶ NeighborsComputed ─▶ Iterating(p) ─step─▶ … ─▶ Done
//! ```
//!
//! The first `step` does all of the preparation: noise filtering (DROP3),
//! duplicate removal, neighbour/associate computation and ordering (DROP2/3).
//! Every further `step` decides one working-set position. The call that
//! decides the last position returns `false`.
//!
//! # Working set vs. solution set
//!
//! The decision loop walks the *working set*, a frozen snapshot of every
//! instance considered. The *solution set* shrinks as instances are removed;
//! neighbour searches run against it. Removed instances stay addressable in the
//! working set, and their associate lists still count when a later candidate
//! is evaluated.
//!
//! # Failure
//!
//! Collaborator errors are returned unchanged. A removal is planned before it
//! is committed, so a failing search leaves solution set and graph as they
//! were after the last completed step. Either way the run is over; call
//! [`reset`](DropEngine::reset) to start again.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EditParams;
use crate::data::Dataset;
use crate::enn::{EnnReg, NoiseFilter};
use crate::error::{ConfigError, EditError, Result};
use crate::graph::NeighborGraph;
use crate::ordering::{EnemyDistanceOrdering, InstanceOrdering};
use crate::predicate::{
    ErrorPredicate, Neighborhood, RemovalPredicate, ThresholdPredicate, Verdict,
};
use crate::search::{LinearSearch, NeighborSearch};
use crate::timing::Stopwatch;
use crate::variant::{Criterion, Variant, VariantSpec};

/// Where the engine is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Reset, nothing computed yet.
    #[default]
    Uninitialized,
    /// Noise pre-filter applied.
    NoiseFiltered,
    /// Neighbour and associate lists built.
    NeighborsComputed,
    /// Deciding working-set positions.
    Iterating,
    /// Finished; further steps are no-ops.
    Done,
}

/// Observable progress: phase plus the working-set position to decide next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepState {
    pub phase: Phase,
    pub position: usize,
}

type BoxedSearch = Box<dyn NeighborSearch + Send>;
type BoxedFilter = Box<dyn NoiseFilter + Send>;
type BoxedOrdering = Box<dyn InstanceOrdering + Send>;
type BoxedPredicate = Box<dyn RemovalPredicate + Send>;

/// Incremental DROP editing over a regression dataset.
pub struct DropEngine {
    spec: VariantSpec,
    /// Configured parameters.
    params: EditParams,
    /// Parameters frozen for the current run.
    run: EditParams,

    search: BoxedSearch,
    noise_filter: BoxedFilter,
    ordering: BoxedOrdering,
    /// Replaces the criterion's default predicate when set.
    predicate: Option<BoxedPredicate>,

    input: Dataset,
    input_indices: Vec<usize>,

    working: Dataset,
    working_indices: Vec<usize>,
    retained: Vec<bool>,
    graph: NeighborGraph,

    solution: Dataset,
    /// Solution slot -> working position; ascending.
    solution_positions: Vec<usize>,
    output_indices: Vec<usize>,

    state: StepState,
    clock: Stopwatch,
}

impl fmt::Debug for DropEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropEngine")
            .field("spec", &self.spec)
            .field("params", &self.params)
            .field("state", &self.state)
            .field("working", &self.working.len())
            .field("solution", &self.solution.len())
            .finish_non_exhaustive()
    }
}

impl DropEngine {
    /// Engine for a named variant with the default collaborators.
    pub fn new(variant: Variant) -> Self {
        Self::from_spec(variant.spec())
    }

    pub fn from_spec(spec: VariantSpec) -> Self {
        Self {
            spec,
            params: EditParams::default(),
            run: EditParams::default(),
            search: Box::new(LinearSearch::default()),
            noise_filter: Box::new(EnnReg::default()),
            ordering: Box::new(EnemyDistanceOrdering::descending()),
            predicate: None,
            input: Dataset::new(),
            input_indices: Vec::new(),
            working: Dataset::new(),
            working_indices: Vec::new(),
            retained: Vec::new(),
            graph: NeighborGraph::default(),
            solution: Dataset::new(),
            solution_positions: Vec::new(),
            output_indices: Vec::new(),
            state: StepState::default(),
            clock: Stopwatch::new(),
        }
    }

    pub fn with_search(mut self, search: impl NeighborSearch + Send + 'static) -> Self {
        self.search = Box::new(search);
        self
    }

    pub fn with_noise_filter(mut self, filter: impl NoiseFilter + Send + 'static) -> Self {
        self.noise_filter = Box::new(filter);
        self
    }

    pub fn with_ordering(mut self, ordering: impl InstanceOrdering + Send + 'static) -> Self {
        self.ordering = Box::new(ordering);
        self
    }

    /// Use `predicate` instead of the one implied by the criterion.
    pub fn with_predicate(mut self, predicate: impl RemovalPredicate + Send + 'static) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn with_params(mut self, params: EditParams) -> std::result::Result<Self, ConfigError> {
        params.validate()?;
        self.params = params;
        Ok(self)
    }

    pub fn spec(&self) -> VariantSpec {
        self.spec
    }

    /// Configured parameters. They are frozen when a run initialises.
    pub fn params(&self) -> &EditParams {
        &self.params
    }

    pub fn set_num_neighbors(&mut self, k: usize) -> std::result::Result<(), ConfigError> {
        self.params.set_num_neighbors(k)
    }

    pub fn set_alpha(&mut self, alpha: f64) -> std::result::Result<(), ConfigError> {
        self.params.set_alpha(alpha)
    }

    pub fn set_beta(&mut self, beta: f64) -> std::result::Result<(), ConfigError> {
        self.params.set_beta(beta)
    }

    /// Start a new run over `dataset`, whose instances carry the given
    /// original indices.
    pub fn reset(&mut self, dataset: Dataset, original_indices: Vec<usize>) -> Result<()> {
        if dataset.is_empty() {
            return Err(EditError::NotEnoughInstances { remaining: 0 });
        }
        if original_indices.len() != dataset.len() {
            return Err(EditError::IndexMismatch {
                instances: dataset.len(),
                indices: original_indices.len(),
            });
        }
        let dim = dataset.dimension();
        if let Some(bad) = dataset.iter().find(|i| i.dimension() != dim) {
            return Err(EditError::DimensionMismatch {
                expected: dim,
                found: bad.dimension(),
            });
        }

        self.solution = dataset.clone();
        self.solution_positions = Vec::new();
        self.output_indices = original_indices.clone();
        self.input = dataset;
        self.input_indices = original_indices;
        self.working = Dataset::new();
        self.working_indices = Vec::new();
        self.retained = Vec::new();
        self.graph = NeighborGraph::default();
        self.state = StepState::default();
        self.clock.reset();
        debug!(instances = self.input.len(), "engine reset");
        Ok(())
    }

    /// [`reset`](Self::reset) with original indices `0..n`.
    pub fn reset_with_identity(&mut self, dataset: Dataset) -> Result<()> {
        let indices = (0..dataset.len()).collect();
        self.reset(dataset, indices)
    }

    /// Advance by one step. Returns `false` once nothing is left to do.
    pub fn step(&mut self) -> Result<bool> {
        let mut clock = std::mem::take(&mut self.clock);
        let outcome = clock.measure(|| self.advance());
        self.clock = clock;
        outcome
    }

    /// Step until done.
    pub fn all_steps(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    fn advance(&mut self) -> Result<bool> {
        match self.state.phase {
            Phase::Uninitialized | Phase::NoiseFiltered | Phase::NeighborsComputed => {
                self.initialize()?;
                Ok(true)
            }
            Phase::Iterating => self.decide_current(),
            Phase::Done => Ok(false),
        }
    }

    fn initialize(&mut self) -> Result<()> {
        if self.input.is_empty() {
            self.state.phase = Phase::Done;
            return Err(EditError::NotEnoughInstances { remaining: 0 });
        }
        self.run = self.params;

        let mut data = self.input.clone();
        let mut indices = self.input_indices.clone();

        if self.spec.noise_filter {
            let (filtered, filtered_indices) =
                self.noise_filter
                    .run(&data, &indices, self.run.alpha, self.run.k)?;
            if filtered.len() != filtered_indices.len() {
                return Err(EditError::NoiseFilter(format!(
                    "returned {} instances but {} indices",
                    filtered.len(),
                    filtered_indices.len()
                )));
            }
            debug!(
                before = data.len(),
                after = filtered.len(),
                "noise pre-filter applied"
            );
            data = filtered;
            indices = filtered_indices;
            self.state.phase = Phase::NoiseFiltered;
            if data.len() <= 1 {
                return self.finish_early(data, indices);
            }
        }

        let duplicates = data.remove_duplicates(&mut indices)?;
        if data.len() <= 1 {
            return self.finish_early(data, indices);
        }

        let n = data.len();
        let positions: Vec<usize> = (0..n).collect();
        self.search.set_reference_set(&data)?;
        let mut graph = NeighborGraph::new(n, self.run.k);
        graph.compute_neighbors(&data, &*self.search, &positions)?;
        graph.compute_associates(&data, &*self.search);

        self.working = data;
        self.working_indices = indices;
        self.graph = graph;
        self.state.phase = Phase::NeighborsComputed;
        debug!(instances = n, duplicates, k = self.run.k, "neighbourhoods computed");

        if self.spec.ordered {
            let order =
                self.ordering
                    .order(&self.working, &self.graph, &*self.search, &self.run)?;
            check_permutation(&order, n)?;
            self.working = self.working.permuted(&order);
            self.working_indices = order.iter().map(|&old| self.working_indices[old]).collect();
            self.graph.permute(&order);
            self.search.set_reference_set(&self.working)?;
            debug!("working set ordered by nearest-enemy distance");
        }

        self.retained = vec![true; n];
        self.solution = self.working.clone();
        self.solution_positions = positions;
        self.output_indices = self.working_indices.clone();
        self.state = StepState {
            phase: Phase::Iterating,
            position: 0,
        };
        Ok(())
    }

    /// Too few instances: the current set is the answer.
    fn finish_early(&mut self, data: Dataset, indices: Vec<usize>) -> Result<()> {
        let remaining = data.len();
        warn!(remaining, "not enough instances to edit");
        self.working = data.clone();
        self.working_indices = indices.clone();
        self.retained = vec![true; remaining];
        self.graph = NeighborGraph::new(remaining, self.run.k);
        self.solution = data;
        self.solution_positions = (0..remaining).collect();
        self.output_indices = indices;
        self.state.phase = Phase::Done;
        Err(EditError::NotEnoughInstances { remaining })
    }

    fn decide_current(&mut self) -> Result<bool> {
        let position = self.state.position;
        let verdict = self.evaluate(position)?;
        if verdict.remove {
            self.remove_instance(position, &verdict)?;
        }

        if position + 1 >= self.working.len() {
            self.state.phase = Phase::Done;
            debug!(
                retained = self.solution.len(),
                of = self.working.len(),
                "editing finished"
            );
            return Ok(false);
        }
        self.state.position += 1;
        Ok(true)
    }

    fn evaluate(&self, position: usize) -> Result<Verdict> {
        let hood = Neighborhood {
            working: &self.working,
            graph: &self.graph,
            params: &self.run,
        };
        match (&self.predicate, self.spec.criterion) {
            (Some(custom), _) => custom.evaluate(&hood, position),
            (None, Criterion::Threshold) => ThresholdPredicate.evaluate(&hood, position),
            (None, Criterion::Error) => ErrorPredicate::knn(self.run.k).evaluate(&hood, position),
        }
    }

    fn predicate_name(&self) -> &'static str {
        match (&self.predicate, self.spec.criterion) {
            (Some(custom), _) => custom.name(),
            (None, Criterion::Threshold) => ThresholdPredicate.name(),
            (None, Criterion::Error) => "error",
        }
    }

    /// Drop `position` from the solution set and repair its associates.
    fn remove_instance(&mut self, position: usize, verdict: &Verdict) -> Result<()> {
        let slot = self
            .solution_positions
            .binary_search(&position)
            .map_err(|_| EditError::Search(format!("position {position} is not retained")))?;

        let mut shrunk = self.solution.clone();
        shrunk.remove(slot);
        let mut to_working = self.solution_positions.clone();
        to_working.remove(slot);

        let planned = self.search.set_reference_set(&shrunk).and_then(|()| {
            self.graph
                .plan_repair(position, &self.working, &*self.search, &to_working)
        });
        let plan = match planned {
            Ok(plan) => plan,
            Err(err) => {
                if let Err(restore) = self.search.set_reference_set(&self.solution) {
                    warn!(%restore, "could not restore search reference set");
                }
                return Err(err);
            }
        };

        self.solution = shrunk;
        self.solution_positions = to_working;
        let original = self.output_indices.remove(slot);
        self.retained[position] = false;
        let stats = self.graph.apply_repair(plan);
        debug!(
            position,
            original,
            criterion = self.predicate_name(),
            with = verdict.with,
            without = verdict.without,
            associates = stats.associates_processed,
            short_lists = stats.short_lists,
            "instance removed"
        );
        Ok(())
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    /// Retained instances.
    pub fn solution_set(&self) -> &Dataset {
        &self.solution
    }

    /// Original index of every retained instance, in solution-set order.
    pub fn output_indices(&self) -> &[usize] {
        &self.output_indices
    }

    /// Every instance the decision loop walks over, in visiting order.
    pub fn working_set(&self) -> &Dataset {
        &self.working
    }

    /// Original index of every working-set position.
    pub fn working_indices(&self) -> &[usize] {
        &self.working_indices
    }

    pub fn graph(&self) -> &NeighborGraph {
        &self.graph
    }

    pub fn neighbors(&self, position: usize) -> &[usize] {
        if position < self.graph.len() {
            self.graph.neighbors(position)
        } else {
            &[]
        }
    }

    pub fn associates(&self, position: usize) -> &[usize] {
        if position < self.graph.len() {
            self.graph.associates(position)
        } else {
            &[]
        }
    }

    pub fn is_retained(&self, position: usize) -> bool {
        self.retained.get(position).copied().unwrap_or(false)
    }

    /// Retention flag per working-set position.
    pub fn retained(&self) -> &[bool] {
        &self.retained
    }

    /// Thread user time spent inside `step`, `None` where the platform has no CPU clock.
    pub fn elapsed_cpu_time(&self) -> Option<Duration> {
        self.clock.cpu()
    }

    /// Wall time spent inside `step`.
    pub fn elapsed_wall_time(&self) -> Duration {
        self.clock.wall()
    }
}

fn check_permutation(order: &[usize], n: usize) -> Result<()> {
    let mut seen = vec![false; n];
    let valid = order.len() == n
        && order
            .iter()
            .all(|&p| p < n && !std::mem::replace(&mut seen[p], true));
    if valid {
        Ok(())
    } else {
        Err(EditError::IndexMismatch {
            instances: n,
            indices: order.len(),
        })
    }
}
