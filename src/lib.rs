//! dropreg: DROP-family instance selection for regression.
//!
//! Shrinks a regression training set by removing instances whose absence does
//! not hurt the local predictions of the instances that depend on them. The
//! result is a smaller edited set for distance-based regressors.
//!
//! - `engine`: the stepping state machine ([`DropEngine`])
//! - `graph`: k+1 neighbour lists and their inverse, with incremental repair
//! - `predicate`: threshold and error removal criteria
//! - `ordering`: nearest-enemy ordering used by DROP2 and DROP3
//! - `enn`: ENN-Reg noise pre-filter used by DROP3
//! - `search`, `regressor`: default collaborators (brute-force k-NN search and
//!   a k-NN regressor), both replaceable through traits
//! - `select`: batch front end ([`InstanceSelector`])
//!
//! ```no_run
//! use dropreg::{Dataset, InstanceSelector, SelectorConfig, Variant};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rows = vec![vec![0.0], vec![1.0], vec![3.0], vec![7.0]];
//! let data = Dataset::from_rows(&rows, &[1.0, 1.1, 0.9, 8.0])?;
//! let selector = InstanceSelector::new(SelectorConfig {
//!     variant: Variant::Drop3Threshold,
//!     ..SelectorConfig::default()
//! })?;
//! let selection = selector.select(&data)?;
//! println!("kept {:?}", selection.indices);
//! # Ok(())
//! # }
//! ```
//!
//! # Critical Nuances
//!
//! ## Enemies Without Classes
//!
//! Classification DROP orders by distance to the nearest instance of another
//! class. Regression has no classes, so an *enemy* is a neighbour whose target
//! differs by more than `beta` standard deviations of the neighbourhood's
//! targets. A neighbourhood with identical targets has σ = 0, and then any
//! difference at all makes an enemy.
//!
//! ## The Graph Drifts On Purpose
//!
//! After a removal only the neighbour lists of the removed instance's
//! associates are repaired. Associate lists are never rebuilt, and a
//! neighbour list stays one short when no new neighbour exists. Both are part
//! of the published algorithm; rebuilding the graph after every removal would
//! give different (and slower) results.
//!
//! ## Removed Instances Still Vote
//!
//! DROP2 and DROP3 evaluate a candidate against all of its associates,
//! including ones already removed from the solution set. The decision concerns
//! the original population, not only what survives.
//!
//! ## Not Idempotent In General
//!
//! Running a variant on its own output can remove more instances: the
//! neighbourhoods in the second run are built from the edited set only.

pub mod config;
pub mod data;
pub mod distance;
pub mod engine;
pub mod enn;
pub mod error;
pub mod graph;
pub mod ordering;
pub mod predicate;
pub mod regressor;
pub mod search;
pub mod select;
pub mod timing;
pub mod variant;

// Re-exports
pub use config::{EditParams, SelectorConfig};
pub use data::{Dataset, Instance};
pub use distance::DistanceMetric;
pub use engine::{DropEngine, Phase, StepState};
pub use enn::{EnnReg, NoiseFilter};
pub use error::{ConfigError, EditError, Result};
pub use graph::{NeighborGraph, RepairStats};
pub use ordering::{EnemyDistanceOrdering, InstanceOrdering};
pub use predicate::{
    ErrorPredicate, Neighborhood, RemovalPredicate, ThresholdPredicate, Verdict,
};
pub use regressor::{KnnRegressor, Regressor, WeightScheme};
pub use search::{LinearSearch, Neighbor, NeighborSearch};
pub use select::{InstanceSelector, Selection};
pub use variant::{Criterion, Variant, VariantSpec};
