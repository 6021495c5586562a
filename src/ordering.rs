//! Ordering of the working set before the decision loop.
//!
//! DROP2 and DROP3 visit instances far from their nearest enemy first. Those
//! are interior points, the least likely to be noise; by the time borderline
//! points are evaluated, the removals around them have already propagated
//! through the graph.
//!
//! # Enemies in regression
//!
//! A neighbour `j` of `i` is an *enemy* when
//!
//! ```text
//! |y_j - y_i| > beta * σ(y over NeighborSet[i])
//! ```
//!
//! where σ is the population standard deviation. An instance without an enemy
//! among its neighbours gets distance `+∞`.

use crate::config::EditParams;
use crate::data::{target_std_dev, Dataset};
use crate::error::Result;
use crate::graph::NeighborGraph;
use crate::search::NeighborSearch;

/// Strategy producing the visiting order of the working set.
pub trait InstanceOrdering {
    /// A permutation with `order[new] = old`.
    fn order(
        &self,
        working: &Dataset,
        graph: &NeighborGraph,
        search: &dyn NeighborSearch,
        params: &EditParams,
    ) -> Result<Vec<usize>>;
}

/// Sort by distance to the nearest enemy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyDistanceOrdering {
    /// Nearest-enemy-first instead of farthest-enemy-first.
    pub ascending: bool,
}

impl EnemyDistanceOrdering {
    pub fn descending() -> Self {
        Self { ascending: false }
    }

    pub fn ascending() -> Self {
        Self { ascending: true }
    }
}

/// Distance from every working position to its nearest enemy.
pub fn nearest_enemy_distances(
    working: &Dataset,
    graph: &NeighborGraph,
    search: &dyn NeighborSearch,
    beta: f64,
) -> Vec<f64> {
    (0..working.len())
        .map(|i| {
            let subject = &working[i];
            let neighbors = graph.neighbors(i);
            let threshold = beta * target_std_dev(neighbors.iter().map(|&j| &working[j]));
            neighbors
                .iter()
                .map(|&j| &working[j])
                .filter(|n| (n.target() - subject.target()).abs() > threshold)
                .map(|enemy| search.distance(subject, enemy))
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

impl InstanceOrdering for EnemyDistanceOrdering {
    fn order(
        &self,
        working: &Dataset,
        graph: &NeighborGraph,
        search: &dyn NeighborSearch,
        params: &EditParams,
    ) -> Result<Vec<usize>> {
        let distances = nearest_enemy_distances(working, graph, search, params.beta);
        let mut order: Vec<usize> = (0..working.len()).collect();
        // Stable in both directions: ties keep working-set order.
        if self.ascending {
            order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
        } else {
            order.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]));
        }
        Ok(order)
    }
}
