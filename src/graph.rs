//! Neighbour / associate graph with incremental repair.
//!
//! For every working-set position `i` the graph keeps
//!
//! - `neighbors[i]`: the k+1 nearest *retained* instances, ascending distance;
//! - `associates[i]`: the positions whose neighbour list contains `i`,
//!   ascending distance to `i`.
//!
//! Both lists store working-set positions, never instance handles, so edges
//! stay valid while the solution set shrinks and after the working set is
//! reordered (see [`NeighborGraph::permute`]).
//!
//! # Repair after removal
//!
//! When instance D leaves the solution set, every associate A of D:
//! 1. drops D from its neighbour list;
//! 2. re-queries its k+1 nearest against the shrunk solution set;
//! 3. appends the first hit not already in its list, and registers itself as
//!    an associate of that hit.
//!
//! Only the neighbour side is repaired. D stays in the associate lists of its
//! own neighbours; since D is no longer retained those entries are ignored by
//! the inverse relation. If no hit is new the list is left one entry short.
//!
//! Repair runs in two phases: [`NeighborGraph::plan_repair`] performs every
//! search without touching the graph, [`NeighborGraph::apply_repair`] commits.
//! A failing search therefore leaves the graph exactly as it was.

use smallvec::SmallVec;

use crate::data::{Dataset, Instance};
use crate::error::{EditError, Result};
use crate::search::NeighborSearch;

/// k+1 neighbours; inline for the usual small k.
pub type NeighborList = SmallVec<[usize; 8]>;
/// Associates; typically about twice the neighbour count.
pub type AssociateList = SmallVec<[usize; 16]>;

/// Statistics from a repair operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Associates whose neighbour list was repaired
    pub associates_processed: usize,
    /// Edges removed (to the deleted instance)
    pub edges_removed: usize,
    /// Replacement edges added
    pub edges_added: usize,
    /// Associates for which no new neighbour existed
    pub short_lists: usize,
}

/// Planned repair of one associate.
#[derive(Debug, Clone)]
struct AssociateRepair {
    associate: usize,
    neighbors: NeighborList,
    replacement: Option<usize>,
    removed_edge: bool,
}

/// Repairs computed by [`NeighborGraph::plan_repair`], not yet applied.
#[derive(Debug, Clone, Default)]
pub struct RepairPlan {
    removed: usize,
    repairs: Vec<AssociateRepair>,
}

impl RepairPlan {
    pub fn removed(&self) -> usize {
        self.removed
    }

    pub fn len(&self) -> usize {
        self.repairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repairs.is_empty()
    }
}

/// Neighbour and associate lists over working-set positions.
#[derive(Debug, Clone, Default)]
pub struct NeighborGraph {
    list_len: usize,
    neighbors: Vec<NeighborList>,
    associates: Vec<AssociateList>,
}

impl NeighborGraph {
    /// Empty lists for `capacity` instances with room for `k + 1` neighbours.
    pub fn new(capacity: usize, k: usize) -> Self {
        let list_len = k + 1;
        Self {
            list_len,
            neighbors: (0..capacity)
                .map(|_| NeighborList::with_capacity(list_len))
                .collect(),
            associates: (0..capacity)
                .map(|_| AssociateList::with_capacity(list_len * 2))
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Maximum neighbour-list length (k + 1).
    #[inline]
    pub fn list_len(&self) -> usize {
        self.list_len
    }

    #[inline]
    pub fn neighbors(&self, position: usize) -> &[usize] {
        &self.neighbors[position]
    }

    #[inline]
    pub fn associates(&self, position: usize) -> &[usize] {
        &self.associates[position]
    }

    /// The k+1 nearest retained instances to `query`, as working positions.
    ///
    /// `to_working[r]` maps reference-set index `r` to its working position.
    /// Tied surplus hits are cut to k+1 in search order, then stably re-sorted.
    pub fn nearest(
        &self,
        query: &Instance,
        search: &dyn NeighborSearch,
        to_working: &[usize],
    ) -> Result<NeighborList> {
        let mut hits = search.k_nearest(query, self.list_len)?;
        hits.truncate(self.list_len);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        hits.iter()
            .map(|hit| {
                to_working.get(hit.index).copied().ok_or_else(|| {
                    EditError::Search(format!(
                        "hit {} outside reference set of {}",
                        hit.index,
                        to_working.len()
                    ))
                })
            })
            .collect()
    }

    /// Fill every neighbour list from scratch.
    pub fn compute_neighbors(
        &mut self,
        working: &Dataset,
        search: &dyn NeighborSearch,
        to_working: &[usize],
    ) -> Result<()> {
        let lists = working
            .iter()
            .map(|instance| self.nearest(instance, search, to_working))
            .collect::<Result<Vec<_>>>()?;
        self.neighbors = lists;
        if self.associates.len() != self.neighbors.len() {
            self.associates = vec![AssociateList::new(); self.neighbors.len()];
        }
        Ok(())
    }

    /// Rebuild every associate list as the inverse of the neighbour lists.
    pub fn compute_associates(&mut self, working: &Dataset, search: &dyn NeighborSearch) {
        for list in &mut self.associates {
            list.clear();
        }
        for (j, list) in self.neighbors.iter().enumerate() {
            for &n in list {
                if n != j {
                    self.associates[n].push(j);
                }
            }
        }
        for (owner, list) in self.associates.iter_mut().enumerate() {
            let origin = &working[owner];
            sort_by_distance(list, |j| search.distance(origin, &working[j]));
        }
    }

    /// Compute the repairs caused by removing `removed` from the solution set.
    ///
    /// `search` must already point at the solution set *without* `removed`.
    pub fn plan_repair(
        &self,
        removed: usize,
        working: &Dataset,
        search: &dyn NeighborSearch,
        to_working: &[usize],
    ) -> Result<RepairPlan> {
        let mut repairs = Vec::with_capacity(self.associates[removed].len());
        for &associate in &self.associates[removed] {
            let mut neighbors = self.neighbors[associate].clone();
            let before = neighbors.len();
            neighbors.retain(|n| *n != removed);
            let removed_edge = neighbors.len() != before;

            let candidates = self.nearest(&working[associate], search, to_working)?;
            let replacement = candidates
                .iter()
                .take(self.list_len)
                .copied()
                .find(|c| !neighbors.contains(c));

            repairs.push(AssociateRepair {
                associate,
                neighbors,
                replacement,
                removed_edge,
            });
        }
        Ok(RepairPlan { removed, repairs })
    }

    /// Commit a plan produced by [`plan_repair`](Self::plan_repair).
    pub fn apply_repair(&mut self, plan: RepairPlan) -> RepairStats {
        let mut stats = RepairStats::default();
        for repair in plan.repairs {
            let AssociateRepair {
                associate,
                mut neighbors,
                replacement,
                removed_edge,
            } = repair;

            stats.associates_processed += 1;
            if removed_edge {
                stats.edges_removed += 1;
            }
            match replacement {
                Some(r) => {
                    neighbors.push(r);
                    self.associates[r].push(associate);
                    stats.edges_added += 1;
                }
                None => stats.short_lists += 1,
            }
            self.neighbors[associate] = neighbors;
        }
        stats
    }

    /// Reorder positions; `order[new] = old`. Stored positions are remapped.
    pub fn permute(&mut self, order: &[usize]) {
        let mut inverse = vec![0usize; order.len()];
        for (new, &old) in order.iter().enumerate() {
            inverse[old] = new;
        }
        self.neighbors = order
            .iter()
            .map(|&old| remap(&self.neighbors[old], &inverse))
            .collect();
        self.associates = order
            .iter()
            .map(|&old| remap(&self.associates[old], &inverse))
            .collect();
    }

    /// Pairs violating the inverse relation among retained positions.
    ///
    /// Returns `(owner, member)` pairs where `member` lists `owner` as a
    /// neighbour but is missing from `owner`'s associates, or vice versa.
    pub fn inverse_violations(&self, retained: &[bool]) -> Vec<(usize, usize)> {
        let live = |p: usize| retained.get(p).copied().unwrap_or(false);
        let mut violations = Vec::new();
        for owner in (0..self.len()).filter(|&p| live(p)) {
            for &member in self.associates[owner].iter().filter(|&&m| live(m)) {
                if !self.neighbors[member].contains(&owner) {
                    violations.push((owner, member));
                }
            }
            for &neighbor in self.neighbors[owner].iter().filter(|&&n| live(n)) {
                if !self.associates[neighbor].contains(&owner) {
                    violations.push((neighbor, owner));
                }
            }
        }
        violations
    }
}

fn remap<L: FromIterator<usize>>(list: &[usize], inverse: &[usize]) -> L {
    list.iter().map(|&p| inverse[p]).collect()
}

/// Stable sort of positions by a distance key.
pub(crate) fn sort_by_distance<F>(list: &mut [usize], mut distance: F)
where
    F: FnMut(usize) -> f64,
{
    let mut keyed: Vec<(f64, usize)> = list.iter().map(|&p| (distance(p), p)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (slot, (_, p)) in list.iter_mut().zip(keyed) {
        *slot = p;
    }
}
