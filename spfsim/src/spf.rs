// SpfSim: Link-State Routing Simulator written in Rust
// Copyright (C) 2022-2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! This module contains the shortest-path first (SPF) computation. It computes the routing table of
//! a single router, restricted to the routers in its link-state database. No message passing is
//! simulated, the routing table is computed directly using Dijkstra's algorithm.
//!
//! There are two implementations of [`SpfAlgorithm`]:
//! - [`ArrayDijkstra`] scans all routers to find the next one to finalize (`O(n²)`).
//! - [`HeapDijkstra`] uses a binary heap with lazy deletion (`O(n log n)`).
//!
//! Both implementations share the same relaxation step, and must produce identical routing tables.
//! Ties are broken deterministically:
//!
//! - *Selection*: among all routers with the same minimal cost, the one with the smallest name is
//!   finalized first.
//! - *Relaxation*: if the path via the just-finalized router `w` has the same cost as the current
//!   path towards `v`, then the path with fewer hops is kept. If both paths have the same number
//!   of hops, the current path is only replaced if its next hop has a larger name than the next
//!   hop of the path via `w`. Thus, the smaller next hop wins.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

use itertools::Itertools;
use thiserror::Error;

use crate::{
    lsdb::Lsdb,
    topology::Topology,
    types::{Cost, RouterId},
};

/// Interface of a shortest-path algorithm.
pub trait SpfAlgorithm {
    /// Name of the algorithm, used for logging.
    const NAME: &'static str;

    /// Compute the shortest-path tree rooted at `source`, restricted to the routers that appear in
    /// `lsdb`.
    fn shortest_path_tree(topo: &Topology, source: RouterId, lsdb: &Lsdb) -> SpfTree;

    /// Compute the routing table of `source`. The table contains exactly one entry for every router
    /// in `lsdb` other than `source`, sorted by the name of the destination.
    fn compute(topo: &Topology, source: RouterId, lsdb: &Lsdb) -> RoutingTable {
        let tree = Self::shortest_path_tree(topo, source, lsdb);
        log::trace!(
            "[{}] finalized {} routers for {}",
            Self::NAME,
            tree.finalize_order.len(),
            topo.router_name(source).unwrap_or("?")
        );
        tree.routing_table()
    }
}

/// Dijkstra's algorithm that selects the next router by scanning all routers that are not yet
/// finalized (`O(n²)`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayDijkstra;

/// Dijkstra's algorithm using a binary heap (`O(n log n)`). The heap has no decrease-key
/// operation. Instead, a router is pushed again every time it adopts a new path, and entries of
/// routers that are already finalized are discarded when they are popped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapDijkstra;

impl SpfAlgorithm for ArrayDijkstra {
    const NAME: &'static str = "array";

    fn shortest_path_tree(topo: &Topology, source: RouterId, lsdb: &Lsdb) -> SpfTree {
        let mut tree = SpfTree::new(topo, source, lsdb);
        let Some(root) = tree.root else {
            return tree;
        };

        tree.finalize(root);
        tree.relax(topo, root);

        while let Some(w) = tree.select_min() {
            tree.finalize(w);
            tree.relax(topo, w);
        }

        // every router of the LSDB is reachable from the source.
        debug_assert_eq!(tree.finalize_order.len(), tree.nodes.len());

        tree
    }
}

impl SpfAlgorithm for HeapDijkstra {
    const NAME: &'static str = "heap";

    fn shortest_path_tree(topo: &Topology, source: RouterId, lsdb: &Lsdb) -> SpfTree {
        let mut tree = SpfTree::new(topo, source, lsdb);
        let Some(root) = tree.root else {
            return tree;
        };

        // The heap is ordered by (cost, name). Since the routers are indexed in the order of their
        // names, comparing the index is the same as comparing the name.
        let mut heap: BinaryHeap<Reverse<(Cost, usize)>> = BinaryHeap::new();
        heap.push(Reverse((0, root)));

        while let Some(Reverse((_, w))) = heap.pop() {
            if tree.nodes[w].finalized {
                continue;
            }
            tree.finalize(w);
            for v in tree.relax(topo, w) {
                if let Some(cost) = tree.nodes[v].cost {
                    heap.push(Reverse((cost, v)));
                }
            }
        }

        tree
    }
}

/// Working state of a single router during the computation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SpfNode {
    /// The router itself
    router: RouterId,
    /// Cost of the best known path. `None` means that the router was not reached yet.
    cost: Option<Cost>,
    /// Index of the predecessor on the best known path.
    parent: Option<usize>,
    /// Number of links on the best known path.
    hops: usize,
    /// Index of the first router after the source on the best known path.
    next_hop: Option<usize>,
    /// Whether the cost of this router can no longer change.
    finalized: bool,
}

/// Shortest-path tree rooted at a single router. Each router is stored in a flat vector (sorted by
/// name), and references its parent by its index in that vector. The parent of a router is always
/// finalized before the router adopts it, and finalized routers never change their parent. Hence,
/// following the parents always terminates at the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpfTree {
    root: Option<usize>,
    nodes: Vec<SpfNode>,
    lut: HashMap<RouterId, usize>,
    finalize_order: Vec<usize>,
}

impl SpfTree {
    /// Prepare the working state for all routers in the LSDB. If the LSDB is empty, then the tree
    /// is empty as well (`root` is `None`).
    fn new(topo: &Topology, source: RouterId, lsdb: &Lsdb) -> Self {
        let reachable = lsdb.reachable();
        let nodes: Vec<SpfNode> = reachable
            .into_iter()
            .sorted_by(|a, b| {
                topo.router_name(*a)
                    .unwrap_or("?")
                    .cmp(topo.router_name(*b).unwrap_or("?"))
            })
            .map(|router| SpfNode {
                router,
                cost: (router == source).then_some(0),
                parent: None,
                hops: 0,
                next_hop: None,
                finalized: false,
            })
            .collect();
        let lut: HashMap<RouterId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.router, i))
            .collect();
        Self {
            root: lut.get(&source).copied(),
            nodes,
            lut,
            finalize_order: Vec::new(),
        }
    }

    /// Mark the router at index `w` as finalized.
    fn finalize(&mut self, w: usize) {
        self.nodes[w].finalized = true;
        self.finalize_order.push(w);
    }

    /// Find the router that is not yet finalized with the smallest cost. Ties are broken by
    /// choosing the smallest name. Routers that were not yet reached are never selected.
    fn select_min(&self) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.finalized)
            .filter_map(|(i, n)| Some((n.cost?, i)))
            .min()
            .map(|(_, i)| i)
    }

    /// Relax all links of the (just finalized) router at index `w` towards routers that are not
    /// yet finalized. Returns the indices of all routers that adopted `w` as their new parent.
    fn relax(&mut self, topo: &Topology, w: usize) -> Vec<usize> {
        let mut updated = Vec::new();
        let Some(cost_w) = self.nodes[w].cost else {
            return updated;
        };

        for (neighbor, weight) in topo.neighbors_of(self.nodes[w].router) {
            let Some(v) = self.lut.get(&neighbor).copied() else {
                continue;
            };
            if self.nodes[v].finalized {
                continue;
            }
            let candidate = cost_w + Cost::from(weight);
            let adopt = match self.nodes[v].cost {
                None => true,
                Some(current) if candidate < current => true,
                Some(current) if candidate == current => self.prefer_candidate(v, w),
                Some(_) => false,
            };
            if adopt {
                self.adopt(v, w, candidate);
                updated.push(v);
            }
        }

        updated
    }

    /// Decide whether the path via `w` should replace the current path towards `v`, given that both
    /// have the same cost. The path with fewer hops wins. If both have the same number of hops,
    /// the current path is replaced only if its next hop is larger than the next hop via `w`.
    fn prefer_candidate(&self, v: usize, w: usize) -> bool {
        let current_hops = self.nodes[v].hops;
        let candidate_hops = self.nodes[w].hops + 1;
        if current_hops != candidate_hops {
            return current_hops > candidate_hops;
        }
        match (self.nodes[v].next_hop, self.next_hop_via(v, w)) {
            (Some(current), candidate) => current > candidate,
            (None, _) => true,
        }
    }

    /// Next hop of the path towards `v` via its neighbor `w`.
    fn next_hop_via(&self, v: usize, w: usize) -> usize {
        if Some(w) == self.root {
            v
        } else {
            self.nodes[w].next_hop.unwrap_or(v)
        }
    }

    /// Let `v` use the path via `w` with the given cost.
    fn adopt(&mut self, v: usize, w: usize, cost: Cost) {
        log::trace!(
            "{:?}: cost {:?} -> {cost} via {:?}",
            self.nodes[v].router,
            self.nodes[v].cost,
            self.nodes[w].router
        );
        let next_hop = self.next_hop_via(v, w);
        let hops = self.nodes[w].hops + 1;
        let node = &mut self.nodes[v];
        node.cost = Some(cost);
        node.parent = Some(w);
        node.hops = hops;
        node.next_hop = Some(next_hop);
    }

    /// Get the root of the tree, or `None` if the tree is empty.
    pub fn root(&self) -> Option<RouterId> {
        self.root.map(|i| self.nodes[i].router)
    }

    /// Get the cost to reach `router`, if it was reached.
    pub fn cost(&self, router: RouterId) -> Option<Cost> {
        self.nodes[*self.lut.get(&router)?].cost
    }

    /// Get the routers in the order in which they were finalized, starting with the root.
    pub fn finalize_order(&self) -> Vec<RouterId> {
        self.finalize_order
            .iter()
            .map(|i| self.nodes[*i].router)
            .collect()
    }

    /// Get the path from the root towards `router` (including both endpoints), by following the
    /// parents. Returns `None` if `router` was not reached.
    pub fn path(&self, router: RouterId) -> Option<Vec<RouterId>> {
        let mut current = *self.lut.get(&router)?;
        self.nodes[current].cost?;
        let mut path = vec![self.nodes[current].router];
        while let Some(parent) = self.nodes[current].parent {
            path.push(self.nodes[parent].router);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// Build the routing table from the finalized routers, sorted by the name of the destination.
    pub fn routing_table(&self) -> RoutingTable {
        let entries = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| n.finalized && Some(*i) != self.root)
            .filter_map(|(_, n)| {
                Some(RouteEntry {
                    destination: n.router,
                    next_hop: self.nodes[n.next_hop?].router,
                    cost: n.cost?,
                })
            })
            .collect();
        RoutingTable { entries }
    }
}

/// A single entry in the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteEntry {
    /// Destination router
    pub destination: RouterId,
    /// First router after the source on the path towards the destination.
    pub next_hop: RouterId,
    /// Cost of the path
    pub cost: Cost,
}

/// Routing table of a single router. The entries are sorted by the name of the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    entries: Vec<RouteEntry>,
}

impl RoutingTable {
    /// Get all entries, sorted by destination.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> std::slice::Iter<'_, RouteEntry> {
        self.entries.iter()
    }

    /// Get the entry towards a specific destination.
    pub fn get(&self, destination: RouterId) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.destination == destination)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RoutingTable {
    type Item = &'a RouteEntry;
    type IntoIter = std::slice::Iter<'a, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The two algorithms computed different routing tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{array} and {heap} disagree on the routing table of {router}")]
pub struct SpfMismatch {
    /// Router whose routing table was computed
    pub router: String,
    /// Name of the first algorithm
    pub array: &'static str,
    /// Name of the second algorithm
    pub heap: &'static str,
    /// Result of the first algorithm
    pub expected: RoutingTable,
    /// Result of the second algorithm
    pub acquired: RoutingTable,
}

/// Compute the routing table of `source` with both [`ArrayDijkstra`] and [`HeapDijkstra`] on the
/// same LSDB, and return the table if both agree.
pub fn cross_check(topo: &Topology, source: RouterId, lsdb: &Lsdb) -> Result<RoutingTable, SpfMismatch> {
    let expected = ArrayDijkstra::compute(topo, source, lsdb);
    let acquired = HeapDijkstra::compute(topo, source, lsdb);
    if expected == acquired {
        Ok(expected)
    } else {
        Err(SpfMismatch {
            router: topo.router_name(source).unwrap_or("?").to_string(),
            array: ArrayDijkstra::NAME,
            heap: HeapDijkstra::NAME,
            expected,
            acquired,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::LinkWeight;

    fn topo(links: &[(&str, &str, LinkWeight)]) -> Topology {
        let mut t = Topology::new();
        for (a, b, w) in links {
            t.add_router(*a);
            t.add_router(*b);
            t.add_link(a, b, *w).unwrap();
        }
        t
    }

    fn tree<A: SpfAlgorithm>(t: &Topology, source: &str) -> SpfTree {
        let id = t.router_id(source).unwrap();
        A::shortest_path_tree(t, id, &Lsdb::build(t, id))
    }

    fn names(t: &Topology, routers: Vec<RouterId>) -> Vec<&str> {
        routers
            .into_iter()
            .map(|r| t.router_name(r).unwrap())
            .collect()
    }

    #[test]
    fn empty_tree_for_isolated_router() {
        let mut t = topo(&[("A", "B", 1)]);
        t.add_router("X");
        let x = tree::<ArrayDijkstra>(&t, "X");
        assert_eq!(x.root(), None);
        assert!(x.routing_table().is_empty());
        assert_eq!(tree::<HeapDijkstra>(&t, "X"), x);
    }

    #[test]
    fn equal_cost_prefers_smaller_next_hop() {
        let t = topo(&[("S", "A", 5), ("S", "B", 5), ("A", "D", 5), ("B", "D", 5)]);
        let d = t.router_id("D").unwrap();
        let a = t.router_id("A").unwrap();
        for tree in [tree::<ArrayDijkstra>(&t, "S"), tree::<HeapDijkstra>(&t, "S")] {
            let table = tree.routing_table();
            assert_eq!(table.get(d).map(|e| (e.next_hop, e.cost)), Some((a, 10)));
            assert_eq!(names(&t, tree.path(d).unwrap()), vec!["S", "A", "D"]);
        }
    }

    #[test]
    fn equal_cost_prefers_fewer_hops() {
        let t = topo(&[
            ("S", "A", 1),
            ("A", "B", 1),
            ("B", "D", 1),
            ("S", "C", 2),
            ("C", "D", 1),
        ]);
        let d = t.router_id("D").unwrap();
        let c = t.router_id("C").unwrap();
        for tree in [tree::<ArrayDijkstra>(&t, "S"), tree::<HeapDijkstra>(&t, "S")] {
            assert_eq!(tree.cost(d), Some(3));
            assert_eq!(tree.routing_table().get(d).map(|e| e.next_hop), Some(c));
            assert_eq!(names(&t, tree.path(d).unwrap()), vec!["S", "C", "D"]);
        }
    }

    #[test]
    fn finalize_order_is_identical() {
        let t = topo(&[
            ("A", "B", 2),
            ("A", "C", 2),
            ("B", "D", 1),
            ("C", "D", 1),
            ("D", "E", 4),
            ("C", "E", 5),
            ("E", "F", 1),
        ]);
        let array = tree::<ArrayDijkstra>(&t, "A");
        let heap = tree::<HeapDijkstra>(&t, "A");
        assert_eq!(
            names(&t, array.finalize_order()),
            vec!["A", "B", "C", "D", "E", "F"]
        );
        assert_eq!(array.finalize_order(), heap.finalize_order());
        assert_eq!(array.routing_table(), heap.routing_table());
    }

    #[test]
    fn path_costs_match_table() {
        let t = topo(&[
            ("A", "B", 4),
            ("A", "C", 1),
            ("C", "B", 1),
            ("B", "D", 3),
            ("C", "D", 7),
        ]);
        let tree = tree::<HeapDijkstra>(&t, "A");
        for entry in &tree.routing_table() {
            let path = tree.path(entry.destination).unwrap();
            let cost: Cost = path
                .windows(2)
                .map(|w| {
                    let a = t.router_name(w[0]).unwrap();
                    let b = t.router_name(w[1]).unwrap();
                    Cost::from(t.link_weight(a, b).unwrap())
                })
                .sum();
            assert_eq!(cost, entry.cost);
            assert_eq!(path[1], entry.next_hop);
        }
    }

    #[test]
    fn cross_check_agrees() {
        let t = topo(&[("A", "B", 1), ("B", "C", 1), ("A", "C", 2)]);
        let a = t.router_id("A").unwrap();
        let table = cross_check(&t, a, &Lsdb::build(&t, a)).unwrap();
        assert_eq!(table, t.routing_table::<ArrayDijkstra>("A"));
        assert_eq!(table.len(), 2);
    }
}
