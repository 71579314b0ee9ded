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

//! This module contains the link-state database (LSDB) of a single router. The LSDB contains all
//! links that the router would learn by flooding, i.e., every link that is reachable from the
//! router. It is computed by a depth-first traversal of the topology, and not by any shortest-path
//! computation.

use std::collections::HashSet;

use crate::{
    topology::Topology,
    types::{LinkWeight, RouterId},
};

/// A single link in the LSDB. `low` is always the endpoint with the lexicographically smaller
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LsdbRecord {
    /// Endpoint with the smaller name
    pub low: RouterId,
    /// Endpoint with the larger name
    pub high: RouterId,
    /// Weight of the link
    pub weight: LinkWeight,
}

/// Link-state database of a single router. The records are sorted by the names of `(low, high)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lsdb {
    records: Vec<LsdbRecord>,
}

/// Stack frame of the traversal: the sorted neighbors of the expanded router, and the position of
/// the next neighbor to descend into.
#[derive(Debug)]
struct Frame {
    neighbors: Vec<(RouterId, LinkWeight)>,
    next: usize,
}

impl Lsdb {
    /// Build the LSDB of `source` by walking the topology depth-first.
    ///
    /// A router is marked as visited as soon as the walk enters it. When entering a router, one
    /// record is emitted for every link towards a router that is not yet visited. Afterwards, the
    /// walk descends into each of these neighbors that is still unvisited at the time it is
    /// reached. Hence, every link of the connected component is emitted exactly once (by the
    /// endpoint that is entered first). The traversal uses an explicit stack, and visits the
    /// routers in the same pre-order as the recursive formulation.
    ///
    /// A router without any links (or an unknown router) has an empty LSDB.
    pub fn build(topo: &Topology, source: RouterId) -> Self {
        let mut records = Vec::new();
        let mut visited: HashSet<RouterId> = HashSet::new();
        let mut stack: Vec<Frame> = Vec::new();

        stack.push(Self::enter(topo, source, &mut visited, &mut records));

        while let Some(frame) = stack.last_mut() {
            let next = frame.neighbors[frame.next..]
                .iter()
                .position(|(r, _)| !visited.contains(r))
                .map(|i| frame.next + i);
            match next {
                Some(i) => {
                    frame.next = i + 1;
                    let child = frame.neighbors[i].0;
                    let frame = Self::enter(topo, child, &mut visited, &mut records);
                    stack.push(frame);
                }
                None => {
                    stack.pop();
                }
            }
        }

        // sort the records by their names
        records.sort_by(|a, b| {
            (name(topo, a.low), name(topo, a.high)).cmp(&(name(topo, b.low), name(topo, b.high)))
        });

        log::trace!(
            "LSDB of {} contains {} links",
            name(topo, source),
            records.len()
        );

        Self { records }
    }

    /// Mark `router` as visited, emit all links towards unvisited neighbors, and return the stack
    /// frame used to descend into those neighbors.
    fn enter(
        topo: &Topology,
        router: RouterId,
        visited: &mut HashSet<RouterId>,
        records: &mut Vec<LsdbRecord>,
    ) -> Frame {
        visited.insert(router);
        let neighbors = topo.neighbors_of(router);
        for (neighbor, weight) in neighbors.iter().copied() {
            if visited.contains(&neighbor) {
                continue;
            }
            let (low, high) = if name(topo, router) < name(topo, neighbor) {
                (router, neighbor)
            } else {
                (neighbor, router)
            };
            records.push(LsdbRecord { low, high, weight });
        }
        Frame { neighbors, next: 0 }
    }

    /// Get all records, sorted by `(low, high)`.
    pub fn records(&self) -> &[LsdbRecord] {
        &self.records
    }

    /// Iterate over all records.
    pub fn iter(&self) -> std::slice::Iter<'_, LsdbRecord> {
        self.records.iter()
    }

    /// Number of links in the LSDB
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the LSDB does not contain any link.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the set of routers that appear in the LSDB. This is the set of routers reachable from
    /// the source (including the source itself), or the empty set if the source is isolated.
    pub fn reachable(&self) -> HashSet<RouterId> {
        self.records
            .iter()
            .flat_map(|r| [r.low, r.high])
            .collect()
    }
}

impl<'a> IntoIterator for &'a Lsdb {
    type Item = &'a LsdbRecord;
    type IntoIter = std::slice::Iter<'a, LsdbRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[inline]
fn name(topo: &Topology, router: RouterId) -> &str {
    topo.router_name(router).unwrap_or("?")
}
