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

//! # Topology store
//!
//! This module contains the [`Topology`], the single piece of state that lives for the entire
//! simulation. It stores all routers (identified by their name) and all undirected, weighted links
//! between them. Both directions of a link are represented by a single undirected edge in the
//! underlying graph, such that they can never diverge.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};

use crate::{
    lsdb::Lsdb,
    spf::{RoutingTable, SpfAlgorithm},
    types::{LinkStateGraph, LinkWeight, NetworkError, RouterId},
};

/// # Topology
/// Stores all routers and their links. Routers are referenced either by their name or by their
/// [`RouterId`]. The ids remain stable while routers are removed.
///
/// ```rust
/// use spfsim::prelude::*;
///
/// fn main() -> Result<(), NetworkError> {
///     let mut topo = Topology::new();
///     topo.add_router("A");
///     topo.add_router("B");
///     topo.add_link("A", "B", 5)?;
///
///     assert!(topo.has_link("B", "A"));
///     assert_eq!(topo.link_weight("B", "A")?, 5);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "LinkStateGraph", into = "LinkStateGraph")]
pub struct Topology {
    graph: LinkStateGraph,
    lut: BTreeMap<String, RouterId>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new router and return its id. If a router with the same name already exists, nothing
    /// is changed, and the id of the existing router is returned.
    pub fn add_router(&mut self, name: impl Into<String>) -> RouterId {
        let name = name.into();
        if let Some(id) = self.lut.get(&name) {
            return *id;
        }
        let id = self.graph.add_node(name.clone());
        log::debug!("Add router {name}");
        self.lut.insert(name, id);
        id
    }

    /// Remove a router together with all of its links.
    pub fn remove_router(&mut self, name: &str) -> Result<(), NetworkError> {
        let id = self
            .lut
            .remove(name)
            .ok_or_else(|| NetworkError::RouterNotFound(name.to_string()))?;
        self.graph.remove_node(id);
        log::debug!("Remove router {name}");
        Ok(())
    }

    /// Change the name of a router. The new name must not be used by any other router.
    pub fn rename_router(&mut self, old: &str, new: impl Into<String>) -> Result<(), NetworkError> {
        let new = new.into();
        if self.lut.contains_key(&new) {
            return Err(NetworkError::RouterExists(new));
        }
        let id = self
            .lut
            .remove(old)
            .ok_or_else(|| NetworkError::RouterNotFound(old.to_string()))?;
        if let Some(n) = self.graph.node_weight_mut(id) {
            *n = new.clone();
        }
        log::debug!("Rename router {old} to {new}");
        self.lut.insert(new, id);
        Ok(())
    }

    /// Add a link between `a` and `b` with the given weight. Both routers must already exist. If
    /// the link exists already, then its weight is overwritten, such that there never exist two
    /// parallel links.
    pub fn add_link(&mut self, a: &str, b: &str, weight: LinkWeight) -> Result<(), NetworkError> {
        let unknown =
            |x: &str| NetworkError::UnknownEndpoint(a.to_string(), b.to_string(), x.to_string());
        let a_id = self.router_id(a).map_err(|_| unknown(a))?;
        let b_id = self.router_id(b).map_err(|_| unknown(b))?;
        if a_id == b_id {
            return Err(NetworkError::SelfLoop(a.to_string()));
        }
        match self.graph.find_edge(a_id, b_id) {
            Some(e) => {
                log::debug!("Overwrite link {a} -- {b} with weight {weight}");
                self.graph[e] = weight;
            }
            None => {
                log::debug!("Add link {a} -- {b} with weight {weight}");
                self.graph.add_edge(a_id, b_id, weight);
            }
        }
        Ok(())
    }

    /// Remove the link between `a` and `b`, and return its weight. If either the routers or the
    /// link does not exist, nothing happens and `None` is returned.
    pub fn remove_link(&mut self, a: &str, b: &str) -> Option<LinkWeight> {
        let e = self.find_link(a, b)?;
        log::debug!("Remove link {a} -- {b}");
        self.graph.remove_edge(e)
    }

    /// Update the weight of an existing link, and return the old weight.
    pub fn set_link_weight(
        &mut self,
        a: &str,
        b: &str,
        weight: LinkWeight,
    ) -> Result<LinkWeight, NetworkError> {
        let e = self
            .find_link(a, b)
            .ok_or_else(|| NetworkError::LinkNotFound(a.to_string(), b.to_string()))?;
        log::debug!("Set weight of link {a} -- {b} to {weight}");
        Ok(std::mem::replace(&mut self.graph[e], weight))
    }

    /// Apply a link-state update. `Some(weight)` creates the link or overwrites its weight, while
    /// `None` removes the link (if it exists).
    pub fn apply_link_update(
        &mut self,
        a: &str,
        b: &str,
        weight: Option<LinkWeight>,
    ) -> Result<(), NetworkError> {
        match weight {
            Some(w) => self.add_link(a, b, w),
            None => {
                self.remove_link(a, b);
                Ok(())
            }
        }
    }

    /// Check if a router with that name exists.
    pub fn has_router(&self, name: &str) -> bool {
        self.lut.contains_key(name)
    }

    /// Check if a link between `a` and `b` exists. This is symmetric.
    pub fn has_link(&self, a: &str, b: &str) -> bool {
        self.find_link(a, b).is_some()
    }

    /// Get the weight of the link between `a` and `b`.
    pub fn link_weight(&self, a: &str, b: &str) -> Result<LinkWeight, NetworkError> {
        self.find_link(a, b)
            .map(|e| self.graph[e])
            .ok_or_else(|| NetworkError::LinkNotFound(a.to_string(), b.to_string()))
    }

    /// Get all neighbors of a router together with the link weight, sorted by the name of the
    /// neighbor. An unknown router has no neighbors.
    pub fn neighbors(&self, name: &str) -> Vec<(RouterId, LinkWeight)> {
        match self.lut.get(name) {
            Some(id) => self.neighbors_of(*id),
            None => Vec::new(),
        }
    }

    /// Get all neighbors of a router (by its id), sorted by the name of the neighbor.
    pub fn neighbors_of(&self, router: RouterId) -> Vec<(RouterId, LinkWeight)> {
        if !self.graph.contains_node(router) {
            return Vec::new();
        }
        self.graph
            .edges(router)
            .map(|e| (other_end(router, e.source(), e.target()), *e.weight()))
            .sorted_by(|(a, _), (b, _)| self.graph[*a].cmp(&self.graph[*b]))
            .collect()
    }

    /// Get the id of a router by its name.
    pub fn router_id(&self, name: &str) -> Result<RouterId, NetworkError> {
        self.lut
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::RouterNotFound(name.to_string()))
    }

    /// Get the name of a router by its id.
    pub fn router_name(&self, router: RouterId) -> Result<&str, NetworkError> {
        self.graph
            .node_weight(router)
            .map(|s| s.as_str())
            .ok_or_else(|| NetworkError::RouterNotFound(format!("{router:?}")))
    }

    /// Iterate over all routers, sorted by their name.
    pub fn routers(&self) -> impl Iterator<Item = (&str, RouterId)> + '_ {
        self.lut.iter().map(|(n, id)| (n.as_str(), *id))
    }

    /// Get all links as triples `(low, high, weight)`, where `low` is the endpoint with the
    /// lexicographically smaller name. The links are sorted by `(low, high)`.
    pub fn links(&self) -> Vec<(RouterId, RouterId, LinkWeight)> {
        self.graph
            .edge_references()
            .map(|e| {
                let (a, b) = (e.source(), e.target());
                if self.graph[a] < self.graph[b] {
                    (a, b, *e.weight())
                } else {
                    (b, a, *e.weight())
                }
            })
            .sorted_by(|(a1, b1, _), (a2, b2, _)| {
                (&self.graph[*a1], &self.graph[*b1]).cmp(&(&self.graph[*a2], &self.graph[*b2]))
            })
            .collect()
    }

    /// Returns the number of routers.
    pub fn num_routers(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of undirected links.
    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns a reference to the underlying graph. This is a consistent read of the entire
    /// adjacency state.
    pub fn graph(&self) -> &LinkStateGraph {
        &self.graph
    }

    /// Compute the link-state database of the router `name` (see [`Lsdb::build`]).
    pub fn lsdb(&self, name: &str) -> Lsdb {
        match self.lut.get(name) {
            Some(id) => Lsdb::build(self, *id),
            None => Lsdb::default(),
        }
    }

    /// Compute the routing table of the router `name` using the algorithm `A`. An unknown router
    /// has an empty routing table.
    pub fn routing_table<A: SpfAlgorithm>(&self, name: &str) -> RoutingTable {
        match self.lut.get(name) {
            Some(id) => A::compute(self, *id, &Lsdb::build(self, *id)),
            None => RoutingTable::default(),
        }
    }

    /// Serialize the topology as a JSON string.
    pub fn to_json(&self) -> Result<String, NetworkError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a topology from a JSON string generated by [`Topology::to_json`]. The graph is
    /// rejected if it contains duplicate router names, self-loops, or parallel links.
    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the edge index of the link between `a` and `b`.
    fn find_link(&self, a: &str, b: &str) -> Option<petgraph::stable_graph::EdgeIndex<u32>> {
        let a = self.lut.get(a)?;
        let b = self.lut.get(b)?;
        self.graph.find_edge(*a, *b)
    }
}

/// Get the endpoint of an edge `(source, target)` that is not `this`.
#[inline]
pub(crate) fn other_end(this: RouterId, source: RouterId, target: RouterId) -> RouterId {
    if source == this {
        target
    } else {
        source
    }
}

impl PartialEq for Topology {
    fn eq(&self, other: &Self) -> bool {
        let names = |t: &Topology| {
            t.links()
                .into_iter()
                .map(|(a, b, w)| (t.graph[a].clone(), t.graph[b].clone(), w))
                .collect::<Vec<_>>()
        };
        self.lut.keys().eq(other.lut.keys()) && names(self) == names(other)
    }
}

impl TryFrom<LinkStateGraph> for Topology {
    type Error = NetworkError;

    fn try_from(graph: LinkStateGraph) -> Result<Self, Self::Error> {
        let mut lut = BTreeMap::new();
        for id in graph.node_indices() {
            if lut.insert(graph[id].clone(), id).is_some() {
                return Err(NetworkError::RouterExists(graph[id].clone()));
            }
        }
        if let Some(e) = graph.edge_references().find(|e| e.source() == e.target()) {
            return Err(NetworkError::SelfLoop(graph[e.source()].clone()));
        }
        let mut pairs = HashSet::new();
        for e in graph.edge_references() {
            let pair = (e.source().min(e.target()), e.source().max(e.target()));
            if !pairs.insert(pair) {
                return Err(NetworkError::ParallelLink(
                    graph[pair.0].clone(),
                    graph[pair.1].clone(),
                ));
            }
        }
        Ok(Self { graph, lut })
    }
}

impl From<Topology> for LinkStateGraph {
    fn from(topo: Topology) -> Self {
        topo.graph
    }
}
