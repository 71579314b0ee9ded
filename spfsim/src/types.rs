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

//! Module containing all type definitions

use petgraph::prelude::*;
use thiserror::Error;

pub(crate) type IndexType = u32;
/// Router Identification (and index into the graph)
pub type RouterId = NodeIndex<IndexType>;

/// Link Weight of a single (undirected) link.
pub type LinkWeight = u32;

/// Cumulative cost of a path. This is wider than [`LinkWeight`], such that summing up the weights
/// along any simple path cannot overflow.
pub type Cost = u64;

/// Link-state graph. Every node carries the name of the router, and every edge carries the weight
/// of the undirected link. Using an undirected graph guarantees that both directions of a link are
/// always created, updated, and removed together.
pub type LinkStateGraph = StableGraph<String, LinkWeight, Undirected, IndexType>;

/// Network Errors
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Router name is not present in the topology
    #[error("Router was not found in topology: {0}")]
    RouterNotFound(String),
    /// Link is not present in the topology
    #[error("Link does not exist: {0} -- {1}")]
    LinkNotFound(String, String),
    /// A link was added, but one of its endpoints was never registered as a router.
    #[error("Cannot add link {0} -- {1}: endpoint {2} is not a known router")]
    UnknownEndpoint(String, String, String),
    /// A link from a router to itself was requested.
    #[error("Cannot add a link from {0} to itself")]
    SelfLoop(String),
    /// Renaming a router to a name that is already taken.
    #[error("Router already exists: {0}")]
    RouterExists(String),
    /// A stored graph contains more than one link between the same pair of routers.
    #[error("Parallel links between {0} and {1}")]
    ParallelLink(String, String),
    /// Cannot serialize or deserialize the topology.
    #[error("{0}")]
    JsonError(Box<serde_json::Error>),
}

impl NetworkError {
    /// Returns `true` if the operation referenced a router or a link that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RouterNotFound(_) | Self::LinkNotFound(_, _))
    }

    /// Returns `true` if the operation would bring the topology into an invalid state, e.g., by
    /// adding a link to an unregistered router.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::UnknownEndpoint(_, _, _)
                | Self::SelfLoop(_)
                | Self::RouterExists(_)
                | Self::ParallelLink(_, _)
        )
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonError(Box::new(value))
    }
}

impl PartialEq for NetworkError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::RouterNotFound(l0), Self::RouterNotFound(r0)) => l0 == r0,
            (Self::LinkNotFound(l0, l1), Self::LinkNotFound(r0, r1)) => l0 == r0 && l1 == r1,
            (Self::UnknownEndpoint(l0, l1, l2), Self::UnknownEndpoint(r0, r1, r2)) => {
                l0 == r0 && l1 == r1 && l2 == r2
            }
            (Self::SelfLoop(l0), Self::SelfLoop(r0)) => l0 == r0,
            (Self::RouterExists(l0), Self::RouterExists(r0)) => l0 == r0,
            (Self::ParallelLink(l0, l1), Self::ParallelLink(r0, r1)) => l0 == r0 && l1 == r1,
            (Self::JsonError(l), Self::JsonError(r)) => l.to_string() == r.to_string(),
            _ => false,
        }
    }
}
