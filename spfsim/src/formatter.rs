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

//! Module that introduces a formatter to display all types containing `RouterId`. Tables are
//! rendered as rows of fields separated by `|`:
//!
//! - neighbour table: `destination|weight`
//! - LSDB: `low|high|weight`
//! - routing table: `destination|next_hop|cost`
//!
//! Multiple rows are separated by a newline, without a trailing newline.

use itertools::{EitherOrBoth, Itertools};

use crate::{
    lsdb::{Lsdb, LsdbRecord},
    spf::{RouteEntry, RoutingTable, SpfMismatch},
    topology::Topology,
    types::{LinkWeight, RouterId},
};

/// Trait to format a type that contains RouterIds
pub trait TopologyFormatter<'a, 't> {
    /// Type that is returned, which implements `std::fmt::Display`.
    type Formatter;

    /// Return a struct that can be formatted and displayed. Routers that do not exist in the
    /// topology are shown as `?`.
    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter;
}

impl<'a, 't> TopologyFormatter<'a, 't> for RouterId {
    type Formatter = &'t str;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        topo.router_name(*self).unwrap_or("?")
    }
}

//
// Neighbour table
//

impl<'a, 't> TopologyFormatter<'a, 't> for (RouterId, LinkWeight) {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        format!("{}|{}", self.0.fmt(topo), self.1)
    }
}

impl<'a, 't> TopologyFormatter<'a, 't> for [(RouterId, LinkWeight)] {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        self.iter().map(|n| n.fmt(topo)).join("\n")
    }
}

//
// LSDB
//

impl<'a, 't> TopologyFormatter<'a, 't> for LsdbRecord {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        format!(
            "{}|{}|{}",
            self.low.fmt(topo),
            self.high.fmt(topo),
            self.weight
        )
    }
}

impl<'a, 't> TopologyFormatter<'a, 't> for Lsdb {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        self.iter().map(|r| r.fmt(topo)).join("\n")
    }
}

//
// Routing table
//

impl<'a, 't> TopologyFormatter<'a, 't> for RouteEntry {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        format!(
            "{}|{}|{}",
            self.destination.fmt(topo),
            self.next_hop.fmt(topo),
            self.cost
        )
    }
}

impl<'a, 't> TopologyFormatter<'a, 't> for RoutingTable {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        self.iter().map(|e| e.fmt(topo)).join("\n")
    }
}

impl<'a, 't> TopologyFormatter<'a, 't> for SpfMismatch {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        let rows = self
            .expected
            .iter()
            .zip_longest(self.acquired.iter())
            .map(|x| match x {
                EitherOrBoth::Both(a, b) => (Some(a), Some(b)),
                EitherOrBoth::Left(a) => (Some(a), None),
                EitherOrBoth::Right(b) => (None, Some(b)),
            })
            .filter(|(a, b)| a != b)
            .map(|(a, b)| {
                format!(
                    "    {}: {} != {}: {}",
                    self.array,
                    a.map(|e| e.fmt(topo)).unwrap_or_else(|| "-".to_string()),
                    self.heap,
                    b.map(|e| e.fmt(topo)).unwrap_or_else(|| "-".to_string()),
                )
            })
            .join("\n");
        format!("{self}\n{rows}")
    }
}

//
// Individual Path
//

impl<'a, 't> TopologyFormatter<'a, 't> for [RouterId] {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        self.iter().map(|r| r.fmt(topo)).join(" -> ")
    }
}

impl<'a, 't> TopologyFormatter<'a, 't> for Vec<RouterId> {
    type Formatter = String;

    fn fmt(&'a self, topo: &'t Topology) -> Self::Formatter {
        self.as_slice().fmt(topo)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::spf::{ArrayDijkstra, HeapDijkstra, SpfAlgorithm};

    fn topo() -> Topology {
        let mut t = Topology::new();
        for r in ["B", "A", "C", "D"] {
            t.add_router(r);
        }
        t.add_link("A", "B", 2).unwrap();
        t.add_link("B", "C", 3).unwrap();
        t.add_link("A", "C", 7).unwrap();
        t
    }

    #[test]
    fn neighbour_rows() {
        let t = topo();
        assert_eq!(t.neighbors("C").fmt(&t), "A|7\nB|3");
        assert_eq!(t.neighbors("D").fmt(&t), "");
    }

    #[test]
    fn lsdb_rows() {
        let t = topo();
        assert_eq!(t.lsdb("C").fmt(&t), "A|B|2\nA|C|7\nB|C|3");
    }

    #[test]
    fn routing_rows() {
        let t = topo();
        assert_eq!(
            t.routing_table::<ArrayDijkstra>("A").fmt(&t),
            "B|B|2\nC|B|5"
        );
        assert_eq!(t.routing_table::<HeapDijkstra>("D").fmt(&t), "");
    }

    #[test]
    fn path() {
        let t = topo();
        let a = t.router_id("A").unwrap();
        let c = t.router_id("C").unwrap();
        let tree = HeapDijkstra::shortest_path_tree(&t, a, &t.lsdb("A"));
        assert_eq!(tree.path(c).unwrap().fmt(&t), "A -> B -> C");
    }

    #[test]
    fn mismatch() {
        let t = topo();
        let expected = t.routing_table::<ArrayDijkstra>("A");
        let mismatch = SpfMismatch {
            router: "A".to_string(),
            array: "array",
            heap: "heap",
            expected,
            acquired: RoutingTable::default(),
        };
        assert_eq!(
            mismatch.fmt(&t),
            "array and heap disagree on the routing table of A\n    \
             array: B|B|2 != heap: -\n    \
             array: C|B|5 != heap: -"
        );
    }
}
