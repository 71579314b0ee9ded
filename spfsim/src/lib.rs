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

#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # SpfSim
//!
//! This is a library for simulating the routing tables computed by a link-state routing protocol
//! (like OSPF) on a centrally known topology. No messages are exchanged. Instead, the link-state
//! database of each router is derived directly from the topology, and the routing table is
//! computed using Dijkstra's algorithm.
//!
//! ## Main Concepts
//!
//! The [`topology::Topology`] is the main datastructure to operate on. It stores all routers
//! (identified by their name) and the undirected, weighted links between them on a graph (see
//! [Petgraph](https://docs.rs/petgraph/latest/petgraph/index.html)).
//!
//! For any router, the [`lsdb::Lsdb`] contains all links reachable from that router. The routing
//! table ([`spf::RoutingTable`]) is computed on the routers of the LSDB by one of two
//! implementations of [`spf::SpfAlgorithm`]: [`spf::ArrayDijkstra`] (`O(n²)`) and
//! [`spf::HeapDijkstra`] (`O(n log n)`). Both use the same deterministic tie-breaking rules, and
//! always compute identical routing tables. Use [`spf::cross_check`] to verify this on a
//! specific topology.
//!
//! Use the trait [`formatter::TopologyFormatter`] to render tables as rows of `|`-separated
//! fields.
//!
//! ## Optional Features
//!
//! - `rand`: This feature enables helper functions in the [`builder`] for generating random
//!   topologies and link weights.
//!
//! ## Example usage
//!
//! ```
//! use spfsim::prelude::*;
//!
//! fn main() -> Result<(), NetworkError> {
//!     let mut topo = Topology::new();
//!     for r in ["S", "A", "B", "D"] {
//!         topo.add_router(r);
//!     }
//!     topo.add_link("S", "A", 5)?;
//!     topo.add_link("S", "B", 5)?;
//!     topo.add_link("A", "D", 5)?;
//!     topo.add_link("B", "D", 5)?;
//!
//!     // compute the routing table of S
//!     let table = topo.routing_table::<ArrayDijkstra>("S");
//!     assert_eq!(table.fmt(&topo), "A|A|5\nB|B|5\nD|A|10");
//!
//!     // both algorithms compute the same table
//!     assert_eq!(topo.routing_table::<HeapDijkstra>("S"), table);
//!
//!     Ok(())
//! }
//! ```
//!
//! The same topology can be written more compactly using the [`topology!`] macro:
//!
//! ```
//! use spfsim::prelude::*;
//!
//! let topo = topology! {
//!     S - A: 5;
//!     S - B: 5;
//!     A - D: 5;
//!     B - D: 5;
//!     X;
//! };
//!
//! assert_eq!(topo.num_routers(), 5);
//! assert_eq!(topo.lsdb("D").fmt(&topo), "A|D|5\nA|S|5\nB|D|5\nB|S|5");
//! assert!(topo.routing_table::<HeapDijkstra>("X").is_empty());
//! ```

pub mod builder;
#[cfg(not(tarpaulin_include))]
pub mod formatter;
pub mod lsdb;
pub mod prelude;
pub mod spf;
pub mod topology;
pub mod types;

#[cfg(test)]
#[cfg(not(tarpaulin_include))]
mod test;

/// Create a [`topology::Topology`] from a compact description. Each statement is either a link
/// `A - B: weight;` or a single router `A;`. Routers are created in the order in which they first
/// appear. The macro panics if a link connects a router with itself.
///
/// ```
/// use spfsim::prelude::*;
///
/// let topo = topology! {
///     R1 - R2: 3;
///     R2 - R3: 4;
///     R4;
/// };
/// assert_eq!(topo.link_weight("R3", "R2"), Ok(4));
/// assert!(topo.neighbors("R4").is_empty());
/// ```
#[macro_export]
macro_rules! topology {
    (@stmt $t:ident;) => {};
    (@stmt $t:ident; $a:ident - $b:ident : $w:expr ; $($rest:tt)*) => {
        $t.add_router(stringify!($a));
        $t.add_router(stringify!($b));
        if let Err(e) = $t.add_link(stringify!($a), stringify!($b), $w) {
            panic!("invalid link in topology!: {e}");
        }
        $crate::topology!(@stmt $t; $($rest)*);
    };
    (@stmt $t:ident; $r:ident ; $($rest:tt)*) => {
        $t.add_router(stringify!($r));
        $crate::topology!(@stmt $t; $($rest)*);
    };
    ($($body:tt)*) => {{
        let mut t = $crate::topology::Topology::new();
        $crate::topology!(@stmt t; $($body)*);
        t
    }};
}
