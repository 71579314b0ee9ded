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

//! Test module for the simulator


use crate::{formatter::TopologyFormatter, spf::SpfAlgorithm, topology::Topology};

/// Render the routing table of `router` computed with `A`.
fn table<A: SpfAlgorithm>(topo: &Topology, router: &str) -> String {
    topo.routing_table::<A>(router).fmt(topo)
}

macro_rules! assert_table {
    ($algo: ty, $topo: expr, $router: expr, [$($row: expr),* $(,)?]) => {
        let exp: Vec<&str> = vec![$($row),*];
        let acq = crate::test::table::<$algo>(&$topo, $router);
        pretty_assertions::assert_eq!(acq, exp.join("\n"))
    };
}

pub(crate) use assert_table;
