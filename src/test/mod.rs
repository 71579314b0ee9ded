// LinkState: Driver for the link-state routing simulator
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
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

//! End-to-end tests of entire sessions.

use spfsim::prelude::*;

use crate::{runtime::RunStats, Simulator};

mod session;

/// Run an entire session with the algorithm `A` (cross-checked against the other one), and
/// return the output.
fn run<A: SpfAlgorithm>(input: &str) -> (String, RunStats, Topology) {
    let mut out = Vec::new();
    let mut sim = Simulator::<A>::new().cross_check(true);
    let stats = sim.run(input.as_bytes(), &mut out).unwrap();
    (String::from_utf8(out).unwrap(), stats, sim.into_topology())
}
