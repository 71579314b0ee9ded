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

//! Integration test that processes entire sessions with both algorithms.

use pretty_assertions::assert_eq;
use rand::{prelude::*, rngs::StdRng};
use spfsim::prelude::*;
use test_log::test;

use super::run;
use crate::{runtime::RunStats, snapshot::Summary};

/// Session with an initial link state and a few updates.
const SESSION: &str = "\
A
B
C
D
LINKSTATE
A-B 1
B-C 2
C-D 1
A-D 5 A,D
UPDATE
B-D 1 B
A-D -1
E-A 3 E
C-B 7 A
END
";

/// Expected output of [`SESSION`].
const SESSION_OUTPUT: &str = "\
A Neighbour Table:
B|1
D|5

A LSDB:
A|B|1
A|D|5
B|C|2
C|D|1

A Routing Table:
B|B|1
C|B|3
D|B|4

D Neighbour Table:
A|5
C|1

D LSDB:
A|B|1
A|D|5
B|C|2
C|D|1

D Routing Table:
A|C|4
B|C|3
C|C|1

B Neighbour Table:
A|1
C|2
D|1

B LSDB:
A|B|1
A|D|5
B|C|2
B|D|1
C|D|1

B Routing Table:
A|A|1
C|C|2
D|D|1

E Neighbour Table:
A|3

E LSDB:
A|B|1
A|E|3
B|C|2
B|D|1
C|D|1

E Routing Table:
A|A|3
B|A|4
C|A|6
D|A|5

A Neighbour Table:
B|1
E|3

A LSDB:
A|B|1
A|E|3
B|C|7
B|D|1
C|D|1

A Routing Table:
B|B|1
C|B|3
D|B|2
E|E|3

";

/// Run the test once for each algorithm.
fn for_all(f: impl Fn(fn(&str) -> (String, RunStats, Topology))) {
    f(run::<ArrayDijkstra>);
    f(run::<HeapDijkstra>);
}

#[test]
fn full_session() {
    for_all(|run| {
        let (out, stats, topo) = run(SESSION);
        assert_eq!(out, SESSION_OUTPUT);
        assert_eq!(
            stats,
            RunStats {
                commands: 16,
                skipped: 0,
                reports: 5
            }
        );
        assert_eq!(
            Summary::new(&topo).to_string(),
            "Final number of nodes: 5\nFinal number of edges: 5\n"
        );
    });
}

#[test]
fn equal_cost_paths() {
    let input = "S\nA\nB\nD\nLINKSTATE\nS-A 5\nS-B 5\nA-D 5\nB-D 5 S\nUPDATE\nEND\n";
    for_all(|run| {
        let (out, _, _) = run(input);
        assert!(out.ends_with("S Routing Table:\nA|A|5\nB|B|5\nD|A|10\n\n"));
    });
}

#[test]
fn isolated_router() {
    let input = "A\nB\nX\nLINKSTATE\nA-B 1 X\nUPDATE\nEND\n";
    for_all(|run| {
        let (out, _, _) = run(input);
        assert_eq!(out, "X Neighbour Table:\n\nX LSDB:\n\nX Routing Table:\n\n");
    });
}

#[test]
fn requery_is_identical() {
    let input = "A\nB\nC\nLINKSTATE\nA-B 1\nB-C 1\nC-A 1 A,A\nUPDATE\nEND\n";
    for_all(|run| {
        let (out, _, _) = run(input);
        let half = out.len() / 2;
        assert_eq!(&out[..half], &out[half..]);
    });
}

#[test]
fn weight_update_has_no_stale_link() {
    let input = "A\nB\nLINKSTATE\nA-B 4\nUPDATE\nA-B 2\nB-A 9 A\nEND\n";
    for_all(|run| {
        let (out, _, topo) = run(input);
        assert_eq!(topo.num_links(), 1);
        assert_eq!(
            out,
            "A Neighbour Table:\nB|9\n\nA LSDB:\nA|B|9\n\nA Routing Table:\nB|B|9\n\n"
        );
    });
}

#[test]
fn unknown_endpoint_in_linkstate() {
    let input = "A\nB\nLINKSTATE\nA-C 1\nA-B 1 A\nUPDATE\nEND\n";
    for_all(|run| {
        let (out, stats, topo) = run(input);
        assert_eq!(stats.skipped, 1);
        assert!(!topo.has_router("C"));
        assert!(out.contains("A Routing Table:\nB|B|1\n\n"));
    });
}

/// Generate a random session with `n` initial routers. Updates may introduce new routers.
fn random_session(rng: &mut StdRng, n: usize) -> String {
    let mut lines: Vec<String> = (0..n).map(|i| format!("r{i}")).collect();
    let link = |rng: &mut StdRng, max: usize| {
        let a = rng.gen_range(0..max);
        let b = (a + rng.gen_range(1..max)) % max;
        let weight: i64 = if rng.gen_bool(0.2) { -1 } else { rng.gen_range(0..4) };
        let mut line = format!("r{a}-r{b} {weight}");
        if rng.gen_bool(0.3) {
            line.push_str(&format!(" r{a},r{}", rng.gen_range(0..max)));
        }
        line
    };
    lines.push("LINKSTATE".to_string());
    for _ in 0..(2 * n) {
        lines.push(link(rng, n));
    }
    lines.push("UPDATE".to_string());
    for _ in 0..(2 * n) {
        lines.push(link(rng, n + 3));
    }
    lines.push("END".to_string());
    lines.join("\n")
}

#[test]
fn random_sessions_agree() {
    let mut rng = StdRng::seed_from_u64(2023);
    for _ in 0..20 {
        let input = random_session(&mut rng, 12);
        let (array, array_stats, array_topo) = run::<ArrayDijkstra>(&input);
        let (heap, heap_stats, heap_topo) = run::<HeapDijkstra>(&input);
        assert_eq!(array, heap);
        assert_eq!(array_stats, heap_stats);
        assert_eq!(array_topo, heap_topo);
    }
}
