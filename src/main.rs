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

use std::{
    fs::File,
    io::{stdin, stdout, BufReader, BufWriter},
    path::PathBuf,
};

use clap::{Parser, Subcommand, ValueEnum};
use linkstate::{
    snapshot::{self, Summary},
    Simulator,
};
use spfsim::prelude::*;

/// Simulate the routing tables of a link-state routing protocol.
#[derive(Debug, Parser)]
struct Cli {
    /// What to do
    #[command(subcommand)]
    command: Command,
}

/// Subcommands of the program
#[derive(Debug, Subcommand)]
enum Command {
    /// Process a session and print the tables of all queried routers.
    Run {
        /// File containing the session. If omitted, the session is read from stdin.
        input: Option<PathBuf>,
        /// Algorithm used to compute the routing tables
        #[clap(short, long, default_value = "array")]
        algorithm: Algorithm,
        /// Compute every routing table with both algorithms, and abort if they disagree.
        #[clap(short, long)]
        cross_check: bool,
        /// Where to store the final topology. Defaults to a file name depending on the
        /// algorithm.
        #[clap(short, long)]
        snapshot: Option<PathBuf>,
        /// Do not store the final topology.
        #[clap(long, conflicts_with = "snapshot")]
        no_snapshot: bool,
    },

    /// Print the number of routers and links of a stored topology.
    Extract {
        /// The snapshot, previously generated with `run`.
        snapshot: PathBuf,
    },

    /// Compare both algorithms on every router of a stored topology.
    Audit {
        /// The snapshot, previously generated with `run`.
        snapshot: PathBuf,
        /// Number of threads. Defaults to the number of CPUs.
        #[clap(short, long)]
        threads: Option<usize>,
    },
}

/// Shortest-path algorithm
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, ValueEnum)]
enum Algorithm {
    /// Dijkstra's algorithm in `O(n²)`
    Array,
    /// Dijkstra's algorithm in `O(n log n)`, using a binary heap.
    Heap,
}

impl Algorithm {
    /// File name of the snapshot, if none is given.
    fn default_snapshot(&self) -> PathBuf {
        match self {
            Algorithm::Array => PathBuf::from("graph_dijkstra.json"),
            Algorithm::Heap => PathBuf::from("graph_dijkstra_nlogn.json"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_timed();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            input,
            algorithm,
            cross_check,
            snapshot,
            no_snapshot,
        } => {
            let snapshot = if no_snapshot {
                None
            } else {
                Some(snapshot.unwrap_or_else(|| algorithm.default_snapshot()))
            };
            match algorithm {
                Algorithm::Array => run::<ArrayDijkstra>(input, cross_check, snapshot)?,
                Algorithm::Heap => run::<HeapDijkstra>(input, cross_check, snapshot)?,
            }
        }
        Command::Extract { snapshot } => {
            let topo = snapshot::load(snapshot)?;
            print!("{}", Summary::new(&topo));
        }
        Command::Audit { snapshot, threads } => audit(snapshot, threads)?,
    }

    Ok(())
}

/// Process a session from `input` (or stdin), and store the final topology in `snapshot`.
fn run<A: SpfAlgorithm>(
    input: Option<PathBuf>,
    cross_check: bool,
    snapshot: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sim = Simulator::<A>::new().cross_check(cross_check);
    let output = BufWriter::new(stdout().lock());

    let result = match input {
        Some(path) => sim.run(BufReader::new(File::open(path)?), output),
        None => sim.run(stdin().lock(), output),
    };

    // store the topology, even if the session was aborted.
    if let Some(path) = snapshot {
        snapshot::save(sim.topology(), path)?;
    }

    result?;
    Ok(())
}

/// Cross-check both algorithms on all routers of a stored topology.
fn audit(snapshot: PathBuf, threads: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let threads = threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    let topo = snapshot::load(snapshot)?;
    let mismatches = snapshot::audit(&topo);
    for mismatch in mismatches.iter() {
        println!("{}", mismatch.fmt(&topo));
    }
    println!(
        "Checked {} routers: {} mismatches",
        topo.num_routers(),
        mismatches.len()
    );

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(format!("{} routers have inconsistent routing tables", mismatches.len()).into())
    }
}
