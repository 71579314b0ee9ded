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

//! Runtime that feeds the parsed commands into the topology, and renders the reports of all
//! queried routers.

use std::{
    fmt,
    io::{BufRead, Write},
    marker::PhantomData,
};

use spfsim::{
    formatter::TopologyFormatter,
    lsdb::Lsdb,
    prelude::*,
    spf::{cross_check, SpfMismatch},
};
use thiserror::Error;

use crate::protocol::{Command, CommandReader, LinkUpdate, ProtocolError};

/// Simulator that owns the topology and processes commands strictly one at a time. The routing
/// tables are computed using the algorithm `A`.
#[derive(Debug, Clone)]
pub struct Simulator<A> {
    /// The topology, living for the entire simulation
    topo: Topology,
    /// If set, every routing table is computed with both algorithms, and compared.
    cross_check: bool,
    /// The algorithm used to compute the routing tables.
    algorithm: PhantomData<A>,
}

impl<A> Default for Simulator<A> {
    fn default() -> Self {
        Self::with_topology(Topology::new())
    }
}

impl<A> Simulator<A> {
    /// Create a new simulator with an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new simulator operating on an existing topology.
    pub fn with_topology(topo: Topology) -> Self {
        Self {
            topo,
            cross_check: false,
            algorithm: PhantomData,
        }
    }

    /// Enable or disable cross-checking every routing table against the other algorithm.
    pub fn cross_check(mut self, enable: bool) -> Self {
        self.cross_check = enable;
        self
    }

    /// Get a reference to the topology.
    pub fn topology(&self) -> &Topology {
        &self.topo
    }

    /// Consume the simulator and return the topology.
    pub fn into_topology(self) -> Topology {
        self.topo
    }
}

impl<A: SpfAlgorithm> Simulator<A> {
    /// Apply a single command. Queries return one report per router, in the order in which the
    /// routers were listed. All other commands return no report.
    pub fn execute(&mut self, command: Command) -> Result<Vec<RouterReport>, SimError> {
        match command {
            Command::AddRouter(name) => {
                self.topo.add_router(name);
                Ok(Vec::new())
            }
            Command::LinkUpdate(update) => {
                self.apply(update)?;
                Ok(Vec::new())
            }
            Command::Query(routers) => routers.iter().map(|r| self.query(r)).collect(),
        }
    }

    /// Apply a link update to the topology.
    pub fn apply(&mut self, update: LinkUpdate) -> Result<(), NetworkError> {
        if update.register {
            self.topo.add_router(update.source.as_str());
            self.topo.add_router(update.destination.as_str());
        }
        self.topo
            .apply_link_update(&update.source, &update.destination, update.weight)
    }

    /// Generate the report of a single router. Unknown and isolated routers produce empty tables.
    /// If cross-checking is enabled, the routing table is also computed with the other algorithm,
    /// and a mismatch is returned as an error.
    pub fn query(&self, router: &str) -> Result<RouterReport, SimError> {
        let topo = &self.topo;
        let (lsdb, table) = match topo.router_id(router) {
            Ok(id) => {
                let lsdb = Lsdb::build(topo, id);
                let table = if self.cross_check {
                    cross_check(topo, id, &lsdb).map_err(|e| {
                        log::error!("{}", e.fmt(topo));
                        SimError::Mismatch(Box::new(e))
                    })?
                } else {
                    A::compute(topo, id, &lsdb)
                };
                (lsdb, table)
            }
            Err(_) => {
                log::debug!("Query of unknown router {router}");
                (Lsdb::default(), RoutingTable::default())
            }
        };

        Ok(RouterReport {
            router: router.to_string(),
            neighbors: topo.neighbors(router).iter().map(|n| n.fmt(topo)).collect(),
            lsdb: lsdb.iter().map(|r| r.fmt(topo)).collect(),
            routing_table: table.iter().map(|e| e.fmt(topo)).collect(),
        })
    }

    /// Process an entire session. Commands are read from `input`, and the reports are written to
    /// `output` as soon as they are computed. Commands that cannot be applied to the topology are
    /// skipped with a warning, while malformed input aborts the session.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> Result<RunStats, SimError> {
        let mut stats = RunStats::default();
        for command in CommandReader::new(input) {
            let command = command?;
            stats.commands += 1;
            match self.execute(command) {
                Ok(reports) => {
                    for report in reports {
                        stats.reports += 1;
                        write!(output, "{report}")?;
                    }
                }
                Err(SimError::Network(e)) => {
                    log::warn!("Skip command: {e}");
                    stats.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        output.flush()?;
        log::info!(
            "[{}] processed {} commands ({} skipped), printed {} reports",
            A::NAME,
            stats.commands,
            stats.skipped,
            stats.reports
        );
        Ok(stats)
    }
}

/// Statistics of a single session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Number of commands processed (including skipped ones)
    pub commands: usize,
    /// Number of commands that were skipped
    pub skipped: usize,
    /// Number of router reports printed
    pub reports: usize,
}

/// Rendered tables of a single router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterReport {
    /// Name of the router
    pub router: String,
    /// Rows of the neighbour table, `destination|weight`, sorted by destination
    pub neighbors: Vec<String>,
    /// Rows of the LSDB, `low|high|weight`, sorted by `(low, high)`
    pub lsdb: Vec<String>,
    /// Rows of the routing table, `destination|next_hop|cost`, sorted by destination
    pub routing_table: Vec<String>,
}

impl fmt::Display for RouterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (title, rows) in [
            ("Neighbour Table", &self.neighbors),
            ("LSDB", &self.lsdb),
            ("Routing Table", &self.routing_table),
        ] {
            writeln!(f, "{} {}:", self.router, title)?;
            for row in rows {
                writeln!(f, "{row}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Error of the simulation runtime.
#[derive(Debug, Error)]
pub enum SimError {
    /// A command could not be applied to the topology.
    #[error("{0}")]
    Network(#[from] NetworkError),
    /// The input is malformed.
    #[error("{0}")]
    Protocol(#[from] ProtocolError),
    /// Cannot read or write a file or stream.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Both algorithms computed different routing tables.
    #[error("{0}")]
    Mismatch(Box<SpfMismatch>),
}
