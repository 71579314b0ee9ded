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

//! Persistence of the topology after a session, and tools operating on stored snapshots.

use std::{
    fmt,
    fs::{read_to_string, remove_file, OpenOptions},
    io::Write,
    path::Path,
};

use rayon::prelude::*;
use spfsim::{
    lsdb::Lsdb,
    spf::{cross_check, SpfMismatch},
    topology::Topology,
};

use crate::runtime::SimError;

/// Write the topology to `path` as JSON. An existing file is replaced.
pub fn save(topo: &Topology, path: impl AsRef<Path>) -> Result<(), SimError> {
    let path = path.as_ref();
    let topo_str = topo.to_json()?;
    if path.exists() {
        remove_file(path)?;
    }
    let mut file = OpenOptions::new().create_new(true).write(true).open(path)?;
    writeln!(file, "{topo_str}")?;
    log::info!(
        "Stored snapshot with {} routers to {}",
        topo.num_routers(),
        path.display()
    );
    Ok(())
}

/// Read a topology that was written with [`save`].
pub fn load(path: impl AsRef<Path>) -> Result<Topology, SimError> {
    let topo_str = read_to_string(path.as_ref())?;
    Ok(Topology::from_json(&topo_str)?)
}

/// Size of a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Number of routers
    pub nodes: usize,
    /// Number of undirected links, each counted once
    pub edges: usize,
}

impl Summary {
    /// Compute the summary of the topology.
    pub fn new(topo: &Topology) -> Self {
        Self {
            nodes: topo.num_routers(),
            edges: topo.num_links(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final number of nodes: {}", self.nodes)?;
        writeln!(f, "Final number of edges: {}", self.edges)
    }
}

/// Compute the routing table of every router with both algorithms in parallel, and return all
/// routers on which they disagree, sorted by name.
pub fn audit(topo: &Topology) -> Vec<SpfMismatch> {
    let routers: Vec<_> = topo.routers().map(|(_, id)| id).collect();
    let mut mismatches: Vec<Option<SpfMismatch>> = Vec::new();
    routers
        .into_par_iter()
        .map(|id| cross_check(topo, id, &Lsdb::build(topo, id)).err())
        .collect_into_vec(&mut mismatches);
    mismatches.into_iter().flatten().collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use spfsim::{topology, types::NetworkError};

    use super::*;

    #[test]
    fn save_and_load() {
        let topo = topology! {
            A - B: 1;
            B - C: 2;
            D;
        };
        let path = std::env::temp_dir().join(format!("linkstate-{}.json", std::process::id()));
        save(&topo, &path).unwrap();
        // overwrite the same file
        save(&topo, &path).unwrap();
        let restored = load(&path).unwrap();
        remove_file(&path).unwrap();
        assert_eq!(restored, topo);
        assert_eq!(
            Summary::new(&restored).to_string(),
            "Final number of nodes: 4\nFinal number of edges: 2\n"
        );
    }

    #[test]
    fn load_missing_file() {
        assert!(matches!(
            load("/this/path/does/not/exist.json"),
            Err(SimError::Io(_))
        ));
    }

    #[test]
    fn load_corrupted_file() {
        let path = std::env::temp_dir().join(format!("linkstate-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{\"nodes\": [\"A\"").unwrap();
        let result = load(&path);
        remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(SimError::Network(NetworkError::JsonError(_)))
        ));
    }

    #[test]
    fn audit_finds_nothing() {
        let topo = topology! {
            S - A: 5;
            S - B: 5;
            A - D: 5;
            B - D: 5;
            X;
        };
        assert!(audit(&topo).is_empty());
    }
}
