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

//! # LinkState: Driver for the link-state routing simulator
//!
//! This crate drives the [`spfsim`] library. It reads a line-oriented control protocol (see
//! [`protocol`]), applies every command to a single [`spfsim::topology::Topology`], and prints
//! the neighbour table, link-state database, and routing table of every queried router.
//!
//! ## Structure
//! The source code of this program is structured as follows:
//! - The module [`protocol`] parses the input into a sequence of [`protocol::Command`]s.
//! - The module [`runtime`] contains the [`Simulator`], which owns the topology, executes the
//!   commands one at a time, and renders the [`runtime::RouterReport`]s.
//! - The module [`snapshot`] stores the final topology, and contains the tools that operate on
//!   stored snapshots (the summary printed by `extract`, and the parallel `audit`).
//!
//! ## Example
//!
//! ```
//! use linkstate::Simulator;
//! use spfsim::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = "X\nY\nZ\nLINKSTATE\nX-Y 2\nY-Z 3 X\nUPDATE\nEND\n";
//! let mut output = Vec::new();
//! Simulator::<ArrayDijkstra>::new().run(input.as_bytes(), &mut output)?;
//! assert_eq!(
//!     String::from_utf8(output)?,
//!     "X Neighbour Table:\nY|2\n\n\
//!      X LSDB:\nX|Y|2\nY|Z|3\n\n\
//!      X Routing Table:\nY|Y|2\nZ|Y|5\n\n"
//! );
//! # Ok(())
//! # }
//! ```

#![deny(
    missing_docs,
    clippy::missing_docs_in_private_items,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::result_large_err)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod protocol;
pub mod runtime;
pub mod snapshot;
#[cfg(test)]
mod test;

pub use runtime::{SimError, Simulator};
