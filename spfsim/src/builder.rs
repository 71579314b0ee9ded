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

//! Module for generating topologies quickly, used for testing and benchmarking.

use std::collections::BTreeSet;

#[cfg(feature = "rand")]
use rand::{
    distributions::{Distribution, Uniform},
    prelude::*,
};

use crate::{
    topology::Topology,
    types::{LinkWeight, NetworkError, RouterId},
};

/// Trait for generating topologies quickly. The following example creates a complete graph and
/// assigns the same weight to every link:
///
/// ```
/// use spfsim::prelude::*;
/// use spfsim::builder::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create a complete graph with 10 routers.
/// let mut topo = Topology::build_complete_graph(10);
/// // set all link weights to 5
/// topo.build_link_weights(constant_link_weight, 5)?;
/// assert_eq!(topo.num_links(), 45);
/// assert_eq!(topo.link_weight("R0", "R9")?, 5);
/// # Ok(())
/// # }
/// ```
pub trait TopologyBuilder {
    /// Set the weight of every link in the topology. The function `link_weight` receives both
    /// endpoints, the topology, and the argument `a`.
    fn build_link_weights<F, A>(&mut self, link_weight: F, a: A) -> Result<(), NetworkError>
    where
        A: Clone,
        F: FnMut(RouterId, RouterId, &Topology, A) -> LinkWeight;

    /// Set the weight of every link in the topology, using the random number generator `rng`. The
    /// links are visited in a deterministic order, such that a seeded `rng` yields the same weights
    /// every time.
    #[cfg(feature = "rand")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
    fn build_link_weights_seeded<F, A, R>(
        &mut self,
        rng: &mut R,
        link_weight: F,
        a: A,
    ) -> Result<(), NetworkError>
    where
        A: Clone,
        F: FnMut(RouterId, RouterId, &Topology, &mut R, A) -> LinkWeight,
        R: RngCore;

    /// Generate a complete graph with `n` routers, named `R0` to `R{n-1}`. Every link has weight 1.
    fn build_complete_graph(n: usize) -> Self;

    /// Generate a random graph with `n` routers. Each pair of routers is connected with
    /// probability `p`. Every link has weight 1.
    #[cfg(feature = "rand")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
    fn build_gnp<R: RngCore>(rng: &mut R, n: usize, p: f64) -> Self;

    /// Generate a random graph with `n` routers and `m` links, chosen uniformly at random. If `m`
    /// is larger than the number of possible links, a complete graph is returned. Every link has
    /// weight 1.
    #[cfg(feature = "rand")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
    fn build_gnm<R: RngCore>(rng: &mut R, n: usize, m: usize) -> Self;

    /// Connect all components of the topology by adding links of weight 1. Afterwards, every router
    /// is reachable from every other router.
    fn build_connected_graph(&mut self) -> Result<(), NetworkError>;
}

impl TopologyBuilder for Topology {
    fn build_link_weights<F, A>(&mut self, mut link_weight: F, a: A) -> Result<(), NetworkError>
    where
        A: Clone,
        F: FnMut(RouterId, RouterId, &Topology, A) -> LinkWeight,
    {
        for (src, dst, _) in self.links() {
            let weight = link_weight(src, dst, self, a.clone());
            let (src, dst) = names(self, src, dst)?;
            self.set_link_weight(&src, &dst, weight)?;
        }
        Ok(())
    }

    #[cfg(feature = "rand")]
    fn build_link_weights_seeded<F, A, R>(
        &mut self,
        rng: &mut R,
        mut link_weight: F,
        a: A,
    ) -> Result<(), NetworkError>
    where
        A: Clone,
        F: FnMut(RouterId, RouterId, &Topology, &mut R, A) -> LinkWeight,
        R: RngCore,
    {
        for (src, dst, _) in self.links() {
            let weight = link_weight(src, dst, self, rng, a.clone());
            let (src, dst) = names(self, src, dst)?;
            self.set_link_weight(&src, &dst, weight)?;
        }
        Ok(())
    }

    fn build_complete_graph(n: usize) -> Topology {
        let mut topo = Topology::new();
        let names = router_names(&mut topo, n);
        for j in 1..n {
            for i in 0..j {
                topo.add_link(&names[i], &names[j], 1)
                    .expect("both routers exist and are distinct");
            }
        }
        topo
    }

    #[cfg(feature = "rand")]
    fn build_gnp<R: RngCore>(rng: &mut R, n: usize, p: f64) -> Topology {
        // check if we should build a complete graph,
        if p >= 1.0 {
            return Self::build_complete_graph(n);
        }
        let mut topo = Topology::new();
        let names = router_names(&mut topo, n);
        // iterate over all pairs of nodes
        for j in 1..n {
            for i in 0..j {
                if rng.gen_bool(p.max(0.0)) {
                    topo.add_link(&names[i], &names[j], 1)
                        .expect("both routers exist and are distinct");
                }
            }
        }
        topo
    }

    #[cfg(feature = "rand")]
    fn build_gnm<R: RngCore>(rng: &mut R, n: usize, mut m: usize) -> Topology {
        // check if we should create a complete graph.
        let max_edges = n * n.saturating_sub(1) / 2;
        if max_edges <= m {
            return Self::build_complete_graph(n);
        }

        let mut topo = Topology::new();
        let names = router_names(&mut topo, n);

        while m > 0 {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            if !topo.has_link(&names[i], &names[j])
                && topo.add_link(&names[i], &names[j], 1).is_ok()
            {
                m -= 1;
            }
        }
        topo
    }

    fn build_connected_graph(&mut self) -> Result<(), NetworkError> {
        // compute the set of connected components
        let mut nodes_missing: BTreeSet<RouterId> = self.routers().map(|(_, r)| r).collect();
        let mut components: Vec<Vec<RouterId>> = Vec::new();
        while let Some(r) = nodes_missing.pop_first() {
            let mut current_component = vec![r];
            let mut to_explore = vec![r];
            while let Some(r) = to_explore.pop() {
                for (x, _) in self.neighbors_of(r) {
                    if nodes_missing.remove(&x) {
                        current_component.push(x);
                        to_explore.push(x);
                    }
                }
            }
            components.push(current_component);
        }

        let Some(mut main_component) = components.pop() else {
            return Ok(());
        };
        for (idx, mut component) in components.into_iter().enumerate() {
            if let Some(last) = component.last() {
                let (a, b) = names(self, *last, main_component[idx % main_component.len()])?;
                self.add_link(&a, &b, 1)?;
            }
            main_component.append(&mut component);
        }
        Ok(())
    }
}

/// Add `n` routers named `R0` to `R{n-1}`, and return their names.
fn router_names(topo: &mut Topology, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let name = format!("R{i}");
            topo.add_router(name.clone());
            name
        })
        .collect()
}

/// Get the owned names of both routers.
fn names(topo: &Topology, a: RouterId, b: RouterId) -> Result<(String, String), NetworkError> {
    Ok((
        topo.router_name(a)?.to_string(),
        topo.router_name(b)?.to_string(),
    ))
}

/// This function will simply return the `weight`. This function can be used for the function
/// [`TopologyBuilder::build_link_weights`].
pub fn constant_link_weight(
    _src: RouterId,
    _dst: RouterId,
    _topo: &Topology,
    weight: LinkWeight,
) -> LinkWeight {
    weight
}

/// This function will return an integer uniformly distributed inside of the `range` (inclusive
/// lower bound, exclusive upper bound). This function can be used for the function
/// [`TopologyBuilder::build_link_weights`].
#[cfg(feature = "rand")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
pub fn uniform_link_weight(
    src: RouterId,
    dst: RouterId,
    topo: &Topology,
    range: (LinkWeight, LinkWeight),
) -> LinkWeight {
    uniform_link_weight_seeded(src, dst, topo, &mut thread_rng(), range)
}

/// This function will return an integer uniformly distributed inside of the `range` (inclusive
/// lower bound, exclusive upper bound). The function takes as arguments an RNG, so it can be
/// deterministically. This function can be used with
/// [`TopologyBuilder::build_link_weights_seeded`].
#[cfg(feature = "rand")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand")))]
pub fn uniform_link_weight_seeded<R: RngCore>(
    _src: RouterId,
    _dst: RouterId,
    _topo: &Topology,
    rng: &mut R,
    range: (LinkWeight, LinkWeight),
) -> LinkWeight {
    if range.1 <= range.0 {
        return range.0;
    }
    let dist = Uniform::from(range.0..range.1);
    dist.sample(rng)
}
