//! Negative-cycle detection over graph snapshots.
//!
//! Two strategies share one contract and one relaxation core:
//! • [`Strategy::ExistenceOnly`]: single-source Bellman-Ford, answers yes/no.
//! • [`Strategy::Route`]: multi-source SPFA that also reconstructs a witness
//!   cycle as a [`RouteInfo`].

use crate::graph::Graph;
use crate::models::{Edge, RouteInfo};

pub mod bellman_ford;
pub mod spfa;
pub mod trace;

/// Outcome of one detection pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    NotFound,
    /// A negative cycle exists; no route was requested.
    Exists,
    Cycle(RouteInfo),
}

impl Detection {
    pub fn found(&self) -> bool {
        !matches!(self, Detection::NotFound)
    }

    pub fn route(&self) -> Option<&RouteInfo> {
        match self {
            Detection::Cycle(route) => Some(route),
            _ => None,
        }
    }

    pub fn into_route(self) -> Option<RouteInfo> {
        match self {
            Detection::Cycle(route) => Some(route),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ExistenceOnly,
    Route,
}

impl Strategy {
    pub fn for_route(required: bool) -> Self {
        if required {
            Strategy::Route
        } else {
            Strategy::ExistenceOnly
        }
    }

    pub fn detect(self, graph: &Graph) -> Detection {
        if graph.is_empty() {
            return Detection::NotFound;
        }
        let adjacency = Adjacency::from_graph(graph);
        match self {
            Strategy::ExistenceOnly => {
                if bellman_ford::has_negative_cycle(&adjacency) {
                    Detection::Exists
                } else {
                    Detection::NotFound
                }
            }
            Strategy::Route => match spfa::find_negative_cycle(&adjacency) {
                Some(route) => Detection::Cycle(route),
                None => Detection::NotFound,
            },
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "route" | "spfa" => Ok(Strategy::Route),
            "exists" | "bellman-ford" | "bellman_ford" => Ok(Strategy::ExistenceOnly),
            other => Err(format!("unknown detection mode {other:?}")),
        }
    }
}

/// Index-based view of a snapshot used by both algorithms.
///
/// Vertices are sorted by currency code so a given snapshot always produces
/// the same traversal order.
#[derive(Debug)]
pub(crate) struct Adjacency {
    names: Vec<String>,
    out: Vec<Vec<(usize, Edge)>>,
}

impl Adjacency {
    pub(crate) fn from_graph(graph: &Graph) -> Self {
        let names: Vec<String> = graph.vertices().into_iter().map(str::to_string).collect();
        let mut out = vec![Vec::new(); names.len()];
        for (from, to, edge) in graph.edges() {
            if let (Ok(u), Ok(v)) = (
                names.binary_search_by(|n| n.as_str().cmp(from)),
                names.binary_search_by(|n| n.as_str().cmp(to)),
            ) {
                out[u].push((v, *edge));
            }
        }
        for edges in &mut out {
            edges.sort_by_key(|(v, _)| *v);
        }
        Self { names, out }
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn name(&self, v: usize) -> &str {
        &self.names[v]
    }

    pub(crate) fn out(&self, u: usize) -> &[(usize, Edge)] {
        &self.out[u]
    }

    pub(crate) fn edge(&self, u: usize, v: usize) -> Option<&Edge> {
        self.out[u].iter().find(|(to, _)| *to == v).map(|(_, e)| e)
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = (usize, usize, &Edge)> {
        self.out
            .iter()
            .enumerate()
            .flat_map(|(u, edges)| edges.iter().map(move |(v, e)| (u, *v, e)))
    }
}

/// Candidate distance for `v` through `u`, if it strictly improves `dist[v]`.
///
/// Exact floating-point comparison; unreachable sources never relax.
#[inline]
pub(crate) fn relax(dist: &[f64], u: usize, v: usize, edge: &Edge) -> Option<f64> {
    if dist[u] == f64::INFINITY {
        return None;
    }
    let candidate = dist[u] + edge.rate;
    (candidate < dist[v]).then_some(candidate)
}
