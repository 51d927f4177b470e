//! Live exchange-rate graph.
//!
//! Responsibilities:
//! • Turn quotes into fee-adjusted, negative-log weighted edges.
//! • Serialize writers behind a single reader/writer lock.
//! • Hand out fully independent snapshots for the detectors.

use crate::models::{Edge, Quote};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::warn;

pub mod symbols;

pub use symbols::SymbolTable;

/// Default per-trade fee (0.1%).
pub const DEFAULT_FEE: f64 = 0.001;

/// Plain adjacency map: source → destination → edge.
///
/// This is both the storage behind [`RateGraph`] and the snapshot type the
/// detectors consume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    adjacency: HashMap<String, HashMap<String, Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the edge `from → to`.
    pub fn insert_edge(&mut self, from: &str, to: &str, edge: Edge) {
        match self.adjacency.get_mut(from) {
            Some(out) => {
                out.insert(to.to_string(), edge);
            }
            None => {
                let mut out = HashMap::new();
                out.insert(to.to_string(), edge);
                self.adjacency.insert(from.to_string(), out);
            }
        }
    }

    pub fn edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.adjacency.get(from)?.get(to)
    }

    /// Iterate every `(from, to, edge)` triple.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &Edge)> {
        self.adjacency.iter().flat_map(|(from, out)| {
            out.iter()
                .map(move |(to, edge)| (from.as_str(), to.as_str(), edge))
        })
    }

    /// Sorted list of every currency that appears as a source or destination.
    pub fn vertices(&self) -> Vec<&str> {
        let mut vertices: Vec<&str> = self
            .adjacency
            .iter()
            .flat_map(|(from, out)| {
                std::iter::once(from.as_str()).chain(out.keys().map(String::as_str))
            })
            .collect();
        vertices.sort_unstable();
        vertices.dedup();
        vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }
}

/// Transformed weights for one quote: `(base → quote, quote → base)`.
///
/// Selling one unit of base yields `bid·(1−2·fee)` units of quote; spending one
/// unit of quote yields `1 / (ask·(1+2·fee))` units of base. Each weight is the
/// negative log of what one unit buys, so a cycle with negative total weight
/// multiplies the starting amount by more than one.
pub fn transform_quote(quote: &Quote, fee: f64) -> (Edge, Edge) {
    let effective_bid = quote.bid_price * (1.0 - 2.0 * fee);
    let effective_ask = quote.ask_price * (1.0 + 2.0 * fee);
    let sell_base = Edge {
        rate: -effective_bid.ln(),
        size: quote.bid_size,
    };
    let buy_base = Edge {
        rate: -(1.0 / effective_ask).ln(),
        size: quote.ask_size,
    };
    (sell_base, buy_base)
}

/// Size of the graph at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub currencies: usize,
    pub edges: usize,
}

/// Concurrent rate graph shared between the ingestion path and the detectors.
#[derive(Debug)]
pub struct RateGraph {
    inner: RwLock<Graph>,
    symbols: SymbolTable,
    fee: f64,
}

impl Default for RateGraph {
    fn default() -> Self {
        Self::new(SymbolTable::default(), DEFAULT_FEE)
    }
}

impl RateGraph {
    pub fn new(symbols: SymbolTable, fee: f64) -> Self {
        Self {
            inner: RwLock::new(Graph::new()),
            symbols,
            fee,
        }
    }

    /// Apply a quote to the two edges of its pair.
    ///
    /// Returns `false` when the quote was dropped (unresolvable symbol or
    /// unusable prices). Dropping never raises an error to the caller.
    pub fn upsert(&self, quote: &Quote) -> bool {
        let (base, quote_ccy) = match self.symbols.resolve(&quote.symbol) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(symbol = %quote.symbol, error = %e, "[GRAPH] dropping quote");
                return false;
            }
        };
        if !quote.has_valid_prices() {
            warn!(
                symbol = %quote.symbol,
                bid = quote.bid_price,
                ask = quote.ask_price,
                "[GRAPH] dropping quote with non-positive price"
            );
            return false;
        }

        let (sell_base, buy_base) = transform_quote(quote, self.fee);

        let mut graph = self.inner.write();
        graph.insert_edge(&base, &quote_ccy, sell_base);
        graph.insert_edge(&quote_ccy, &base, buy_base);
        true
    }

    /// Vertex and edge counts, taken under the read lock without copying.
    pub fn stats(&self) -> GraphStats {
        let graph = self.inner.read();
        GraphStats {
            currencies: graph.vertex_count(),
            edges: graph.edge_count(),
        }
    }

    /// Deep copy of the graph as of one instant.
    pub fn snapshot(&self) -> Graph {
        let graph = self.inner.read();
        let mut copy = Graph {
            adjacency: HashMap::with_capacity(graph.adjacency.len()),
        };
        for (from, out) in &graph.adjacency {
            let mut copied = HashMap::with_capacity(out.len());
            for (to, edge) in out {
                copied.insert(to.clone(), *edge);
            }
            copy.adjacency.insert(from.clone(), copied);
        }
        copy
    }
}
