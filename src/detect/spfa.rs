use super::trace::trace_cycle;
use super::{Adjacency, relax};
use crate::models::RouteInfo;
use std::collections::VecDeque;
use tracing::debug;

/// Multi-source SPFA negative-cycle search with route reconstruction.
///
/// Every vertex starts at distance 0, so a cycle is found wherever it sits in
/// the graph. A vertex whose hop count reaches the vertex count lies on or
/// behind a negative cycle; the cycle is then rebuilt from predecessors. A
/// failed reconstruction does not re-enqueue the vertex and the search goes on.
pub(crate) fn find_negative_cycle(graph: &Adjacency) -> Option<RouteInfo> {
    let n = graph.len();
    if n == 0 {
        return None;
    }

    let mut dist = vec![0.0_f64; n];
    let mut hops = vec![0usize; n];
    let mut pred: Vec<Option<usize>> = vec![None; n];
    let mut queued = vec![true; n];
    let mut queue: VecDeque<usize> = (0..n).collect();
    let mut rejected = 0usize;

    while let Some(u) = queue.pop_front() {
        queued[u] = false;
        for &(v, edge) in graph.out(u) {
            let Some(d) = relax(&dist, u, v, &edge) else {
                continue;
            };
            dist[v] = d;
            pred[v] = Some(u);
            hops[v] = hops[u] + 1;

            if hops[v] >= n {
                match trace_cycle(graph, &pred, v) {
                    Some(route) => return Some(route),
                    None => {
                        rejected += 1;
                        continue;
                    }
                }
            }
            if !queued[v] {
                queued[v] = true;
                queue.push_back(v);
            }
        }
    }

    if rejected > 0 {
        debug!(rejected, "[SPFA] no valid cycle after rejected reconstructions");
    }
    None
}
