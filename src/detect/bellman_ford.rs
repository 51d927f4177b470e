use super::{Adjacency, relax};

/// Single-source Bellman-Ford negative-cycle test.
///
/// The source is the first vertex in index order. Cycles not reachable from
/// it are not reported; callers needing full coverage use the route strategy,
/// which seeds every vertex.
pub(crate) fn has_negative_cycle(graph: &Adjacency) -> bool {
    let n = graph.len();
    if n == 0 {
        return false;
    }

    let mut dist = vec![f64::INFINITY; n];
    dist[0] = 0.0;

    for _ in 1..n {
        let mut improved = false;
        for (u, v, edge) in graph.edges() {
            if let Some(d) = relax(&dist, u, v, edge) {
                dist[v] = d;
                improved = true;
            }
        }
        if !improved {
            break;
        }
    }

    graph
        .edges()
        .any(|(u, v, edge)| relax(&dist, u, v, edge).is_some())
}
