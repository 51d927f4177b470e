//! Periodic detection driver.
//!
//! Two independent timers share one [`RateGraph`]:
//! • the detection loop: snapshot → detect → emit, never overlapping;
//! • the reporter: logs and resets the counters once per interval.

use crate::detect::{Detection, Strategy};
use crate::emitter::RouteEmitter;
use crate::graph::RateGraph;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const DEFAULT_DETECT_INTERVAL: Duration = Duration::from_millis(6);
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);

/// Counters accumulated since the last report.
#[derive(Debug, Default)]
struct Counters {
    ticks: AtomicU64,
    found: AtomicU64,
    emitted: AtomicU64,
}

/// Counter values taken (and reset) by one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub ticks: u64,
    pub found: u64,
    pub emitted: u64,
}

pub struct Orchestrator {
    graph: Arc<RateGraph>,
    emitter: RouteEmitter,
    strategy: Strategy,
    counters: Counters,
}

impl Orchestrator {
    pub fn new(graph: Arc<RateGraph>, emitter: RouteEmitter, strategy: Strategy) -> Self {
        Self {
            graph,
            emitter,
            strategy,
            counters: Counters::default(),
        }
    }

    /// One detection pass: snapshot, detect off the async workers, emit.
    pub async fn tick(&self) -> Detection {
        let snapshot = self.graph.snapshot();
        let strategy = self.strategy;
        let detection = match tokio::task::spawn_blocking(move || strategy.detect(&snapshot)).await
        {
            Ok(detection) => detection,
            Err(e) => {
                warn!(error = %e, "[DETECT] detection task failed");
                Detection::NotFound
            }
        };

        self.counters.ticks.fetch_add(1, Ordering::Relaxed);
        match &detection {
            Detection::NotFound => {}
            Detection::Exists => {
                self.counters.found.fetch_add(1, Ordering::Relaxed);
                debug!("[DETECT] negative cycle present");
            }
            Detection::Cycle(route) => {
                self.counters.found.fetch_add(1, Ordering::Relaxed);
                debug!(
                    path = %route.path(),
                    total_rate = route.total_rate(),
                    "[DETECT] cycle found"
                );
                if self.emitter.emit(route).await {
                    self.counters.emitted.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        detection
    }

    /// Read and reset the counters.
    pub fn take_report(&self) -> TickReport {
        TickReport {
            ticks: self.counters.ticks.swap(0, Ordering::Relaxed),
            found: self.counters.found.swap(0, Ordering::Relaxed),
            emitted: self.counters.emitted.swap(0, Ordering::Relaxed),
        }
    }

    /// Spawn the high-frequency loop. A pass that outlasts `interval` delays
    /// the next one instead of running concurrently with it.
    pub fn spawn_detection_loop(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(
                interval_ms = interval.as_millis() as u64,
                strategy = ?self.strategy,
                "[INIT] detection loop started"
            );
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }

    /// Spawn the low-frequency counter reporter.
    pub fn spawn_tick_reporter(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = self.take_report();
                let stats = self.graph.stats();
                info!(
                    ticks = report.ticks,
                    found = report.found,
                    emitted = report.emitted,
                    currencies = stats.currencies,
                    edges = stats.edges,
                    "[TICKS] detection passes since last report"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::DEFAULT_EMIT_TIMEOUT;
    use crate::errors::Result;
    use crate::execution::{Deduplicated, Delivery, ExecutionClient, RouteDedup};
    use crate::models::{Quote, TradeHop};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counting(AtomicUsize);

    #[async_trait::async_trait]
    impl ExecutionClient for Counting {
        async fn submit(&self, _route: &[TradeHop]) -> Result<Delivery> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Delivery::Forwarded)
        }
    }

    fn market(eth_btc_bid: f64) -> Arc<RateGraph> {
        let graph = Arc::new(RateGraph::default());
        graph.upsert(&Quote::new("BTCUSDT", (50000.0, 1.0), (50010.0, 1.0)));
        graph.upsert(&Quote::new("ETHUSDT", (3000.0, 1.0), (3010.0, 1.0)));
        graph.upsert(&Quote::new("ETHBTC", (eth_btc_bid, 1.0), (eth_btc_bid * 1.001, 1.0)));
        graph
    }

    fn orchestrator(graph: Arc<RateGraph>, strategy: Strategy) -> (Orchestrator, Arc<Counting>) {
        let client = Arc::new(Counting::default());
        let emitter = RouteEmitter::new(client.clone(), DEFAULT_EMIT_TIMEOUT);
        (Orchestrator::new(graph, emitter, strategy), client)
    }

    #[tokio::test]
    async fn tick_emits_found_route() {
        let (orch, client) = orchestrator(market(0.0625), Strategy::Route);
        let detection = orch.tick().await;
        assert!(detection.route().is_some());
        assert_eq!(client.0.load(Ordering::SeqCst), 1);
        assert_eq!(
            orch.take_report(),
            TickReport {
                ticks: 1,
                found: 1,
                emitted: 1
            }
        );
    }

    #[tokio::test]
    async fn suppressed_repeats_are_not_counted_as_emitted() {
        let client = Arc::new(Counting::default());
        let dedup = Arc::new(RouteDedup::new());
        let emitter = RouteEmitter::new(
            Arc::new(Deduplicated::new(Arc::clone(&client), dedup)),
            DEFAULT_EMIT_TIMEOUT,
        );
        let orch = Orchestrator::new(market(0.0625), emitter, Strategy::Route);

        orch.tick().await;
        orch.tick().await;

        assert_eq!(client.0.load(Ordering::SeqCst), 1);
        assert_eq!(
            orch.take_report(),
            TickReport {
                ticks: 2,
                found: 2,
                emitted: 1
            }
        );
    }

    #[tokio::test]
    async fn quiet_market_emits_nothing() {
        let (orch, client) = orchestrator(market(0.06), Strategy::Route);
        for _ in 0..3 {
            assert_eq!(orch.tick().await, Detection::NotFound);
        }
        assert_eq!(client.0.load(Ordering::SeqCst), 0);
        assert_eq!(orch.take_report().ticks, 3);
        assert_eq!(orch.take_report(), TickReport::default());
    }

    #[tokio::test]
    async fn existence_mode_never_emits() {
        let (orch, client) = orchestrator(market(0.0625), Strategy::ExistenceOnly);
        assert_eq!(orch.tick().await, Detection::Exists);
        assert_eq!(client.0.load(Ordering::SeqCst), 0);
        let report = orch.take_report();
        assert_eq!((report.found, report.emitted), (1, 0));
    }

    #[tokio::test]
    async fn empty_graph_tick_is_not_found() {
        let (orch, _client) = orchestrator(Arc::new(RateGraph::default()), Strategy::Route);
        assert_eq!(orch.tick().await, Detection::NotFound);
    }

    #[tokio::test]
    async fn detection_loop_keeps_ticking() {
        let (orch, _client) = orchestrator(market(0.06), Strategy::Route);
        let orch = Arc::new(orch);
        let handle = Arc::clone(&orch).spawn_detection_loop(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();
        assert!(orch.take_report().ticks >= 5);
    }
}
