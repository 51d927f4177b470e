//! Hands detected routes to the execution service.

use crate::errors::AppError;
use crate::execution::{Delivery, ExecutionClient};
use crate::models::{RouteInfo, TradeHop};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_EMIT_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct RouteEmitter {
    client: Arc<dyn ExecutionClient>,
    timeout: Duration,
}

impl RouteEmitter {
    pub fn new(client: Arc<dyn ExecutionClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn hops(route: &RouteInfo) -> Vec<TradeHop> {
        route.steps().iter().map(TradeHop::from).collect()
    }

    /// Forward `route` within the timeout. Failures are logged and the route
    /// is dropped; the next detection pass will find it again if it persists.
    /// Returns `true` only when the route reached the execution service.
    pub async fn emit(&self, route: &RouteInfo) -> bool {
        let hops = Self::hops(route);
        let result = match tokio::time::timeout(self.timeout, self.client.submit(&hops)).await {
            Ok(res) => res,
            Err(_) => Err(AppError::Timeout(self.timeout)),
        };
        match result {
            Ok(Delivery::Forwarded) => {
                info!(
                    hops = hops.len(),
                    path = %route.path(),
                    multiplier = route.gross_multiplier(),
                    "[EMIT] route forwarded"
                );
                true
            }
            Ok(Delivery::Suppressed) => {
                debug!(path = %route.path(), "[EMIT] route suppressed");
                false
            }
            Err(e) => {
                warn!(error = %e, path = %route.path(), "[EMIT] route dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::execution::{Deduplicated, RouteDedup};
    use crate::models::{Edge, RouteStep};
    use parking_lot::Mutex;

    fn route() -> RouteInfo {
        let step = |from: &str, to: &str, rate: f64, size: f64| RouteStep {
            from: from.into(),
            to: to.into(),
            edge: Edge { rate, size },
        };
        RouteInfo::new(vec![
            step("BTC", "USDT", -10.8198, 0.5),
            step("USDT", "ETH", 8.0097, 12.0),
            step("ETH", "BTC", 2.7726, 30.0),
        ])
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Vec<TradeHop>>>);

    #[async_trait::async_trait]
    impl ExecutionClient for Recorder {
        async fn submit(&self, route: &[TradeHop]) -> Result<Delivery> {
            self.0.lock().push(route.to_vec());
            Ok(Delivery::Forwarded)
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl ExecutionClient for Failing {
        async fn submit(&self, _route: &[TradeHop]) -> Result<Delivery> {
            Err(AppError::Other("connection refused".into()))
        }
    }

    struct Stalled;

    #[async_trait::async_trait]
    impl ExecutionClient for Stalled {
        async fn submit(&self, _route: &[TradeHop]) -> Result<Delivery> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Delivery::Forwarded)
        }
    }

    #[test]
    fn hops_follow_route_order() {
        let hops = RouteEmitter::hops(&route());
        let pairs: Vec<(&str, &str)> = hops.iter().map(|h| (h.from.as_str(), h.to.as_str())).collect();
        assert_eq!(pairs, vec![("BTC", "USDT"), ("USDT", "ETH"), ("ETH", "BTC")]);
        assert_eq!(hops[1].size, 12.0);
    }

    #[tokio::test]
    async fn delivers_hops_to_client() {
        let recorder = Arc::new(Recorder::default());
        let emitter = RouteEmitter::new(recorder.clone(), DEFAULT_EMIT_TIMEOUT);
        assert!(emitter.emit(&route()).await);
        let sent = recorder.0.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], RouteEmitter::hops(&route()));
    }

    #[tokio::test]
    async fn failures_are_dropped() {
        let emitter = RouteEmitter::new(Arc::new(Failing), DEFAULT_EMIT_TIMEOUT);
        assert!(!emitter.emit(&route()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_client_times_out() {
        let emitter = RouteEmitter::new(Arc::new(Stalled), DEFAULT_EMIT_TIMEOUT);
        assert!(!emitter.emit(&route()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_route_is_retried_through_dedup() {
        let dedup = Arc::new(RouteDedup::new());
        let stalled = RouteEmitter::new(
            Arc::new(Deduplicated::new(Stalled, Arc::clone(&dedup))),
            DEFAULT_EMIT_TIMEOUT,
        );
        assert!(!stalled.emit(&route()).await);
        assert!(dedup.is_empty());

        let recorder = Arc::new(Recorder::default());
        let emitter = RouteEmitter::new(
            Arc::new(Deduplicated::new(Arc::clone(&recorder), Arc::clone(&dedup))),
            DEFAULT_EMIT_TIMEOUT,
        );
        assert!(emitter.emit(&route()).await);
        assert!(!emitter.emit(&route()).await);
        assert_eq!(recorder.0.lock().len(), 1);
    }
}
