//! Suppression of repeated routes within a time window.
//!
//! A route is identified by the SHA-256 of its ordered hop endpoints; rates
//! and sizes do not take part. Only delivered routes stay recorded: a failed
//! or cancelled delivery releases its hash. The whole set is cleared at once
//! when the window elapses.

use super::{Delivery, ExecutionClient};
use crate::errors::Result;
use crate::models::TradeHop;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(180);

#[derive(Debug, Default)]
pub struct RouteDedup {
    seen: Mutex<HashSet<String>>,
}

impl RouteDedup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_hash(route: &[TradeHop]) -> String {
        let mut hasher = Sha256::new();
        for hop in route {
            hasher.update(hop.from.as_bytes());
            hasher.update(b"-");
            hasher.update(hop.to.as_bytes());
            hasher.update(b"|");
        }
        hex::encode(hasher.finalize())
    }

    /// Record `route`; `false` if it was already seen in this window.
    pub fn check_and_store(&self, route: &[TradeHop]) -> bool {
        let hash = Self::route_hash(route);
        self.seen.lock().insert(hash)
    }

    /// Forget `route` so the next submission of it goes through.
    pub fn release(&self, route: &[TradeHop]) -> bool {
        let hash = Self::route_hash(route);
        self.seen.lock().remove(&hash)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let cleared = {
            let mut seen = self.seen.lock();
            let n = seen.len();
            seen.clear();
            n
        };
        info!(cleared, "[DEDUP] route window cleared");
    }

    /// Clear the set every `window`.
    pub fn spawn_clearer(self: Arc<Self>, window: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(window);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.clear();
            }
        })
    }
}

/// Execution client that drops routes already forwarded within the window.
pub struct Deduplicated<C> {
    inner: C,
    dedup: Arc<RouteDedup>,
}

impl<C> Deduplicated<C> {
    pub fn new(inner: C, dedup: Arc<RouteDedup>) -> Self {
        Self { inner, dedup }
    }
}

/// Releases a claimed route on drop unless the delivery was confirmed.
/// Dropping covers both an error return and cancellation of the future.
struct Claim<'a> {
    dedup: &'a RouteDedup,
    route: &'a [TradeHop],
    delivered: bool,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.delivered {
            self.dedup.release(self.route);
        }
    }
}

#[async_trait::async_trait]
impl<C: ExecutionClient> ExecutionClient for Deduplicated<C> {
    async fn submit(&self, route: &[TradeHop]) -> Result<Delivery> {
        if !self.dedup.check_and_store(route) {
            debug!(hops = route.len(), "[DEDUP] route already forwarded in window");
            return Ok(Delivery::Suppressed);
        }
        let mut claim = Claim {
            dedup: &self.dedup,
            route,
            delivered: false,
        };
        let delivery = self.inner.submit(route).await?;
        claim.delivered = delivery == Delivery::Forwarded;
        Ok(delivery)
    }
}
