//! Configuration loader and application settings.

use crate::cex::binance::{BINANCE_STREAM_ENDPOINT, DEFAULT_SYMBOLS};
use crate::detect::Strategy;
use crate::emitter::DEFAULT_EMIT_TIMEOUT;
use crate::errors::{AppError, Result};
use crate::execution::dedup::DEFAULT_DEDUP_WINDOW;
use crate::graph::DEFAULT_FEE;
use crate::orchestrator::{DEFAULT_DETECT_INTERVAL, DEFAULT_REPORT_INTERVAL};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// WebSocket endpoint of the quote feed.
    pub feed_url: String,
    /// Pair symbols to subscribe to (e.g., "ETHBTC").
    pub feed_symbols: Vec<String>,
    /// Execution service endpoint; routes are only logged when unset.
    pub execution_url: Option<Url>,
    pub execution_timeout: Duration,
    pub detect_interval: Duration,
    pub report_interval: Duration,
    pub dedup_window: Duration,
    /// Per-trade fee as a fraction (0.001 = 0.1%).
    pub trade_fee: f64,
    pub strategy: Strategy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: BINANCE_STREAM_ENDPOINT.to_string(),
            feed_symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            execution_url: None,
            execution_timeout: DEFAULT_EMIT_TIMEOUT,
            detect_interval: DEFAULT_DETECT_INTERVAL,
            report_interval: DEFAULT_REPORT_INTERVAL,
            dedup_window: DEFAULT_DEDUP_WINDOW,
            trade_fee: DEFAULT_FEE,
            strategy: Strategy::Route,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults for
    /// missing or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(v) = get("FEED_URL") {
            Url::parse(v.trim())?;
            cfg.feed_url = v.trim().to_string();
        }
        if let Some(v) = get("FEED_SYMBOLS") {
            cfg.feed_symbols = v
                .split(',')
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if cfg.feed_symbols.is_empty() {
                return Err(AppError::Config("FEED_SYMBOLS lists no symbols".into()));
            }
        }
        if let Some(v) = get("EXECUTION_URL") {
            cfg.execution_url = Some(Url::parse(v.trim())?);
        }
        if let Some(v) = get("EXECUTION_TIMEOUT_MS") {
            cfg.execution_timeout = Duration::from_millis(parse_positive("EXECUTION_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = get("DETECT_INTERVAL_MS") {
            cfg.detect_interval = Duration::from_millis(parse_positive("DETECT_INTERVAL_MS", &v)?);
        }
        if let Some(v) = get("REPORT_INTERVAL_SECS") {
            cfg.report_interval = Duration::from_secs(parse_positive("REPORT_INTERVAL_SECS", &v)?);
        }
        if let Some(v) = get("DEDUP_WINDOW_SECS") {
            cfg.dedup_window = Duration::from_secs(parse_positive("DEDUP_WINDOW_SECS", &v)?);
        }
        if let Some(v) = get("TRADE_FEE") {
            let fee: f64 = v.trim().parse()?;
            if !(0.0..0.5).contains(&fee) {
                return Err(AppError::Config(format!(
                    "TRADE_FEE must be in [0, 0.5), got {fee}"
                )));
            }
            cfg.trade_fee = fee;
        }
        if let Some(v) = get("DETECTION_MODE") {
            cfg.strategy = Strategy::from_str(&v).map_err(AppError::Config)?;
        }
        Ok(cfg)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    let n: u64 = value.trim().parse()?;
    if n == 0 {
        return Err(AppError::Config(format!("{key} must be greater than zero")));
    }
    Ok(n)
}
