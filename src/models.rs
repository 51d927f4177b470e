//! Shared data structures used throughout the application.

use crate::errors::RouteError;
use serde::Serialize;
use std::collections::HashSet;

/// Top-of-book quote for one trading pair, as delivered by the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Exchange-specific pair encoding, e.g. "ETHBTC" or "ETH/BTC".
    pub symbol: String,
    pub bid_price: f64,
    pub bid_size: f64,
    pub ask_price: f64,
    pub ask_size: f64,
    /// Exchange timestamp in milliseconds, when the feed provides one.
    pub timestamp: Option<u64>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, bid: (f64, f64), ask: (f64, f64)) -> Self {
        Self {
            symbol: symbol.into(),
            bid_price: bid.0,
            bid_size: bid.1,
            ask_price: ask.0,
            ask_size: ask.1,
            timestamp: None,
        }
    }

    /// Both prices must be usable inside a logarithm.
    pub fn has_valid_prices(&self) -> bool {
        self.bid_price.is_finite()
            && self.ask_price.is_finite()
            && self.bid_price > 0.0
            && self.ask_price > 0.0
    }
}

/// Directed edge of the rate graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Negative log of the fee-adjusted exchange rate.
    pub rate: f64,
    /// Liquidity last observed at that rate.
    pub size: f64,
}

/// One hop of a detected cycle, carrying the edge as it was in the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    pub from: String,
    pub to: String,
    pub edge: Edge,
}

/// A closed walk of at least three hops with no repeated intermediate vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    steps: Vec<RouteStep>,
}

impl RouteInfo {
    pub fn new(steps: Vec<RouteStep>) -> Result<Self, RouteError> {
        if steps.len() < 3 {
            return Err(RouteError::TooShort(steps.len()));
        }
        let start = &steps[0].from;
        let end = &steps[steps.len() - 1].to;
        if start != end {
            return Err(RouteError::NotClosed {
                start: start.clone(),
                end: end.clone(),
            });
        }
        let mut seen = HashSet::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            if index > 0 && steps[index - 1].to != step.from {
                return Err(RouteError::Broken { index });
            }
            if !seen.insert(step.from.as_str()) {
                return Err(RouteError::Repeated(step.from.clone()));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Summed transformed weight; negative for a profitable cycle.
    pub fn total_rate(&self) -> f64 {
        self.steps.iter().map(|s| s.edge.rate).sum()
    }

    /// Product of the real exchange rates along the route.
    pub fn gross_multiplier(&self) -> f64 {
        (-self.total_rate()).exp()
    }

    /// Human-readable path like `BTC → ETH → USDT → BTC`.
    pub fn path(&self) -> String {
        let mut out = self.steps[0].from.clone();
        for step in &self.steps {
            out.push_str(" → ");
            out.push_str(&step.to);
        }
        out
    }
}

/// Outbound hop descriptor handed to the execution service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeHop {
    pub from: String,
    pub to: String,
    pub rate: f32,
    pub size: f32,
}

impl From<&RouteStep> for TradeHop {
    fn from(step: &RouteStep) -> Self {
        Self {
            from: step.from.clone(),
            to: step.to.clone(),
            rate: step.edge.rate as f32,
            size: step.edge.size as f32,
        }
    }
}
