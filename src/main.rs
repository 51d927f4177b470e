use anyhow::Result;
use rate_graph_arbitrage::{
    cex,
    config::AppConfig,
    emitter::RouteEmitter,
    execution::{Deduplicated, ExecutionClient, HttpExecution, LogExecution, RouteDedup},
    graph::{RateGraph, SymbolTable},
    orchestrator::Orchestrator,
    utils,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    tracing::info!(
        feed = %config.feed_url,
        symbols = config.feed_symbols.len(),
        execution = config.execution_url.as_ref().map(|u| u.as_str()).unwrap_or("log-only"),
        detect_interval_ms = config.detect_interval.as_millis() as u64,
        trade_fee = config.trade_fee,
        "[INIT] rate-graph-arbitrage starting"
    );

    // Shared graph ---------------------------------------------------------
    let graph = Arc::new(RateGraph::new(SymbolTable::default(), config.trade_fee));

    // Execution side -------------------------------------------------------
    let dedup = Arc::new(RouteDedup::new());
    let _dedup_task = Arc::clone(&dedup).spawn_clearer(config.dedup_window);
    let client: Arc<dyn ExecutionClient> = match &config.execution_url {
        Some(url) => Arc::new(Deduplicated::new(
            HttpExecution::new(url.clone())?,
            Arc::clone(&dedup),
        )),
        None => Arc::new(Deduplicated::new(LogExecution, Arc::clone(&dedup))),
    };
    let emitter = RouteEmitter::new(client, config.execution_timeout);

    // Detection ------------------------------------------------------------
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&graph),
        emitter,
        config.strategy,
    ));
    let detect_task = Arc::clone(&orchestrator).spawn_detection_loop(config.detect_interval);
    let report_task = Arc::clone(&orchestrator).spawn_tick_reporter(config.report_interval);

    // Quote feed -----------------------------------------------------------
    let feed_task = cex::spawn_quote_ingest(
        config.feed_url.clone(),
        config.feed_symbols.clone(),
        Arc::clone(&graph),
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("[SHUTDOWN] ctrl-c received");
    feed_task.abort();
    detect_task.abort();
    report_task.abort();
    Ok(())
}
