use crate::errors::Result;
use crate::models::Quote;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio_tungstenite::connect_async;
use tracing::warn;
use url::Url;

pub const BINANCE_STREAM_ENDPOINT: &str = "wss://stream.binance.com:9443/stream";

/// Symbols streamed when none are configured.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "XRPUSDT", "ADAUSDT", "SOLUSDT", "DOTUSDT", "LTCUSDT",
    "BCHUSDT", "LINKUSDT", "XLMUSDT", "UNIUSDT", "DOGEUSDT", "WBTCUSDT", "AAVEUSDT", "ATOMUSDT",
    "ETHBTC", "BNBBTC", "BNBETH", "XRPBTC", "XRPETH", "ADABTC", "ADAETH", "SOLBTC", "SOLETH",
    "DOTBTC", "DOTETH", "LTCBTC", "LTCETH", "BCHBTC", "LINKBTC", "LINKETH", "XLMBTC", "XLMETH",
    "UNIBTC", "UNIETH", "DOGEBTC", "DOGEETH", "WBTCETH", "AAVEBTC", "AAVEETH", "ATOMBTC",
    "ATOMETH",
];

/// Combined-stream envelope: `{"stream": "...", "data": {...}}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: BookTickerMsg,
}

/// Payload of a `<symbol>@bookTicker` stream.
#[derive(Debug, Deserialize)]
struct BookTickerMsg {
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "b")]
    bid_price: String,
    #[serde(rename = "B")]
    bid_qty: String,
    #[serde(rename = "a")]
    ask_price: String,
    #[serde(rename = "A")]
    ask_qty: String,
    /// Event time; only present on some endpoints.
    #[serde(rename = "E", default)]
    event_time: Option<u64>,
}

/// Build the combined-stream URL for `symbols` under `endpoint`.
pub fn stream_url(endpoint: &str, symbols: &[String]) -> Result<Url> {
    let streams: Vec<String> = symbols
        .iter()
        .map(|s| format!("{}@bookTicker", s.to_lowercase()))
        .collect();
    Ok(Url::parse(&format!("{}?streams={}", endpoint, streams.join("/")))?)
}

/// Decode one text frame into a quote. Frames that are not book tickers or
/// carry unparsable numbers yield `None`.
pub fn parse_book_ticker(txt: &str) -> Option<Quote> {
    let msg = match serde_json::from_str::<Envelope>(txt) {
        Ok(env) => env.data,
        Err(_) => match serde_json::from_str::<BookTickerMsg>(txt) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "[FEED] bookTicker JSON parse failed");
                return None;
            }
        },
    };
    Some(Quote {
        symbol: msg.symbol,
        bid_price: msg.bid_price.parse().ok()?,
        bid_size: msg.bid_qty.parse().ok()?,
        ask_price: msg.ask_price.parse().ok()?,
        ask_size: msg.ask_qty.parse().ok()?,
        timestamp: msg.event_time,
    })
}

/// Returns an asynchronous stream of `Quote`s for the given Binance symbols.
pub async fn connect_and_stream(
    endpoint: &str,
    symbols: &[String],
) -> Result<impl Stream<Item = Quote>> {
    let url = stream_url(endpoint, symbols)?;
    let (ws_stream, _resp) = connect_async(url).await?;

    let mapped = ws_stream.filter_map(|msg_res| async {
        match msg_res {
            Ok(msg) if msg.is_text() => {
                let txt = match msg.into_text() {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(error = %e, "[FEED] text extraction failed");
                        return None;
                    }
                };
                parse_book_ticker(&txt)
            }
            Err(e) => {
                warn!(error = %e, "[FEED] websocket message error");
                None
            }
            _ => None,
        }
    });
    Ok(mapped)
}
