use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse float error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error("Parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Execution service rejected route: {0}")]
    Rejected(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Other: {0}")]
    Other(String),
}

/// Why a symbol could not be turned into a currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("empty symbol")]
    Empty,

    #[error("symbol {0:?} has no recognized quote currency")]
    UnknownQuote(String),

    #[error("symbol {0:?} has an invalid base currency")]
    InvalidBase(String),

    #[error("symbol {0:?} resolves to the same currency on both sides")]
    SameCurrency(String),
}

/// Violations of the closed-walk invariant of a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route has {0} steps, need at least 3")]
    TooShort(usize),

    #[error("route is not closed: starts at {start} and ends at {end}")]
    NotClosed { start: String, end: String },

    #[error("step {index} does not continue from the previous step")]
    Broken { index: usize },

    #[error("vertex {0} is visited twice")]
    Repeated(String),
}
