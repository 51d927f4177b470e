//! Resolution of exchange ticker symbols into (base, quote) currency codes.
//!
//! Two encodings are accepted:
//! • separated, e.g. `ETH/BTC`, `ETH-BTC` or `eth_btc`: split on the separator;
//! • concatenated, e.g. `ETHBTC`: the longest recognized quote currency that
//!   is a suffix of the symbol is the quote, the remainder is the base.
//!
//! Anything else is rejected with a [`SymbolError`].

use crate::errors::SymbolError;

/// Quote currencies recognized at the end of a concatenated symbol.
pub const DEFAULT_QUOTE_CURRENCIES: &[&str] = &[
    "BTC", "ETH", "BNB", "XRP", "ADA", "SOL", "DOT", "LTC", "BCH", "LINK", "XLM", "UNI", "DOGE",
    "WBTC", "AAVE", "ATOM", "USDT",
];

const SEPARATORS: &[char] = &['/', '-', '_'];

#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// Sorted longest first so `WBTC` wins over `BTC`.
    quotes: Vec<String>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTE_CURRENCIES.iter().copied())
    }
}

impl SymbolTable {
    pub fn new<I, S>(quotes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut quotes: Vec<String> = quotes
            .into_iter()
            .map(|q| q.as_ref().trim().to_ascii_uppercase())
            .filter(|q| !q.is_empty())
            .collect();
        quotes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        quotes.dedup();
        Self { quotes }
    }

    pub fn quote_currencies(&self) -> &[String] {
        &self.quotes
    }

    /// Split `symbol` into `(base, quote)`.
    pub fn resolve(&self, symbol: &str) -> Result<(String, String), SymbolError> {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(SymbolError::Empty);
        }

        let (base, quote) = match symbol.split_once(SEPARATORS) {
            Some((base, quote)) => (base.to_string(), quote.to_string()),
            None => {
                let quote = self
                    .quotes
                    .iter()
                    .find(|q| symbol.len() > q.len() && symbol.ends_with(q.as_str()))
                    .ok_or_else(|| SymbolError::UnknownQuote(symbol.clone()))?;
                let base = symbol[..symbol.len() - quote.len()].to_string();
                (base, quote.clone())
            }
        };

        if !is_currency_code(&quote) {
            return Err(SymbolError::UnknownQuote(symbol));
        }
        if !is_currency_code(&base) {
            return Err(SymbolError::InvalidBase(symbol));
        }
        if base == quote {
            return Err(SymbolError::SameCurrency(symbol));
        }
        Ok((base, quote))
    }
}

fn is_currency_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(base: &str, quote: &str) -> (String, String) {
        (base.to_string(), quote.to_string())
    }

    #[test]
    fn resolves_concatenated_symbols() {
        let table = SymbolTable::default();
        assert_eq!(table.resolve("BTCUSDT").unwrap(), pair("BTC", "USDT"));
        assert_eq!(table.resolve("ETHBTC").unwrap(), pair("ETH", "BTC"));
        assert_eq!(table.resolve("linketh").unwrap(), pair("LINK", "ETH"));
    }

    #[test]
    fn longest_quote_suffix_wins() {
        let table = SymbolTable::new(["BTC", "WBTC", "ETH"]);
        assert_eq!(table.quote_currencies()[0], "WBTC");
        assert_eq!(table.resolve("AAVEWBTC").unwrap(), pair("AAVE", "WBTC"));
        assert_eq!(table.resolve("WBTCETH").unwrap(), pair("WBTC", "ETH"));
    }

    #[test]
    fn resolves_separated_symbols() {
        let table = SymbolTable::default();
        assert_eq!(table.resolve("BTC/USD").unwrap(), pair("BTC", "USD"));
        assert_eq!(table.resolve("eth-btc").unwrap(), pair("ETH", "BTC"));
    }

    #[test]
    fn rejects_unresolvable_symbols() {
        let table = SymbolTable::default();
        assert_eq!(table.resolve("  "), Err(SymbolError::Empty));
        assert!(matches!(
            table.resolve("BTCEUR"),
            Err(SymbolError::UnknownQuote(_))
        ));
        assert!(matches!(table.resolve("USDT"), Err(SymbolError::UnknownQuote(_))));
        assert!(matches!(table.resolve("/USD"), Err(SymbolError::InvalidBase(_))));
        assert!(matches!(table.resolve("BTC/"), Err(SymbolError::UnknownQuote(_))));
        assert!(matches!(
            table.resolve("BTC/BTC"),
            Err(SymbolError::SameCurrency(_))
        ));
        assert!(matches!(
            table.resolve("BT.CUSDT"),
            Err(SymbolError::InvalidBase(_))
        ));
    }
}
