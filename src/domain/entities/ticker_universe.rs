use serde::Serialize;

/// The candidate ticker symbols considered by a strategy run.
///
/// Order follows the source file. Duplicates are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TickerUniverse {
    tickers: Vec<String>,
}

impl TickerUniverse {
    pub fn new(tickers: Vec<String>) -> Self {
        Self { tickers }
    }

    /// Parse newline-delimited ticker symbols, one per line. Blank lines are ignored.
    pub fn parse(text: &str) -> Self {
        let tickers = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self { tickers }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn into_tickers(self) -> Vec<String> {
        self.tickers
    }
}
