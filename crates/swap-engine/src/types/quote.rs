use serde::{Deserialize, Serialize};

/// The `(source, dest, amount)` triple a quote was computed for.
///
/// Addresses are lower-cased; the amount is the raw input string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    pub src: String,
    pub dst: String,
    pub amount: String,
}

impl QuoteKey {
    pub fn new(src: &str, dst: &str, amount: &str) -> Self {
        Self {
            src: src.to_lowercase(),
            dst: dst.to_lowercase(),
            amount: amount.to_string(),
        }
    }
}

/// A single quote call. Only the request whose `generation` is still current
/// may write its result into the trade state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub generation: u64,
    pub src: String,
    pub dst: String,
    /// Source amount in base units.
    pub amount: String,
}

impl QuoteRequest {
    /// Query parameters for `GET quote`.
    pub fn query(&self) -> [(&'static str, &str); 3] {
        [
            ("src", self.src.as_str()),
            ("dst", self.dst.as_str()),
            ("amount", self.amount.as_str()),
        ]
    }
}

/// Successful quote body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Destination amount in base units.
    #[serde(rename = "toAmount", alias = "dstAmount")]
    pub to_amount: String,
}
