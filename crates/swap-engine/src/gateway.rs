use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::token::{Token, TokenList};
use crate::types::quote::{QuoteRequest, QuoteResponse};
use crate::types::transaction::{SwapRequest, SwapResponse, TransactionDescriptor};
use crate::units;

/// The credential-bearing aggregator proxy.
///
/// Implementations only move bytes; the engine owns timeouts, staleness and
/// state transitions.
#[async_trait]
pub trait AggregatorGateway: Send + Sync {
    /// Token list for the configured chain.
    async fn tokens(&self) -> Result<TokenList, GatewayError>;

    /// Estimated output for a base-unit input amount.
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, GatewayError>;

    /// Signable transaction for a swap.
    async fn build_swap(&self, request: &SwapRequest)
        -> Result<TransactionDescriptor, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    tokens: HashMap<String, Token>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    description: Option<String>,
}

/// Decode a `GET tokens` response.
pub fn decode_tokens(status: u16, body: &str) -> Result<TokenList, GatewayError> {
    let response: TokensResponse = decode(status, body)?;
    Ok(response.tokens.into_values().collect())
}

/// Decode a `GET quote` response. The destination amount must be an integer.
pub fn decode_quote(status: u16, body: &str) -> Result<QuoteResponse, GatewayError> {
    let response: QuoteResponse = decode(status, body)?;
    if units::parse_integer(&response.to_amount).is_err() {
        return Err(GatewayError::InvalidResponse(format!(
            "quote amount is not an integer: {}",
            response.to_amount
        )));
    }
    Ok(response)
}

/// Decode a `GET swap` response.
pub fn decode_swap(status: u16, body: &str) -> Result<TransactionDescriptor, GatewayError> {
    let response: SwapResponse = decode(status, body)?;
    Ok(response.tx)
}

fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, GatewayError> {
    if status != 200 {
        return Err(error_from_body(status, body));
    }
    serde_json::from_str(body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

fn error_from_body(status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.description))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                trimmed.to_string()
            }
        });
    GatewayError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tokens() {
        let body = r#"{
            "tokens": {
                "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee": {
                    "address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
                    "symbol": "ETH",
                    "name": "Ether",
                    "decimals": 18,
                    "logoURI": "https://tokens.1inch.io/eth.png"
                },
                "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913": {
                    "address": "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913",
                    "symbol": "USDC",
                    "name": "USD Coin",
                    "decimals": 6,
                    "logoURI": "https://tokens.1inch.io/usdc.png",
                    "eip2612": true
                }
            }
        }"#;
        let tokens = decode_tokens(200, body).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.find_by_symbol("USDC").unwrap().decimals, 6);
    }

    #[test]
    fn test_decode_quote() {
        let quote = decode_quote(200, r#"{"toAmount":"3512345678"}"#).unwrap();
        assert_eq!(quote.to_amount, "3512345678");
    }

    #[test]
    fn test_decode_quote_rejects_float_amount() {
        let err = decode_quote(200, r#"{"toAmount":"3.5e9"}"#).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn test_error_body_is_surfaced() {
        let err = decode_quote(400, r#"{"error":"insufficient liquidity"}"#).unwrap_err();
        assert_eq!(
            err,
            GatewayError::Status {
                status: 400,
                message: "insufficient liquidity".to_string()
            }
        );

        let err = decode_swap(500, "").unwrap_err();
        assert_eq!(err.to_string(), "status 500: HTTP 500");

        let err = decode_tokens(502, "Bad Gateway").unwrap_err();
        assert_eq!(err.to_string(), "status 502: Bad Gateway");
    }

    #[test]
    fn test_malformed_success_body() {
        let err = decode_swap(200, r#"{"transaction":{}}"#).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }
}
