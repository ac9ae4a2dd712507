use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::GatewayError;
use crate::types::quote::QuoteKey;
use crate::units;

/// Parameters for `GET swap`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub src: String,
    pub dst: String,
    /// Source amount in base units, re-derived from the trade state at build time.
    pub amount: String,
    pub from: String,
    /// Slippage tolerance in percent.
    pub slippage: f64,
    pub disable_estimate: bool,
}

impl SwapRequest {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("src", self.src.clone()),
            ("dst", self.dst.clone()),
            ("amount", self.amount.clone()),
            ("from", self.from.clone()),
            ("slippage", self.slippage.to_string()),
            ("disableEstimate", self.disable_estimate.to_string()),
        ]
    }
}

/// A signable transaction as built by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDescriptor {
    pub to: String,
    pub data: String,
    /// Native value in wei.
    pub value: String,
}

impl TransactionDescriptor {
    /// Reject descriptors that a wallet could not sign as-is.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if Address::parse(&self.to).is_none() {
            return Err(GatewayError::InvalidResponse(format!(
                "transaction recipient is not an address: {}",
                self.to
            )));
        }
        let data_hex = self.data.strip_prefix("0x").ok_or_else(|| {
            GatewayError::InvalidResponse("transaction data is not 0x-prefixed".to_string())
        })?;
        if hex::decode(data_hex).is_err() {
            return Err(GatewayError::InvalidResponse(
                "transaction data is not valid hex".to_string(),
            ));
        }
        if units::parse_integer(&self.value).is_err() {
            return Err(GatewayError::InvalidResponse(format!(
                "transaction value is not an integer: {}",
                self.value
            )));
        }
        Ok(())
    }
}

/// Successful swap-build body.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapResponse {
    pub tx: TransactionDescriptor,
}

/// A built transaction plus the inputs it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub tx: TransactionDescriptor,
    pub key: QuoteKey,
}

/// Confirmation status reported by the wallet layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Failed,
}
