use async_trait::async_trait;

use crate::error::SignerError;
use crate::token::Token;
use crate::types::transaction::{ConfirmationStatus, TransactionDescriptor};

/// Wallet connection that signs and broadcasts transactions.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Connected account address, if any.
    fn account(&self) -> Option<String>;

    /// Sign and broadcast `tx`, returning the transaction hash once the
    /// network has accepted it.
    async fn send_transaction(&self, tx: &TransactionDescriptor) -> Result<String, SignerError>;

    /// Current confirmation status of a broadcast transaction.
    async fn confirmation_status(&self, hash: &str) -> Result<ConfirmationStatus, SignerError>;

    /// Connected account's holding of `token` in base units. `None` when the
    /// wallet does not report balances.
    async fn balance(&self, _token: &Token) -> Result<Option<String>, SignerError> {
        Ok(None)
    }
}
