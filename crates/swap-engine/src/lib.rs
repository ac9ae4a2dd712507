pub mod address;
pub mod config;
pub mod driver;
pub mod error;
pub mod gateway;
#[cfg(feature = "http-gateway")]
pub mod http;
pub mod quote;
pub mod session;
pub mod signer;
pub mod state;
pub mod token;
pub mod types;
pub mod units;

#[cfg(test)]
pub(crate) mod testing;

use error::Error;

// Re-exports for convenience
pub use config::EngineConfig;
pub use driver::TransactionDriver;
pub use gateway::AggregatorGateway;
#[cfg(feature = "http-gateway")]
pub use http::HttpGateway;
pub use quote::QuoteFetcher;
pub use session::SwapSession;
pub use signer::WalletSigner;
pub use state::{QuoteStatus, TradeState, TradeStore, TxStatus};
pub use token::{Token, TokenList};
pub use types::quote::{QuoteRequest, QuoteResponse};
pub use types::transaction::{ConfirmationStatus, TransactionDescriptor};
pub use units::{from_base_units, to_base_units};

/// One-shot quote without debouncing or session state.
///
/// Converts `amount` with the source token's decimals, asks the gateway and
/// returns the output formatted to `display_precision` digits.
pub async fn quote_once(
    gateway: &dyn AggregatorGateway,
    source: &Token,
    dest: &Token,
    amount: &str,
    display_precision: u8,
) -> Result<String, Error> {
    if source.same_asset(dest) {
        return Err(Error::Precondition(
            "source and destination tokens must differ".to_string(),
        ));
    }
    if !units::is_positive_amount(amount) {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    let request = QuoteRequest {
        generation: 0,
        src: source.address.clone(),
        dst: dest.address.clone(),
        amount: to_base_units(amount, source.decimals)?,
    };
    let response = gateway.quote(&request).await?;
    from_base_units(&response.to_amount, dest.decimals, display_precision)
}
