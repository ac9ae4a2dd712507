use std::sync::Arc;

use log::info;
use tokio::sync::watch;

use crate::config::EngineConfig;
use crate::driver::TransactionDriver;
use crate::error::Error;
use crate::gateway::AggregatorGateway;
use crate::quote::QuoteFetcher;
use crate::signer::WalletSigner;
use crate::state::{QuoteStatus, TradeState, TradeStore};
use crate::token::TokenList;
use crate::units;

/// Fractional digits shown for wallet balances.
pub const BALANCE_PRECISION: u8 = 4;

/// One user's swap session: the token list, the live trade and the components
/// that act on it.
pub struct SwapSession {
    config: EngineConfig,
    tokens: TokenList,
    store: TradeStore,
    fetcher: QuoteFetcher,
    driver: TransactionDriver,
    signer: Arc<dyn WalletSigner>,
}

impl SwapSession {
    /// Load the token list and open a session with the default pair selected.
    pub async fn start(
        config: EngineConfig,
        gateway: Arc<dyn AggregatorGateway>,
        signer: Arc<dyn WalletSigner>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let after = config.request_timeout();
        let tokens = tokio::time::timeout(after, gateway.tokens())
            .await
            .map_err(|_| Error::Timeout {
                operation: "token list",
                after,
            })??;
        info!(
            "loaded {} tokens for chain {}",
            tokens.len(),
            config.chain_id
        );
        Ok(Self::with_tokens(config, tokens, gateway, signer))
    }

    /// Open a session over an already loaded token list.
    pub fn with_tokens(
        config: EngineConfig,
        tokens: TokenList,
        gateway: Arc<dyn AggregatorGateway>,
        signer: Arc<dyn WalletSigner>,
    ) -> Self {
        let store = TradeStore::new();
        let mut fetcher = QuoteFetcher::new(store.clone(), gateway.clone(), &config);
        let driver = TransactionDriver::new(store.clone(), gateway, signer.clone(), &config);

        let source = config
            .default_source_symbol
            .as_deref()
            .and_then(|symbol| tokens.find_by_symbol(symbol))
            .cloned();
        let dest = config
            .default_dest_symbol
            .as_deref()
            .and_then(|symbol| tokens.find_by_symbol(symbol))
            .cloned();
        fetcher.update_inputs(|state| {
            let mut changed = false;
            if let Some(token) = source {
                changed |= state.select_source(token);
            }
            if let Some(token) = dest {
                changed |= state.select_dest(token);
            }
            changed
        });

        Self {
            config,
            tokens,
            store,
            fetcher,
            driver,
            signer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenList {
        &self.tokens
    }

    pub fn state(&self) -> TradeState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<TradeState> {
        self.store.subscribe()
    }

    pub fn select_source_token(&mut self, address: &str) -> Result<(), Error> {
        let token = self
            .tokens
            .get(address)
            .cloned()
            .ok_or_else(|| Error::UnknownToken(address.to_string()))?;
        self.fetcher.update_inputs(|state| state.select_source(token));
        Ok(())
    }

    pub fn select_dest_token(&mut self, address: &str) -> Result<(), Error> {
        let token = self
            .tokens
            .get(address)
            .cloned()
            .ok_or_else(|| Error::UnknownToken(address.to_string()))?;
        self.fetcher.update_inputs(|state| state.select_dest(token));
        Ok(())
    }

    /// Record the typed amount. Anything is accepted while editing; only
    /// positive decimals are quoted.
    pub fn set_source_amount(&mut self, amount: &str) {
        self.fetcher
            .update_inputs(|state| state.set_source_amount(amount));
    }

    /// Flip the pair; the current output becomes the new input.
    pub fn switch_tokens(&mut self) {
        self.fetcher.update_inputs(TradeState::switch_tokens);
    }

    /// Dismiss the shown error. A failed quote is retried.
    pub fn acknowledge_error(&mut self) {
        let retry = self.store.update(|state| {
            state.acknowledge();
            state.quote_status() == QuoteStatus::Failed
        });
        if retry {
            self.fetcher.refresh();
        }
    }

    pub fn can_confirm(&self) -> bool {
        self.store
            .snapshot()
            .can_confirm(self.signer.account().is_some())
    }

    /// Execute the quoted trade. See [`TransactionDriver::confirm`].
    pub async fn confirm_swap(&self) -> Result<String, Error> {
        self.driver.confirm().await
    }

    /// Handle for confirming from another task while the session keeps
    /// accepting edits.
    pub fn driver(&self) -> TransactionDriver {
        self.driver.clone()
    }

    /// Connected wallet's balance of the source token, formatted to
    /// [`BALANCE_PRECISION`] digits. `None` without a wallet, a source token
    /// or a reported balance.
    pub async fn source_balance(&self) -> Result<Option<String>, Error> {
        if self.signer.account().is_none() {
            return Ok(None);
        }
        let Some(token) = self.store.snapshot().source_token().cloned() else {
            return Ok(None);
        };
        let after = self.config.request_timeout();
        let balance = tokio::time::timeout(after, self.signer.balance(&token))
            .await
            .map_err(|_| Error::Timeout {
                operation: "balance",
                after,
            })??;
        balance
            .map(|amount| units::from_base_units(&amount, token.decimals, BALANCE_PRECISION))
            .transpose()
    }

    pub fn explorer_tx_url(&self, hash: &str) -> String {
        self.config.explorer_tx_url(hash)
    }
}
