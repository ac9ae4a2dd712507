use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::address::display_address;
use crate::config::EngineConfig;
use crate::error::{Error, SignerError};
use crate::gateway::AggregatorGateway;
use crate::signer::WalletSigner;
use crate::state::TradeStore;
use crate::types::quote::QuoteKey;
use crate::types::transaction::{ConfirmationStatus, SwapRequest, TransactionIntent};

/// Drives a trade `None -> Building -> AwaitingSignature -> Pending -> Confirmed`,
/// falling to `Failed` from any in-flight step.
#[derive(Clone)]
pub struct TransactionDriver {
    store: TradeStore,
    gateway: Arc<dyn AggregatorGateway>,
    signer: Arc<dyn WalletSigner>,
    slippage: f64,
    request_timeout: Duration,
    confirmation_timeout: Duration,
    confirmation_poll: Duration,
}

impl TransactionDriver {
    pub fn new(
        store: TradeStore,
        gateway: Arc<dyn AggregatorGateway>,
        signer: Arc<dyn WalletSigner>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            signer,
            slippage: config.slippage,
            request_timeout: config.request_timeout(),
            confirmation_timeout: config.confirmation_timeout(),
            confirmation_poll: config.confirmation_poll(),
        }
    }

    /// Execute the quoted trade and wait for it to confirm.
    ///
    /// Precondition failures return before any network call and leave the
    /// trade in `None`. Later failures move the trade to `Failed` and are
    /// recorded as `last_error`. Returns the transaction hash on confirmation.
    pub async fn confirm(&self) -> Result<String, Error> {
        let account = self
            .signer
            .account()
            .ok_or_else(|| Error::Precondition("wallet not connected".to_string()))?;
        let slippage = self.slippage;
        let (request, key) = self
            .store
            .update(|state| state.begin_build(&account, slippage))?;
        info!(
            "building swap of {} {} -> {} for {}",
            request.amount,
            display_address(&request.src),
            display_address(&request.dst),
            display_address(&account)
        );

        let guard = InFlight {
            store: &self.store,
            armed: true,
        };
        let result = self.execute(request, key).await;
        guard.disarm();

        match result {
            Ok(hash) => {
                info!("swap {hash} confirmed");
                Ok(hash)
            }
            Err(err) => {
                warn!("swap failed: {err}");
                self.store.update(|state| state.fail_trade(&err));
                Err(err)
            }
        }
    }

    async fn execute(&self, request: SwapRequest, key: QuoteKey) -> Result<String, Error> {
        let tx = self
            .bounded("swap build", self.request_timeout, self.gateway.build_swap(&request))
            .await??;
        tx.validate()?;
        let intent = TransactionIntent { tx, key };

        self.store
            .update(|state| state.begin_signature(&intent.key))?;
        info!(
            "awaiting signature for swap via {}",
            display_address(&intent.tx.to)
        );

        let hash = self.signer.send_transaction(&intent.tx).await?;
        self.store.update(|state| state.mark_pending(&hash))?;
        info!("swap broadcast as {hash}");

        self.bounded(
            "confirmation",
            self.confirmation_timeout,
            self.poll_confirmation(&hash),
        )
        .await??;
        self.store.update(|state| state.mark_confirmed())?;
        Ok(hash)
    }

    async fn poll_confirmation(&self, hash: &str) -> Result<(), Error> {
        loop {
            match self.signer.confirmation_status(hash).await {
                Ok(ConfirmationStatus::Confirmed) => return Ok(()),
                Ok(ConfirmationStatus::Failed) => {
                    return Err(Error::Reverted {
                        hash: hash.to_string(),
                    })
                }
                Ok(ConfirmationStatus::Pending) => {}
                Err(SignerError::Unavailable(reason)) => {
                    warn!("confirmation status for {hash} unavailable: {reason}");
                }
                Err(err) => return Err(err.into()),
            }
            tokio::time::sleep(self.confirmation_poll).await;
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        after: Duration,
        fut: impl Future<Output = T>,
    ) -> Result<T, Error> {
        tokio::time::timeout(after, fut)
            .await
            .map_err(|_| Error::Timeout { operation, after })
    }
}

/// Fails the trade if `confirm` is dropped before `execute` returns.
struct InFlight<'a> {
    store: &'a TradeStore,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && self.store.update(|state| state.fail_trade(&Error::Abandoned)) {
            warn!("swap abandoned while in flight");
        }
    }
}
