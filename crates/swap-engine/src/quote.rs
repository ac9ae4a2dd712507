use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::Error;
use crate::gateway::AggregatorGateway;
use crate::state::{TradeState, TradeStore};
use crate::types::quote::QuoteRequest;

/// Debounces input edits into quote requests; results from superseded
/// generations are dropped.
pub struct QuoteFetcher {
    store: TradeStore,
    gateway: Arc<dyn AggregatorGateway>,
    debounce: Duration,
    timeout: Duration,
    display_precision: u8,
    pending: Option<JoinHandle<()>>,
}

impl QuoteFetcher {
    pub fn new(
        store: TradeStore,
        gateway: Arc<dyn AggregatorGateway>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            debounce: config.debounce(),
            timeout: config.request_timeout(),
            display_precision: config.display_precision,
            pending: None,
        }
    }

    /// Apply an input edit and, if it changed anything, restart the quote cycle.
    ///
    /// The edit, the acknowledgement of any finished trade and the invalidation
    /// of the old quote happen in one state update.
    pub fn update_inputs<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut TradeState) -> bool,
    {
        let (changed, request) = self.store.update(|state| {
            if !edit(state) {
                return (false, None);
            }
            state.acknowledge();
            (true, state.begin_quote_cycle())
        });
        if changed {
            self.schedule(request);
        }
        changed
    }

    /// Re-quote the current inputs.
    pub fn refresh(&mut self) {
        let request = self.store.update(TradeState::begin_quote_cycle);
        self.schedule(request);
    }

    /// Whether a debounce timer is armed.
    pub fn is_scheduled(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn schedule(&mut self, request: Option<QuoteRequest>) {
        self.cancel_pending();
        let Some(request) = request else {
            return;
        };

        let task = QuoteTask {
            store: self.store.clone(),
            gateway: self.gateway.clone(),
            timeout: self.timeout,
            display_precision: self.display_precision,
        };
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Detached so that replacing the timer never aborts a request
            // already on the wire.
            tokio::spawn(task.run(request));
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                debug!("debounce timer replaced");
            }
            handle.abort();
        }
    }
}

impl Drop for QuoteFetcher {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

struct QuoteTask {
    store: TradeStore,
    gateway: Arc<dyn AggregatorGateway>,
    timeout: Duration,
    display_precision: u8,
}

impl QuoteTask {
    async fn run(self, request: QuoteRequest) {
        let generation = request.generation;
        if let Err(err) = self.store.update(|state| state.mark_quote_loading(generation)) {
            debug!("quote #{generation} not issued: {err}");
            return;
        }
        debug!(
            "quote #{generation}: {} {} -> {}",
            request.amount, request.src, request.dst
        );

        let outcome = match tokio::time::timeout(self.timeout, self.gateway.quote(&request)).await {
            Ok(Ok(response)) => Ok(response.to_amount),
            Ok(Err(err)) => Err(Error::Gateway(err)),
            Err(_) => Err(Error::Timeout {
                operation: "quote",
                after: self.timeout,
            }),
        };
        let failure = outcome.as_ref().err().cloned();

        let display_precision = self.display_precision;
        match self
            .store
            .update(|state| state.commit_quote(generation, outcome, display_precision))
        {
            Ok(()) => match failure {
                Some(err) => warn!("quote #{generation} failed: {err}"),
                None => debug!("quote #{generation} committed"),
            },
            Err(err) => debug!("discarding quote #{generation}: {err}"),
        }
    }
}
