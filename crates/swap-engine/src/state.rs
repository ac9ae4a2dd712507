use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::error::{Error, GatewayError};
use crate::token::Token;
use crate::types::quote::{QuoteKey, QuoteRequest};
use crate::types::transaction::SwapRequest;
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxStatus {
    #[default]
    None,
    Building,
    AwaitingSignature,
    Pending,
    Confirmed,
    Failed,
}

impl TxStatus {
    /// A trade is between confirm and a terminal status.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            TxStatus::Building | TxStatus::AwaitingSignature | TxStatus::Pending
        )
    }
}

/// Tokens, amounts and lifecycle status of the current trade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeState {
    source_token: Option<Token>,
    dest_token: Option<Token>,
    source_amount: String,
    dest_amount: String,
    quote_status: QuoteStatus,
    tx_status: TxStatus,
    last_error: Option<String>,
    tx_hash: Option<String>,
    quote_generation: u64,
    quoted: Option<QuoteKey>,
}

impl TradeState {
    pub fn source_token(&self) -> Option<&Token> {
        self.source_token.as_ref()
    }

    pub fn dest_token(&self) -> Option<&Token> {
        self.dest_token.as_ref()
    }

    pub fn source_amount(&self) -> &str {
        &self.source_amount
    }

    /// Quoted output, or empty when no quote matches the current inputs.
    pub fn dest_amount(&self) -> &str {
        &self.dest_amount
    }

    pub fn quote_status(&self) -> QuoteStatus {
        self.quote_status
    }

    pub fn tx_status(&self) -> TxStatus {
        self.tx_status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Broadcast hash of the current trade.
    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    pub fn quote_generation(&self) -> u64 {
        self.quote_generation
    }

    /// Key of the current inputs, when both tokens are selected.
    pub fn quote_key(&self) -> Option<QuoteKey> {
        let source = self.source_token.as_ref()?;
        let dest = self.dest_token.as_ref()?;
        Some(QuoteKey::new(&source.address, &dest.address, &self.source_amount))
    }

    /// Whether a confirm action would pass its preconditions.
    pub fn can_confirm(&self, wallet_connected: bool) -> bool {
        wallet_connected
            && self.quote_status == QuoteStatus::Ready
            && units::is_positive_amount(&self.source_amount)
            && self.last_error.is_none()
            && self.tx_status == TxStatus::None
    }

    // Input edits. Each returns whether the inputs changed.

    /// Selecting the token already on the dest leg swaps the legs.
    pub(crate) fn select_source(&mut self, token: Token) -> bool {
        if self.source_token.as_ref().is_some_and(|t| t.same_asset(&token)) {
            return false;
        }
        if self.dest_token.as_ref().is_some_and(|t| t.same_asset(&token)) {
            self.dest_token = self.source_token.take();
        }
        self.source_token = Some(token);
        true
    }

    /// Selecting the token already on the source leg swaps the legs.
    pub(crate) fn select_dest(&mut self, token: Token) -> bool {
        if self.dest_token.as_ref().is_some_and(|t| t.same_asset(&token)) {
            return false;
        }
        if self.source_token.as_ref().is_some_and(|t| t.same_asset(&token)) {
            self.source_token = self.dest_token.take();
        }
        self.dest_token = Some(token);
        true
    }

    pub(crate) fn set_source_amount(&mut self, amount: &str) -> bool {
        if self.source_amount == amount {
            return false;
        }
        self.source_amount = amount.to_string();
        true
    }

    /// Flip the legs; the previous output becomes the new input.
    pub(crate) fn switch_tokens(&mut self) -> bool {
        if self.source_token.is_none() && self.dest_token.is_none() {
            return false;
        }
        std::mem::swap(&mut self.source_token, &mut self.dest_token);
        self.source_amount = std::mem::take(&mut self.dest_amount);
        true
    }

    /// Acknowledge a finished trade or a shown error. An in-flight trade is
    /// left alone.
    pub(crate) fn acknowledge(&mut self) -> bool {
        if self.tx_status.is_in_flight() {
            return false;
        }
        let had_outcome = matches!(self.tx_status, TxStatus::Failed | TxStatus::Confirmed);
        if had_outcome {
            self.tx_status = TxStatus::None;
            self.tx_hash = None;
        }
        let had_error = self.last_error.take().is_some();
        had_outcome || had_error
    }

    // Quote cycle.

    /// Invalidate the current quote and build the request for the new inputs,
    /// if they are quotable.
    pub(crate) fn begin_quote_cycle(&mut self) -> Option<QuoteRequest> {
        self.quote_generation += 1;
        self.dest_amount.clear();
        self.quote_status = QuoteStatus::Idle;
        self.quoted = None;

        let source = self.source_token.as_ref()?;
        let dest = self.dest_token.as_ref()?;
        if !units::is_positive_amount(&self.source_amount) {
            return None;
        }
        let amount = units::parse_units(&self.source_amount, source.decimals).ok()?;
        if amount.bits() == 0 {
            return None;
        }

        Some(QuoteRequest {
            generation: self.quote_generation,
            src: source.address.clone(),
            dst: dest.address.clone(),
            amount: amount.to_string(),
        })
    }

    pub(crate) fn mark_quote_loading(&mut self, generation: u64) -> Result<(), Error> {
        self.check_generation(generation)?;
        self.quote_status = QuoteStatus::Loading;
        if !self.tx_status.is_in_flight() {
            self.last_error = None;
        }
        Ok(())
    }

    /// Apply a quote outcome (base-unit output amount or failure) if
    /// `generation` is still current.
    pub(crate) fn commit_quote(
        &mut self,
        generation: u64,
        outcome: Result<String, Error>,
        display_precision: u8,
    ) -> Result<(), Error> {
        self.check_generation(generation)?;

        let display = outcome.and_then(|amount| {
            let dest = self
                .dest_token
                .as_ref()
                .ok_or_else(|| Error::Precondition("no destination token".to_string()))?;
            units::from_base_units(&amount, dest.decimals, display_precision).map_err(|_| {
                Error::Gateway(GatewayError::InvalidResponse(format!(
                    "quote amount is not an integer: {amount}"
                )))
            })
        });

        match display {
            Ok(amount) => {
                self.dest_amount = amount;
                self.quote_status = QuoteStatus::Ready;
                self.quoted = self.quote_key();
            }
            Err(err) => {
                self.dest_amount.clear();
                self.quote_status = QuoteStatus::Failed;
                self.quoted = None;
                // The error slot belongs to the trade until it finishes.
                if !self.tx_status.is_in_flight() {
                    self.last_error = Some(err.to_string());
                }
            }
        }
        Ok(())
    }

    fn check_generation(&self, generation: u64) -> Result<(), Error> {
        if generation == self.quote_generation {
            Ok(())
        } else {
            Err(Error::StaleResult {
                generation,
                latest: self.quote_generation,
            })
        }
    }

    // Transaction lifecycle.

    /// `None -> Building`. Re-derives the base-unit amount from the current
    /// inputs and checks they still match the quote.
    pub(crate) fn begin_build(
        &mut self,
        account: &str,
        slippage: f64,
    ) -> Result<(SwapRequest, QuoteKey), Error> {
        match self.tx_status {
            TxStatus::None => {}
            TxStatus::Failed => {
                return Err(Error::Precondition(
                    "the previous swap failed; acknowledge it before retrying".to_string(),
                ))
            }
            TxStatus::Confirmed => {
                return Err(Error::Precondition(
                    "swap already confirmed; change the trade to start another".to_string(),
                ))
            }
            _ => {
                return Err(Error::Precondition(
                    "a swap is already in progress".to_string(),
                ))
            }
        }
        if self.quote_status != QuoteStatus::Ready {
            return Err(Error::Precondition("no ready quote".to_string()));
        }

        let key = self
            .quote_key()
            .ok_or_else(|| Error::Precondition("select both tokens".to_string()))?;
        if self.quoted.as_ref() != Some(&key) {
            return Err(Error::Precondition(
                "quote does not match the current trade".to_string(),
            ));
        }
        let (source, dest) = match (&self.source_token, &self.dest_token) {
            (Some(source), Some(dest)) => (source, dest),
            _ => return Err(Error::Precondition("select both tokens".to_string())),
        };
        let amount = units::to_base_units(&self.source_amount, source.decimals)?;

        let request = SwapRequest {
            src: source.address.clone(),
            dst: dest.address.clone(),
            amount,
            from: account.to_string(),
            slippage,
            disable_estimate: true,
        };

        self.tx_status = TxStatus::Building;
        self.tx_hash = None;
        self.last_error = None;
        Ok((request, key))
    }

    /// `Building -> AwaitingSignature`, provided the inputs did not drift
    /// while the transaction was being built.
    pub(crate) fn begin_signature(&mut self, key: &QuoteKey) -> Result<(), Error> {
        self.expect_status(TxStatus::Building)?;
        if self.quote_key().as_ref() != Some(key) {
            return Err(Error::Precondition(
                "the trade changed while the swap was being built; confirm again".to_string(),
            ));
        }
        self.tx_status = TxStatus::AwaitingSignature;
        Ok(())
    }

    /// `AwaitingSignature -> Pending`.
    pub(crate) fn mark_pending(&mut self, hash: &str) -> Result<(), Error> {
        self.expect_status(TxStatus::AwaitingSignature)?;
        self.tx_status = TxStatus::Pending;
        self.tx_hash = Some(hash.to_string());
        Ok(())
    }

    /// `Pending -> Confirmed`.
    pub(crate) fn mark_confirmed(&mut self) -> Result<(), Error> {
        self.expect_status(TxStatus::Pending)?;
        self.tx_status = TxStatus::Confirmed;
        Ok(())
    }

    /// In-flight trade -> `Failed`. Amounts are left untouched.
    pub(crate) fn fail_trade(&mut self, err: &Error) -> bool {
        if !self.tx_status.is_in_flight() || !err.is_surfaced() {
            return false;
        }
        self.tx_status = TxStatus::Failed;
        self.last_error = Some(err.to_string());
        true
    }

    fn expect_status(&self, expected: TxStatus) -> Result<(), Error> {
        if self.tx_status == expected {
            Ok(())
        } else {
            Err(Error::Precondition(format!(
                "expected {expected:?} but the swap is {:?}",
                self.tx_status
            )))
        }
    }
}

/// Owner of the session's `TradeState`.
///
/// Writers serialize on `state`; each change is then published to
/// subscribers while the lock is still held, so they observe updates in order.
#[derive(Debug, Clone)]
pub struct TradeStore {
    state: Arc<Mutex<TradeState>>,
    sender: Arc<watch::Sender<TradeState>>,
}

impl TradeStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(TradeState::default());
        Self {
            state: Arc::new(Mutex::new(TradeState::default())),
            sender: Arc::new(sender),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> TradeState {
        self.sender.borrow().clone()
    }

    /// Receiver notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<TradeState> {
        self.sender.subscribe()
    }

    /// Apply `f` atomically; observers are woken only if the state changed.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut TradeState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.clone();
        let output = f(&mut *state);
        if *state != before {
            self.sender.send_replace(state.clone());
        }
        output
    }
}

impl Default for TradeStore {
    fn default() -> Self {
        Self::new()
    }
}
