use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{GatewayError, SignerError};
use crate::gateway::AggregatorGateway;
use crate::signer::WalletSigner;
use crate::token::{Token, TokenList};
use crate::types::quote::{QuoteRequest, QuoteResponse};
use crate::types::transaction::{ConfirmationStatus, SwapRequest, TransactionDescriptor};

pub(crate) const ROUTER: &str = "0x111111125421ca6dc452d289314280a0f8842a65";
pub(crate) const ACCOUNT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub(crate) const TX_HASH: &str =
    "0x9f1c4ee6a3a1d25b0bf1f9b0b7d1a1c0f2d5e6b7a8c9d0e1f2a3b4c5d6e7f809";

pub(crate) fn eth() -> Token {
    Token {
        address: "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee".to_string(),
        symbol: "ETH".to_string(),
        name: "Ether".to_string(),
        decimals: 18,
        logo_uri: None,
    }
}

pub(crate) fn usdc() -> Token {
    Token {
        address: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_string(),
        symbol: "USDC".to_string(),
        name: "USD Coin".to_string(),
        decimals: 6,
        logo_uri: None,
    }
}

pub(crate) fn weth() -> Token {
    Token {
        address: "0x4200000000000000000000000000000000000006".to_string(),
        symbol: "WETH".to_string(),
        name: "Wrapped Ether".to_string(),
        decimals: 18,
        logo_uri: None,
    }
}

type Scripted<T> = (Duration, Result<T, GatewayError>);

pub(crate) struct MockGateway {
    tokens: TokenList,
    tokens_delay: Duration,
    quotes: HashMap<String, Scripted<String>>,
    swap: Option<Scripted<TransactionDescriptor>>,
    quote_calls: Mutex<Vec<QuoteRequest>>,
    swap_calls: Mutex<Vec<SwapRequest>>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self {
            tokens: [eth(), usdc(), weth()].into_iter().collect(),
            tokens_delay: Duration::ZERO,
            quotes: HashMap::new(),
            swap: None,
            quote_calls: Mutex::new(Vec::new()),
            swap_calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer quotes for `amount` (base units) with `to_amount` immediately.
    pub(crate) fn with_quote(self, amount: &str, to_amount: &str) -> Self {
        self.with_delayed_quote(amount, Duration::ZERO, Ok(to_amount.to_string()))
    }

    pub(crate) fn with_failing_quote(self, amount: &str, err: GatewayError) -> Self {
        self.with_delayed_quote(amount, Duration::ZERO, Err(err))
    }

    pub(crate) fn with_delayed_quote(
        mut self,
        amount: &str,
        delay: Duration,
        result: Result<String, GatewayError>,
    ) -> Self {
        self.quotes.insert(amount.to_string(), (delay, result));
        self
    }

    pub(crate) fn with_swap(
        mut self,
        delay: Duration,
        result: Result<TransactionDescriptor, GatewayError>,
    ) -> Self {
        self.swap = Some((delay, result));
        self
    }

    pub(crate) fn with_tokens_delay(mut self, delay: Duration) -> Self {
        self.tokens_delay = delay;
        self
    }

    pub(crate) fn quote_calls(&self) -> Vec<QuoteRequest> {
        self.quote_calls.lock().unwrap().clone()
    }

    pub(crate) fn swap_calls(&self) -> Vec<SwapRequest> {
        self.swap_calls.lock().unwrap().clone()
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl AggregatorGateway for MockGateway {
    async fn tokens(&self) -> Result<TokenList, GatewayError> {
        pause(self.tokens_delay).await;
        Ok(self.tokens.clone())
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, GatewayError> {
        self.quote_calls.lock().unwrap().push(request.clone());
        let (delay, result) = self.quotes.get(&request.amount).cloned().unwrap_or((
            Duration::ZERO,
            Err(GatewayError::Status {
                status: 400,
                message: "no route".to_string(),
            }),
        ));
        pause(delay).await;
        result.map(|to_amount| QuoteResponse { to_amount })
    }

    async fn build_swap(
        &self,
        request: &SwapRequest,
    ) -> Result<TransactionDescriptor, GatewayError> {
        self.swap_calls.lock().unwrap().push(request.clone());
        let (delay, result) = self.swap.clone().unwrap_or_else(|| {
            (
                Duration::ZERO,
                Ok(TransactionDescriptor {
                    to: ROUTER.to_string(),
                    data: "0x07ed2379".to_string(),
                    value: request.amount.clone(),
                }),
            )
        });
        pause(delay).await;
        result
    }
}

pub(crate) struct MockSigner {
    account: Option<String>,
    send_delay: Duration,
    send_result: Result<String, SignerError>,
    statuses: Mutex<VecDeque<Result<ConfirmationStatus, SignerError>>>,
    sent: Mutex<Vec<TransactionDescriptor>>,
    polls: AtomicUsize,
    balances: HashMap<String, String>,
}

impl MockSigner {
    /// Connected wallet whose transactions confirm on the first poll.
    pub(crate) fn new() -> Self {
        Self {
            account: Some(ACCOUNT.to_string()),
            send_delay: Duration::ZERO,
            send_result: Ok(TX_HASH.to_string()),
            statuses: Mutex::new(VecDeque::from([Ok(ConfirmationStatus::Confirmed)])),
            sent: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
            balances: HashMap::new(),
        }
    }

    pub(crate) fn disconnected() -> Self {
        Self {
            account: None,
            ..Self::new()
        }
    }

    pub(crate) fn with_send_result(mut self, result: Result<String, SignerError>) -> Self {
        self.send_result = result;
        self
    }

    pub(crate) fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Statuses returned by successive polls; `Pending` once exhausted.
    pub(crate) fn with_statuses(
        self,
        statuses: Vec<Result<ConfirmationStatus, SignerError>>,
    ) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    /// Report `amount` (base units) as the account's holding of `token`.
    pub(crate) fn with_balance(mut self, token: &Token, amount: &str) -> Self {
        self.balances
            .insert(token.address.to_lowercase(), amount.to_string());
        self
    }

    pub(crate) fn sent(&self) -> Vec<TransactionDescriptor> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for MockSigner {
    fn account(&self) -> Option<String> {
        self.account.clone()
    }

    async fn send_transaction(&self, tx: &TransactionDescriptor) -> Result<String, SignerError> {
        pause(self.send_delay).await;
        if self.send_result.is_ok() {
            self.sent.lock().unwrap().push(tx.clone());
        }
        self.send_result.clone()
    }

    async fn confirmation_status(&self, _hash: &str) -> Result<ConfirmationStatus, SignerError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(ConfirmationStatus::Pending))
    }

    async fn balance(&self, token: &Token) -> Result<Option<String>, SignerError> {
        if self.account.is_none() {
            return Err(SignerError::Unavailable("wallet not connected".to_string()));
        }
        Ok(self.balances.get(&token.address.to_lowercase()).cloned())
    }
}
