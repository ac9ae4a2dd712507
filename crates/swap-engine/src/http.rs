use async_trait::async_trait;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::GatewayError;
use crate::gateway::{self, AggregatorGateway};
use crate::token::TokenList;
use crate::types::quote::{QuoteRequest, QuoteResponse};
use crate::types::transaction::{SwapRequest, TransactionDescriptor};

/// `AggregatorGateway` over HTTP, talking to the aggregator proxy.
pub struct HttpGateway {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let gateway = Self::new(config.gateway_url.clone());
        match config.api_key() {
            Some(key) => gateway.with_api_key(key),
            None => gateway,
        }
    }

    /// Send `Authorization: Bearer <key>` on every request. Only for
    /// server-side use; browsers should go through the proxy.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<(u16, String), GatewayError> {
        let url = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        let mut request = self.client.get(&url).query(query);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        log::debug!("GET {url} -> {status}");
        Ok((status, body))
    }
}

#[async_trait]
impl AggregatorGateway for HttpGateway {
    async fn tokens(&self) -> Result<TokenList, GatewayError> {
        let (status, body) = self.get("tokens", &[] as &[(&str, &str)]).await?;
        gateway::decode_tokens(status, &body)
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, GatewayError> {
        let (status, body) = self.get("quote", &request.query()).await?;
        gateway::decode_quote(status, &body)
    }

    async fn build_swap(
        &self,
        request: &SwapRequest,
    ) -> Result<TransactionDescriptor, GatewayError> {
        let (status, body) = self.get("swap", &request.query()).await?;
        gateway::decode_swap(status, &body)
    }
}
