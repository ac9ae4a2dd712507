use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Token metadata as published by the aggregator token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,

    #[serde(rename = "logoURI")]
    #[serde(default)]
    pub logo_uri: Option<String>,
}

impl Token {
    /// Whether both tokens refer to the same on-chain asset.
    pub fn same_asset(&self, other: &Token) -> bool {
        self.address.eq_ignore_ascii_case(&other.address)
    }
}

/// Normalized token lookup key (lower-cased address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey(pub String);

impl TokenKey {
    pub fn new(address: &str) -> Self {
        Self(address.to_lowercase())
    }
}

/// The token set for the session's chain.
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    tokens: HashMap<TokenKey, Token>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: Token) {
        self.tokens.insert(TokenKey::new(&token.address), token);
    }

    /// Look up a token by address, case-insensitively.
    pub fn get(&self, address: &str) -> Option<&Token> {
        self.tokens.get(&TokenKey::new(address))
    }

    /// First token with a matching symbol. Symbols are not unique, so ties are
    /// broken by address to keep the choice stable.
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .values()
            .filter(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .min_by(|a, b| a.address.to_lowercase().cmp(&b.address.to_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens sorted by symbol, for selection lists.
    pub fn sorted(&self) -> Vec<&Token> {
        let mut list: Vec<&Token> = self.tokens.values().collect();
        list.sort_by(|a, b| a.symbol.cmp(&b.symbol).then_with(|| a.address.cmp(&b.address)));
        list
    }
}

impl FromIterator<Token> for TokenList {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut list = TokenList::new();
        for token in iter {
            list.insert(token);
        }
        list
    }
}
