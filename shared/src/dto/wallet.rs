//! # Wallet Connection DTOs
//!
//! Snapshots and outcomes handed from the wallet connector to UI layers
//! (nav bars, dashboards, settings pages). These types cross the JS boundary,
//! so field names serialize as camelCase.
//!
//! ```text
//! {
//!   "isConnected": true,
//!   "address": "0x71c7656ec7ab88b098defb751b7401b5f6d8976f",
//!   "chainId": "0x89",
//!   "balance": "1.2500",
//!   "provider": "metamask"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Injected wallet families the connector can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    #[serde(rename = "metamask")]
    MetaMask,
    #[serde(rename = "coinbase", alias = "coinbasewallet")]
    CoinbaseWallet,
    Phantom,
    Unknown,
}

impl WalletKind {
    pub fn name(&self) -> &'static str {
        match self {
            WalletKind::MetaMask => "MetaMask",
            WalletKind::CoinbaseWallet => "Coinbase Wallet",
            WalletKind::Phantom => "Phantom",
            WalletKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metamask" => Ok(WalletKind::MetaMask),
            "coinbase" | "coinbasewallet" | "coinbase wallet" => Ok(WalletKind::CoinbaseWallet),
            "phantom" => Ok(WalletKind::Phantom),
            "unknown" => Ok(WalletKind::Unknown),
            other => Err(format!("unknown wallet kind: {}", other)),
        }
    }
}

/// Why a wallet operation failed.
///
/// Every kind is recoverable: the UI offers a retry for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No injected wallet extension is reachable.
    #[serde(rename = "NoProviderError")]
    NoProvider,
    /// Wallet is locked or exposes no accounts.
    #[serde(rename = "NoAccountsError")]
    NoAccounts,
    /// The user declined the request in the wallet UI (provider code 4001).
    #[serde(rename = "UserRejectedError")]
    UserRejected,
    /// The account request did not settle within the connect timeout.
    #[serde(rename = "ConnectionTimeoutError")]
    ConnectionTimeout,
    /// Switch target unknown to the wallet and could not be added.
    #[serde(rename = "UnsupportedChainError")]
    UnsupportedChain,
    /// Anything the provider threw that has no dedicated kind.
    #[serde(rename = "UnknownProviderError")]
    UnknownProvider,
    /// The attempt was superseded by a disconnect before it finished.
    #[serde(rename = "ConnectionAbortedError")]
    ConnectionAborted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoProvider => "NoProviderError",
            ErrorKind::NoAccounts => "NoAccountsError",
            ErrorKind::UserRejected => "UserRejectedError",
            ErrorKind::ConnectionTimeout => "ConnectionTimeoutError",
            ErrorKind::UnsupportedChain => "UnsupportedChainError",
            ErrorKind::UnknownProvider => "UnknownProviderError",
            ErrorKind::ConnectionAborted => "ConnectionAbortedError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the wallet connection.
///
/// `is_connected` implies `address.is_some()`; use the constructors rather
/// than building the struct by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub is_connected: bool,
    pub address: Option<String>,
    pub chain_id: Option<String>,
    pub balance: Option<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<WalletKind>,
}

impl WalletState {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: String, chain_id: String, provider: WalletKind) -> Self {
        Self {
            is_connected: true,
            address: Some(address),
            chain_id: Some(chain_id),
            balance: None,
            error: None,
            provider: Some(provider),
        }
    }

    /// Disconnected state carrying the message of the failed attempt.
    pub fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn to_persisted(&self) -> Option<PersistedConnection> {
        match (self.is_connected, &self.address, &self.chain_id) {
            (true, Some(address), Some(chain_id)) => Some(PersistedConnection {
                connected: true,
                address: address.clone(),
                chain_id: chain_id.clone(),
            }),
            _ => None,
        }
    }
}

/// Outcome of one connect attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ConnectionResult {
    pub fn connected(address: String, chain_id: String) -> Self {
        Self {
            success: true,
            address: Some(address),
            chain_id: Some(chain_id),
            error_kind: None,
        }
    }

    pub fn failed(kind: ErrorKind) -> Self {
        Self {
            success: false,
            address: None,
            chain_id: None,
            error_kind: Some(kind),
        }
    }
}

/// The subset of [`WalletState`] mirrored into local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedConnection {
    pub connected: bool,
    pub address: String,
    pub chain_id: String,
}
