//! # Wallet Error Types
//!
//! [`WalletError`] is the error type of every fallible wallet operation. Each
//! variant maps onto one [`ErrorKind`], the stable name the UI keys its retry
//! prompts on.
//!
//! ## Provider Error Codes
//!
//! Injected providers reject requests with an EIP-1193 `{ code, message }`
//! object ([`ProviderRpcError`]). The codes that carry meaning here:
//!
//! - `4001` → [`WalletError::UserRejected`]
//! - `4902` → [`WalletError::UnsupportedChain`] (chain not added to the wallet)
//! - anything else → [`WalletError::UnknownProvider`]
//!
//! ```rust
//! use carbon_wallet::error::{ProviderRpcError, WalletError};
//! use shared::ErrorKind;
//!
//! let err = WalletError::from(ProviderRpcError::new(4001, "User rejected the request."));
//! assert_eq!(err.kind(), ErrorKind::UserRejected);
//! ```

use serde::{Deserialize, Serialize};
use shared::ErrorKind;
use thiserror::Error;

use crate::utils::constants::{REQUEST_PENDING_CODE, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE};

/// Convenience type alias for `Result<T, WalletError>`.
pub type Result<T> = std::result::Result<T, WalletError>;

/// Error object rejected by an EIP-1193 provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_CODE
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN_CODE
    }
}

/// Wallet operation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No injected provider could be found.
    #[error("No wallet provider found. Install MetaMask or another Ethereum wallet extension.")]
    NoProvider,

    /// The wallet returned no accounts (locked, or nothing connected).
    #[error("No accounts available. Unlock your wallet and try again.")]
    NoAccounts,

    /// User declined the request in the wallet popup.
    #[error("Request rejected in wallet: {0}")]
    UserRejected(String),

    /// Account request did not settle within the configured bound.
    #[error("Wallet did not respond within {0} ms")]
    ConnectionTimeout(u64),

    /// Target chain is unknown to the wallet and could not be added.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// Any other provider failure, including malformed responses.
    #[error("Wallet provider error: {0}")]
    UnknownProvider(String),

    /// Attempt superseded by a disconnect before it finished.
    #[error("Connection attempt aborted")]
    ConnectionAborted,
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::NoProvider => ErrorKind::NoProvider,
            WalletError::NoAccounts => ErrorKind::NoAccounts,
            WalletError::UserRejected(_) => ErrorKind::UserRejected,
            WalletError::ConnectionTimeout(_) => ErrorKind::ConnectionTimeout,
            WalletError::UnsupportedChain(_) => ErrorKind::UnsupportedChain,
            WalletError::UnknownProvider(_) => ErrorKind::UnknownProvider,
            WalletError::ConnectionAborted => ErrorKind::ConnectionAborted,
        }
    }
}

impl From<ProviderRpcError> for WalletError {
    fn from(err: ProviderRpcError) -> Self {
        if err.is_user_rejection() {
            WalletError::UserRejected(err.message)
        } else if err.is_unrecognized_chain() {
            WalletError::UnsupportedChain(err.message)
        } else if err.code == REQUEST_PENDING_CODE {
            WalletError::UnknownProvider(
                "A wallet request is already pending. Open your wallet extension to continue.".to_string(),
            )
        } else {
            WalletError::UnknownProvider(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::UnknownProvider(format!("malformed provider response: {}", err))
    }
}

/// Local key-value store failure. Logged by the persistence adapter, never
/// surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Storage error: {0}")]
pub struct StorageError(pub String);
