//! # Injected Provider Abstraction
//!
//! [`Eip1193Provider`] is the capability interface the rest of the crate
//! programs against. The browser implementation wraps the object a wallet
//! extension injects at `window.ethereum`; tests use an in-memory mock.
//!
//! Providers are owned by the extension, not by us: treat them as
//! read-mostly and never assume the same object answers twice.

use async_trait::async_trait;
use serde_json::Value;
use shared::WalletKind;
use std::fmt;
use std::rc::Rc;

use crate::error::ProviderRpcError;
use crate::utils::constants::{FLAG_COINBASE, FLAG_METAMASK, FLAG_PHANTOM};

/// Shared handle to an injected provider.
pub type ProviderHandle = Rc<dyn Eip1193Provider>;

/// Callback invoked for provider-emitted events.
pub type EventListener = Rc<dyn Fn(ProviderEvent)>;

/// Identifies one registered listener on one provider.
pub type ListenerId = u64;

/// Event names a provider emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
    Disconnect,
}

impl ProviderEventKind {
    pub const ALL: [ProviderEventKind; 3] = [
        ProviderEventKind::AccountsChanged,
        ProviderEventKind::ChainChanged,
        ProviderEventKind::Disconnect,
    ];

    /// Event name as passed to `provider.on(...)`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEventKind::AccountsChanged => "accountsChanged",
            ProviderEventKind::ChainChanged => "chainChanged",
            ProviderEventKind::Disconnect => "disconnect",
        }
    }
}

/// A decoded provider event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
    Disconnect,
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            ProviderEvent::ChainChanged(_) => ProviderEventKind::ChainChanged,
            ProviderEvent::Disconnect => ProviderEventKind::Disconnect,
        }
    }
}

/// EIP-1193 provider: `request`, marker flags and event subscription.
#[async_trait(?Send)]
pub trait Eip1193Provider {
    /// Send one JSON-RPC style request (`{ method, params }`).
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;

    /// Whether a boolean marker such as `isMetaMask` is set to `true`.
    fn has_flag(&self, flag: &str) -> bool;

    /// Register `listener` for `event`.
    fn on(&self, event: ProviderEventKind, listener: EventListener) -> ListenerId;

    /// Remove a listener registered with [`Eip1193Provider::on`]. Unknown ids
    /// are ignored.
    fn remove_listener(&self, event: ProviderEventKind, id: ListenerId);
}

/// Classify a provider by its marker flags.
///
/// Phantom and Coinbase Wallet also set `isMetaMask` for compatibility, so
/// the more specific flags are checked first.
pub fn detect_kind(provider: &dyn Eip1193Provider) -> WalletKind {
    if provider.has_flag(FLAG_PHANTOM) {
        WalletKind::Phantom
    } else if provider.has_flag(FLAG_COINBASE) {
        WalletKind::CoinbaseWallet
    } else if provider.has_flag(FLAG_METAMASK) {
        WalletKind::MetaMask
    } else {
        WalletKind::Unknown
    }
}

/// One candidate injected provider.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub kind: WalletKind,
    pub handle: ProviderHandle,
}

impl ProviderDescriptor {
    pub fn new(handle: ProviderHandle) -> Self {
        let kind = detect_kind(handle.as_ref());
        Self { kind, handle }
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
