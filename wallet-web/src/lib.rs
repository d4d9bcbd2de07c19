//! # Carbon Wallet Connector
//!
//! Browser wallet connection core for the Blue Carbon dApp: finds injected
//! Ethereum providers, connects with a bounded timeout while hiding
//! competing wallet globals, keeps the connection in sync with wallet
//! events and survives page reloads through `localStorage`.
//!
//! ## Layout
//!
//! - [`services`]: platform-independent connector logic
//!   - [`services::registry`]: provider discovery and selection
//!   - [`services::conflict`]: competing namespace concealment
//!   - [`services::wallet`]: the connection state machine ([`WalletManager`])
//!   - [`services::persistence`]: session mirroring into a key-value store
//!   - [`services::events`]: provider event subscriptions
//! - `browser` (wasm32): `window.ethereum`, `localStorage`, timers
//! - `bindings` (wasm32): the `WalletClient` JavaScript class
//! - `state` (wasm32): Leptos context for Rust front-ends
//!
//! Everything under [`services`] runs against traits, so it is exercised
//! natively with mock providers and tokio's paused clock.

pub mod config;
pub mod error;
pub mod services;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod bindings;
#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(target_arch = "wasm32")]
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ChainDescriptor, WalletConfig};
pub use error::{ProviderRpcError, Result, WalletError};
pub use services::{ConnectionStatus, WalletManager};
pub use shared::{ConnectionResult, ErrorKind, WalletKind, WalletState};
pub use utils::format::{format_address, wei_to_eth};
