pub mod conflict;
pub mod events;
pub mod persistence;
pub mod provider;
pub mod registry;
pub mod timer;
pub mod wallet;

pub use wallet::{ConnectionStatus, ObserverId, StateObserver, WalletManager};
