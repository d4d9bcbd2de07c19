//! # Browser Bindings
//!
//! The wasm32 side of the connector: the injected `window.ethereum` object,
//! namespace concealment, `localStorage` and `setTimeout` based sleeps,
//! each behind the trait the services program against.

mod environment;
mod provider;
mod storage;

pub use environment::BrowserEnvironment;
pub use provider::BrowserProvider;
pub use storage::LocalStorageStore;

use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;
use std::time::Duration;

use crate::config::WalletConfig;
use crate::services::persistence::{KeyValueStore, MemoryStore};
use crate::services::timer::Timer;
use crate::services::WalletManager;

pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        gloo_timers::future::sleep(duration).boxed_local()
    }
}

impl WalletManager {
    /// Manager wired to the current page.
    ///
    /// Falls back to in-memory persistence when `localStorage` is
    /// unavailable; the session then does not survive a reload.
    pub fn browser(config: WalletConfig) -> Result<Self, String> {
        let store: Rc<dyn KeyValueStore> = match LocalStorageStore::open() {
            Some(store) => Rc::new(store),
            None => {
                log::warn!("[storage] localStorage unavailable, using in-memory persistence");
                Rc::new(MemoryStore::new())
            }
        };

        WalletManager::new(config, Rc::new(BrowserEnvironment), store, Rc::new(BrowserTimer))
    }
}
