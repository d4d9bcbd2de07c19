//! Wallet state management for Leptos views.
//!
//! [`WalletContext`] mirrors the manager's [`WalletState`] into a signal so
//! components re-render on connect, disconnect, account or chain changes.

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;
use shared::{WalletKind, WalletState};
use std::rc::Rc;

use crate::services::WalletManager;

/// Global wallet context
#[derive(Clone, Copy)]
pub struct WalletContext {
    pub wallet: RwSignal<WalletState>,
    manager: StoredValue<WalletManager, LocalStorage>,
}

impl WalletContext {
    pub fn new(manager: WalletManager) -> Self {
        let wallet = RwSignal::new(manager.get_state());
        manager.subscribe(Rc::new(move |state: &WalletState| {
            if wallet.try_set(state.clone()).is_some() {
                log::debug!("[wallet] context disposed, dropping state update");
            }
        }));

        Self {
            wallet,
            manager: StoredValue::new_local(manager),
        }
    }

    pub fn manager(&self) -> WalletManager {
        self.manager.get_value()
    }

    pub fn is_connected(&self) -> bool {
        self.wallet.with(|state| state.is_connected)
    }

    pub fn address(&self) -> Option<String> {
        self.wallet.with(|state| state.address.clone())
    }

    pub fn chain_id(&self) -> Option<String> {
        self.wallet.with(|state| state.chain_id.clone())
    }

    pub fn balance(&self) -> Option<String> {
        self.wallet.with(|state| state.balance.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.wallet.with(|state| state.error.clone())
    }

    pub fn provider(&self) -> Option<WalletKind> {
        self.wallet.with(|state| state.provider)
    }

    pub fn available_wallets(&self) -> Vec<WalletKind> {
        self.manager.with_value(|manager| manager.available_wallets())
    }

    /// Connect in the background, then load the balance.
    pub fn connect(&self, preferred: Option<WalletKind>) {
        let manager = self.manager();
        spawn_local(async move {
            if manager.connect(preferred).await.success {
                load_balance(&manager).await;
            }
        });
    }

    /// Reconnect a session persisted by an earlier visit, if any.
    pub fn restore(&self) {
        let manager = self.manager();
        spawn_local(async move {
            if let Some(result) = manager.restore_session().await {
                if result.success {
                    load_balance(&manager).await;
                }
            }
        });
    }

    pub fn switch_chain(&self, chain_id: String) {
        let manager = self.manager();
        spawn_local(async move {
            match manager.switch_chain(&chain_id).await {
                Ok(()) if manager.is_connected() => load_balance(&manager).await,
                Ok(()) => {}
                Err(e) => log::warn!("[wallet] switch to {} failed: {}", chain_id, e),
            }
        });
    }

    pub fn disconnect(&self) {
        self.manager.with_value(|manager| manager.disconnect());
    }
}

async fn load_balance(manager: &WalletManager) {
    if let Err(e) = manager.refresh_balance().await {
        log::warn!("[wallet] balance unavailable: {}", e);
    }
}

pub fn provide_wallet_context(manager: WalletManager) -> WalletContext {
    let context = WalletContext::new(manager);
    provide_context(context);
    context
}

pub fn use_wallet_context() -> WalletContext {
    expect_context::<WalletContext>()
}
