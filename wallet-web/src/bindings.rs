//! # JavaScript API
//!
//! `WalletClient` exposes the wallet manager to plain JavaScript hosts:
//!
//! ```text
//! import init, { WalletClient, formatAddress } from './carbon_wallet.js';
//!
//! await init();
//! const wallet = new WalletClient({ connectTimeoutMs: 15000 });
//! wallet.onStateChange((state) => render(state));
//!
//! const result = await wallet.connect('metamask');
//! if (!result.success) showRetry(result.errorKind);
//! ```
//!
//! Operations that can fail reject with an `Error` whose `name` is the
//! error kind (`UserRejectedError`, `UnsupportedChainError`, ...).

use serde::Serialize;
use shared::{WalletKind, WalletState};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::services::{StateObserver, WalletManager};
use crate::utils::format;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("[wallet] connector loaded");
}

#[wasm_bindgen]
pub struct WalletClient {
    manager: WalletManager,
}

#[wasm_bindgen]
impl WalletClient {
    /// `config` is an optional object with camelCase `WalletConfig` keys.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WalletClient, JsValue> {
        let config: WalletConfig = if config.is_undefined() || config.is_null() {
            WalletConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        let manager = WalletManager::browser(config).map_err(|e| JsValue::from_str(&e))?;
        Ok(WalletClient { manager })
    }

    #[wasm_bindgen(js_name = availableWallets)]
    pub fn available_wallets(&self) -> Result<JsValue, JsValue> {
        to_js(&self.manager.available_wallets())
    }

    /// Resolves to a `ConnectionResult`; never rejects for wallet failures.
    #[wasm_bindgen]
    pub async fn connect(&self, preferred: Option<String>) -> Result<JsValue, JsValue> {
        let preferred = preferred
            .map(|name| name.parse::<WalletKind>())
            .transpose()
            .map_err(|e| JsValue::from_str(&e))?;

        let result = self.manager.connect(preferred).await;
        to_js(&result)
    }

    #[wasm_bindgen(js_name = restoreSession)]
    pub async fn restore_session(&self) -> Result<JsValue, JsValue> {
        match self.manager.restore_session().await {
            Some(result) => to_js(&result),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen]
    pub fn disconnect(&self) {
        self.manager.disconnect();
    }

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.manager.get_state())
    }

    #[wasm_bindgen(js_name = switchChain)]
    pub async fn switch_chain(&self, chain_id: &str) -> Result<(), JsValue> {
        self.manager.switch_chain(chain_id).await.map_err(js_error)
    }

    #[wasm_bindgen(js_name = refreshBalance)]
    pub async fn refresh_balance(&self) -> Result<String, JsValue> {
        self.manager.refresh_balance().await.map_err(js_error)
    }

    /// Call `callback(state)` after every state change. Returns an id for
    /// `offStateChange`.
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&self, callback: js_sys::Function) -> f64 {
        let observer: StateObserver = Rc::new(move |state: &WalletState| {
            let snapshot = match to_js(state) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::warn!("[bindings] could not serialize wallet state: {:?}", e);
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &snapshot) {
                log::warn!("[bindings] state listener threw: {:?}", e);
            }
        });

        self.manager.subscribe(observer) as f64
    }

    #[wasm_bindgen(js_name = offStateChange)]
    pub fn off_state_change(&self, id: f64) {
        self.manager.unsubscribe(id as u64);
    }
}

/// `0x1234...abcd` style shortening for display.
#[wasm_bindgen(js_name = formatAddress)]
pub fn format_address(address: &str) -> String {
    format::format_address(address)
}

/// Hex wei quantity to an ETH string with four decimals.
#[wasm_bindgen(js_name = weiToEth)]
pub fn wei_to_eth(wei_hex: &str) -> Result<String, JsValue> {
    format::wei_to_eth(wei_hex).map_err(js_error)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(err: WalletError) -> JsValue {
    let error = js_sys::Error::new(&err.to_string());
    error.set_name(err.kind().as_str());
    error.into()
}
