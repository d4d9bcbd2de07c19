//! `window` access: the Ethereum namespace and namespace concealment.

use std::rc::Rc;
use wasm_bindgen::prelude::*;

use super::provider::BrowserProvider;
use crate::services::provider::ProviderHandle;
use crate::services::registry::{InjectedEnvironment, InjectedEthereum};

#[wasm_bindgen(inline_js = "
const concealed = new Map();

export function injectedEthereum() {
    if (typeof window === 'undefined') {
        return null;
    }
    return window.ethereum || null;
}

export function injectedProviders(ethereum) {
    try {
        const providers = ethereum.providers;
        return Array.isArray(providers) && providers.length > 0 ? providers : null;
    } catch (e) {
        return null;
    }
}

export function concealNamespace(name) {
    const held = concealed.get(name);
    if (held) {
        held.holds += 1;
        return true;
    }
    const descriptor = Object.getOwnPropertyDescriptor(window, name);
    if (!descriptor || descriptor.configurable === false) {
        return false;
    }
    try {
        Object.defineProperty(window, name, {
            configurable: true,
            get: () => undefined,
            set: () => {},
        });
        concealed.set(name, { descriptor, holds: 1 });
        return true;
    } catch (e) {
        return false;
    }
}

export function revealNamespace(name) {
    const held = concealed.get(name);
    if (!held) {
        return;
    }
    held.holds -= 1;
    if (held.holds > 0) {
        return;
    }
    concealed.delete(name);
    try {
        Object.defineProperty(window, name, held.descriptor);
    } catch (e) {
        console.warn('[conflict] could not restore window.' + name, e);
    }
}
")]
extern "C" {
    #[wasm_bindgen(js_name = injectedEthereum)]
    fn injected_ethereum() -> Option<JsValue>;

    #[wasm_bindgen(js_name = injectedProviders)]
    fn injected_providers(ethereum: &JsValue) -> Option<js_sys::Array>;

    #[wasm_bindgen(js_name = concealNamespace)]
    fn conceal_namespace(name: &str) -> bool;

    #[wasm_bindgen(js_name = revealNamespace)]
    fn reveal_namespace(name: &str);
}

/// The real page. Concealment swaps the property for an accessor returning
/// `undefined` and keeps the original descriptor to put back.
///
/// The JS side counts holds per namespace across every manager on the page,
/// so one client restoring cannot expose a global another still hides.
pub struct BrowserEnvironment;

impl InjectedEnvironment for BrowserEnvironment {
    fn ethereum(&self) -> Option<InjectedEthereum> {
        let ethereum = injected_ethereum()?;

        match injected_providers(&ethereum) {
            Some(providers) => {
                let handles: Vec<ProviderHandle> = providers
                    .iter()
                    .filter(|p| p.is_object())
                    .map(|p| Rc::new(BrowserProvider::new(p)) as ProviderHandle)
                    .collect();
                Some(InjectedEthereum::Multiple(handles))
            }
            None => Some(InjectedEthereum::Single(Rc::new(BrowserProvider::new(ethereum)))),
        }
    }

    fn conceal(&self, namespace: &str) -> bool {
        conceal_namespace(namespace)
    }

    fn reveal(&self, namespace: &str) {
        reveal_namespace(namespace)
    }
}
