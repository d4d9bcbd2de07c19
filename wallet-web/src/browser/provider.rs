//! [`Eip1193Provider`] over an injected JavaScript provider object.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::error::ProviderRpcError;
use crate::services::provider::{
    Eip1193Provider, EventListener, ListenerId, ProviderEvent, ProviderEventKind,
};
use crate::utils::constants::INTERNAL_ERROR_CODE;

#[wasm_bindgen(inline_js = "
export async function providerRequest(provider, method, params) {
    return await provider.request({ method, params });
}

export function providerOn(provider, event, listener) {
    provider.on(event, listener);
}

export function providerRemoveListener(provider, event, listener) {
    if (typeof provider.removeListener === 'function') {
        provider.removeListener(event, listener);
    } else if (typeof provider.off === 'function') {
        provider.off(event, listener);
    }
}
")]
extern "C" {
    #[wasm_bindgen(js_name = providerRequest, catch)]
    async fn provider_request(provider: &JsValue, method: &str, params: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = providerOn, catch)]
    fn provider_on(provider: &JsValue, event: &str, listener: &js_sys::Function) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = providerRemoveListener)]
    fn provider_remove_listener(provider: &JsValue, event: &str, listener: &js_sys::Function);
}

type JsListener = Closure<dyn FnMut(JsValue)>;

pub struct BrowserProvider {
    inner: JsValue,
    listeners: RefCell<HashMap<ListenerId, (ProviderEventKind, JsListener)>>,
    next_id: Cell<ListenerId>,
}

impl BrowserProvider {
    pub fn new(inner: JsValue) -> Self {
        Self {
            inner,
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for BrowserProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let params = params
            .serialize(&serializer)
            .map_err(|e| ProviderRpcError::new(INTERNAL_ERROR_CODE, e.to_string()))?;

        log::debug!("[provider] -> {}", method);
        let response = provider_request(&self.inner, method, params)
            .await
            .map_err(rpc_error)?;

        serde_wasm_bindgen::from_value(response).map_err(|e| {
            ProviderRpcError::new(INTERNAL_ERROR_CODE, format!("unreadable {} response: {}", method, e))
        })
    }

    fn has_flag(&self, flag: &str) -> bool {
        js_sys::Reflect::get(&self.inner, &JsValue::from_str(flag))
            .map(|value| value.as_bool() == Some(true))
            .unwrap_or(false)
    }

    fn on(&self, event: ProviderEventKind, listener: EventListener) -> ListenerId {
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            match decode_event(event, payload) {
                Some(decoded) => listener(decoded),
                None => log::warn!("[provider] ignoring malformed {} payload", event.as_str()),
            }
        });

        if let Err(e) = provider_on(&self.inner, event.as_str(), closure.as_ref().unchecked_ref()) {
            log::warn!("[provider] could not subscribe to {}: {:?}", event.as_str(), e);
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().insert(id, (event, closure));
        id
    }

    fn remove_listener(&self, event: ProviderEventKind, id: ListenerId) {
        let removed = self.listeners.borrow_mut().remove(&id);
        let Some((kind, closure)) = removed else {
            return;
        };
        debug_assert_eq!(kind, event);

        provider_remove_listener(&self.inner, kind.as_str(), closure.as_ref().unchecked_ref());
        // The provider may be dispatching into this closure right now.
        wasm_bindgen_futures::spawn_local(async move { drop(closure) });
    }
}

fn decode_event(kind: ProviderEventKind, payload: JsValue) -> Option<ProviderEvent> {
    match kind {
        ProviderEventKind::AccountsChanged => serde_wasm_bindgen::from_value::<Vec<String>>(payload)
            .ok()
            .map(ProviderEvent::AccountsChanged),
        ProviderEventKind::ChainChanged => payload
            .as_string()
            .or_else(|| payload.as_f64().map(|id| format!("{}", id as u64)))
            .map(ProviderEvent::ChainChanged),
        ProviderEventKind::Disconnect => Some(ProviderEvent::Disconnect),
    }
}

/// Read `{ code, message }` off a rejected request.
fn rpc_error(err: JsValue) -> ProviderRpcError {
    let field = |name: &str| js_sys::Reflect::get(&err, &JsValue::from_str(name)).ok();

    let code = field("code")
        .and_then(|code| code.as_f64())
        .map(|code| code as i64)
        .unwrap_or(INTERNAL_ERROR_CODE);
    let message = field("message")
        .and_then(|message| message.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "provider request failed".to_string());

    ProviderRpcError::new(code, message)
}
