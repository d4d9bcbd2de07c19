//! # Wallet Manager
//!
//! Drives the connection state machine for injected Ethereum wallets:
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──accounts──▶ Connected
//!      ▲                        │                        │
//!      └──────── failure ───────┘◀──── disconnect ───────┘
//! ```
//!
//! A failed attempt lands back in `Disconnected` (with `WalletState.error`
//! set), never in a sticky error state, so the UI can retry immediately.
//!
//! ## Concurrency
//!
//! Only one connection attempt runs at a time. A `connect()` issued while
//! another is in flight joins the in-flight attempt and gets the same
//! [`ConnectionResult`]. Each attempt carries a generation number;
//! `disconnect()` bumps it, and an attempt that wakes up to a different
//! generation discards what it received instead of resurrecting a
//! connection the user already gave up on. `disconnect()` also aborts the
//! attempt, and the next attempt waits for the aborted one to drop its
//! provider request, so at most one request is ever outstanding.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo(manager: carbon_wallet::WalletManager) {
//! let result = manager.connect(None).await;
//! if result.success {
//!     let state = manager.get_state();
//!     println!("connected {:?} on {:?}", state.address, state.chain_id);
//! }
//! manager.disconnect();
//! # }
//! ```

use futures::future::{self, AbortHandle, Abortable, FutureExt, LocalBoxFuture, Shared, WeakShared};
use serde_json::{json, Value};
use shared::{ConnectionResult, ErrorKind, WalletKind, WalletState};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::WalletConfig;
use crate::error::{Result, WalletError};
use crate::services::conflict::ConflictResolver;
use crate::services::events::EventBridge;
use crate::services::persistence::{KeyValueStore, PersistenceAdapter};
use crate::services::provider::{EventListener, ProviderDescriptor, ProviderEvent, ProviderHandle};
use crate::services::registry::{InjectedEnvironment, ProviderRegistry};
use crate::services::timer::{with_timeout, Timer};
use crate::utils::constants::{
    ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_GET_BALANCE, ETH_REQUEST_ACCOUNTS, WALLET_ADD_CHAIN,
    WALLET_SWITCH_CHAIN,
};
use crate::utils::format::{format_address, normalize_chain_id, wei_to_eth};

/// Callback receiving a snapshot after every state transition.
pub type StateObserver = Rc<dyn Fn(&WalletState)>;

pub type ObserverId = u64;

/// Connection state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

type Attempt = Shared<LocalBoxFuture<'static, ConnectionResult>>;
type AbandonedAttempt = WeakShared<LocalBoxFuture<'static, ConnectionResult>>;

#[derive(Debug, Clone, Copy)]
enum AttemptMode {
    /// `eth_requestAccounts`: may open the wallet popup.
    Interactive(Option<WalletKind>),
    /// `eth_accounts`: no prompt, used to restore a persisted session.
    Silent,
}

struct Inner {
    config: WalletConfig,
    registry: ProviderRegistry,
    conflicts: ConflictResolver,
    persistence: PersistenceAdapter,
    events: EventBridge,
    timer: Rc<dyn Timer>,
    state: RefCell<WalletState>,
    status: Cell<ConnectionStatus>,
    active: RefCell<Option<ProviderDescriptor>>,
    generation: Cell<u64>,
    in_flight: RefCell<Option<Attempt>>,
    abort: RefCell<Option<AbortHandle>>,
    /// Attempt aborted by `disconnect()` that a caller may still be polling.
    abandoned: RefCell<Option<AbandonedAttempt>>,
    observers: RefCell<Vec<(ObserverId, StateObserver)>>,
    next_observer: Cell<ObserverId>,
}

impl Inner {
    fn next_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }
}

/// Owner of the wallet connection. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WalletManager {
    inner: Rc<Inner>,
}

impl WalletManager {
    /// Build a manager over an injected environment, a key-value store and a
    /// timer. Fails if the configuration does not validate.
    pub fn new(
        config: WalletConfig,
        env: Rc<dyn InjectedEnvironment>,
        store: Rc<dyn KeyValueStore>,
        timer: Rc<dyn Timer>,
    ) -> std::result::Result<Self, String> {
        let config = config.normalized()?;

        let inner = Inner {
            registry: ProviderRegistry::new(env.clone()),
            conflicts: ConflictResolver::new(env, timer.clone(), config.conflict_grace()),
            persistence: PersistenceAdapter::new(store, &config.storage_prefix),
            events: EventBridge::new(),
            timer,
            config,
            state: RefCell::new(WalletState::disconnected()),
            status: Cell::new(ConnectionStatus::Disconnected),
            active: RefCell::new(None),
            generation: Cell::new(0),
            in_flight: RefCell::new(None),
            abort: RefCell::new(None),
            abandoned: RefCell::new(None),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(1),
        };

        Ok(Self { inner: Rc::new(inner) })
    }

    /// Snapshot of the current state.
    pub fn get_state(&self) -> WalletState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.status.get()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Kinds of the wallets currently injected in the page.
    pub fn available_wallets(&self) -> Vec<WalletKind> {
        self.inner
            .registry
            .list_providers()
            .into_iter()
            .map(|p| p.kind)
            .collect()
    }

    /// Connect to an injected wallet, prompting the user if needed.
    ///
    /// Never fails with an `Err`: every outcome is a [`ConnectionResult`].
    pub async fn connect(&self, preferred: Option<WalletKind>) -> ConnectionResult {
        self.start_attempt(AttemptMode::Interactive(preferred)).await
    }

    /// Silently reconnect a session persisted by a previous page load.
    ///
    /// Returns `None` when nothing was persisted. A wallet that no longer
    /// exposes accounts clears the persisted record.
    pub async fn restore_session(&self) -> Option<ConnectionResult> {
        let idle = self.inner.in_flight.borrow().is_none() && !self.is_connected();
        if idle && self.inner.persistence.load().is_none() {
            return None;
        }

        Some(self.start_attempt(AttemptMode::Silent).await)
    }

    /// Drop the connection: detach listeners, clear persisted state and
    /// abandon any in-flight attempt. Calling it again is a no-op.
    pub fn disconnect(&self) {
        let inner = &self.inner;
        let had_something = inner.status.get() != ConnectionStatus::Disconnected
            || inner.in_flight.borrow().is_some()
            || inner.events.is_attached()
            || *inner.state.borrow() != WalletState::disconnected();

        inner.next_generation();
        if let Some(attempt) = inner.in_flight.borrow_mut().take() {
            *inner.abandoned.borrow_mut() = attempt.downgrade();
        }
        if let Some(abort) = inner.abort.borrow_mut().take() {
            abort.abort();
        }
        inner.events.detach_all();
        inner.active.borrow_mut().take();
        inner.persistence.clear();
        inner.status.set(ConnectionStatus::Disconnected);

        if had_something {
            log::info!("[wallet] disconnected");
            self.replace_state(WalletState::disconnected());
        }
    }

    /// Ask the wallet to switch to `target` (hex `0x89` or decimal `137`).
    ///
    /// If the wallet does not know the chain (code 4902), the configured
    /// descriptor is offered via `wallet_addEthereumChain` once and the
    /// switch is retried once. A failing retry is returned as is.
    pub async fn switch_chain(&self, target: &str) -> Result<()> {
        let chain_id = normalize_chain_id(target)?;
        let provider = self
            .active_provider()
            .or_else(|| self.inner.registry.resolve(None).map(|d| d.handle))
            .ok_or(WalletError::NoProvider)?;
        let params = json!([{ "chainId": chain_id }]);

        match provider.request(WALLET_SWITCH_CHAIN, params.clone()).await {
            Ok(_) => {}
            Err(err) if err.is_unrecognized_chain() => {
                let descriptor = self.inner.config.chain(&chain_id).cloned().ok_or_else(|| {
                    WalletError::UnsupportedChain(format!("{} is not a configured chain", chain_id))
                })?;

                log::info!(
                    "[wallet] chain {} unknown to wallet, adding {}",
                    chain_id,
                    descriptor.chain_name
                );
                let add_params = Value::Array(vec![serde_json::to_value(&descriptor)?]);
                provider
                    .request(WALLET_ADD_CHAIN, add_params)
                    .await
                    .map_err(|err| {
                        if err.is_user_rejection() {
                            WalletError::UserRejected(err.message)
                        } else {
                            WalletError::UnsupportedChain(format!(
                                "could not add {}: {}",
                                descriptor.chain_name, err.message
                            ))
                        }
                    })?;

                provider.request(WALLET_SWITCH_CHAIN, params).await?;
            }
            Err(err) => return Err(err.into()),
        }

        if self.is_connected() {
            self.update_state(|state| {
                state.chain_id = Some(chain_id.clone());
                state.balance = None;
            });
            self.persist_current();
        }

        log::info!("[wallet] switched to chain {}", chain_id);
        Ok(())
    }

    /// Read the native balance of the connected account and store it in
    /// `WalletState.balance`.
    pub async fn refresh_balance(&self) -> Result<String> {
        let address = self.get_state().address;
        let (address, provider) = match (address, self.active_provider()) {
            (Some(address), Some(provider)) if self.is_connected() => (address, provider),
            _ => return Err(WalletError::NoAccounts),
        };
        let generation = self.inner.generation.get();

        let raw = provider
            .request(ETH_GET_BALANCE, json!([address, "latest"]))
            .await?;
        let wei_hex = raw
            .as_str()
            .ok_or_else(|| WalletError::UnknownProvider(format!("unexpected balance response: {}", raw)))?;
        let balance = wei_to_eth(wei_hex)?;

        let same_account = self.get_state().address.as_deref() == Some(address.as_str());
        if self.inner.is_current(generation) && same_account {
            self.update_state(|state| state.balance = Some(balance.clone()));
        }

        Ok(balance)
    }

    /// Register a state observer.
    pub fn subscribe(&self, observer: StateObserver) -> ObserverId {
        let id = self.inner.next_observer.get();
        self.inner.next_observer.set(id + 1);
        self.inner.observers.borrow_mut().push((id, observer));
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) {
        self.inner.observers.borrow_mut().retain(|(observer_id, _)| *observer_id != id);
    }

    fn start_attempt(&self, mode: AttemptMode) -> Attempt {
        if let Some(pending) = self.inner.in_flight.borrow().clone() {
            log::debug!("[wallet] connection attempt already in flight, joining it");
            return pending;
        }

        if self.is_connected() {
            let state = self.get_state();
            let result = match (state.address, state.chain_id) {
                (Some(address), Some(chain_id)) => ConnectionResult::connected(address, chain_id),
                _ => ConnectionResult::failed(ErrorKind::NoAccounts),
            };
            return future::ready(result).boxed_local().shared();
        }

        let generation = self.inner.next_generation();
        self.inner.status.set(ConnectionStatus::Connecting);

        let previous = self
            .inner
            .abandoned
            .borrow_mut()
            .take()
            .and_then(|weak| weak.upgrade());
        let (abort, registration) = AbortHandle::new_pair();

        let this = self.clone();
        let attempt = async move {
            // Polling the aborted attempt drops its pending request.
            if let Some(previous) = previous {
                previous.await;
            }

            let run = Abortable::new(this.run_attempt(generation, mode), registration);
            let result = match run.await {
                Ok(Ok((address, chain_id))) => ConnectionResult::connected(address, chain_id),
                Ok(Err(err)) => this.fail_attempt(generation, mode, err),
                Err(_) => this.fail_attempt(generation, mode, WalletError::ConnectionAborted),
            };
            this.finish_attempt(generation);
            result
        }
        .boxed_local()
        .shared();

        *self.inner.in_flight.borrow_mut() = Some(attempt.clone());
        *self.inner.abort.borrow_mut() = Some(abort);
        self.update_state(|state| state.error = None);
        attempt
    }

    async fn run_attempt(&self, generation: u64, mode: AttemptMode) -> Result<(String, String)> {
        let inner = &self.inner;
        let preferred = match mode {
            AttemptMode::Interactive(preferred) => preferred,
            AttemptMode::Silent => None,
        };

        let descriptor = inner.registry.resolve(preferred).ok_or(WalletError::NoProvider)?;
        let provider = descriptor.handle.clone();
        log::info!("[wallet] requesting accounts from {}", descriptor.kind);

        let timeout = inner.config.connect_timeout();
        let response = match mode {
            AttemptMode::Interactive(_) => {
                let request = inner
                    .conflicts
                    .with_exclusive_access(&inner.config.competing_namespaces, || {
                        provider.request(ETH_REQUEST_ACCOUNTS, json!([]))
                    });
                with_timeout(inner.timer.as_ref(), timeout, request).await
            }
            AttemptMode::Silent => {
                with_timeout(inner.timer.as_ref(), timeout, provider.request(ETH_ACCOUNTS, json!([]))).await
            }
        };

        let accounts = response.map_err(|_| WalletError::ConnectionTimeout(inner.config.connect_timeout_ms))??;
        self.ensure_current(generation)?;

        let accounts: Vec<String> = serde_json::from_value(accounts)?;
        let address = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;

        let chain_id = self.read_chain_id(&provider).await;
        self.ensure_current(generation)?;

        self.commit_connection(descriptor, address.clone(), chain_id.clone());
        Ok((address, chain_id))
    }

    /// Best-effort `eth_chainId`; falls back to the configured default.
    async fn read_chain_id(&self, provider: &ProviderHandle) -> String {
        let inner = &self.inner;
        let read = with_timeout(
            inner.timer.as_ref(),
            inner.config.connect_timeout(),
            provider.request(ETH_CHAIN_ID, json!([])),
        )
        .await;

        let chain_id = match read {
            Ok(Ok(Value::String(raw))) => normalize_chain_id(&raw).ok(),
            Ok(Ok(other)) => {
                log::warn!("[wallet] unexpected eth_chainId response: {}", other);
                None
            }
            Ok(Err(err)) => {
                log::warn!("[wallet] eth_chainId failed: {}", err);
                None
            }
            Err(_) => {
                log::warn!("[wallet] eth_chainId timed out");
                None
            }
        };

        chain_id.unwrap_or_else(|| inner.config.default_chain_id.clone())
    }

    fn commit_connection(&self, descriptor: ProviderDescriptor, address: String, chain_id: String) {
        let inner = &self.inner;
        let kind = descriptor.kind;
        let state = WalletState::connected(address, chain_id, kind);

        if let Some(persisted) = state.to_persisted() {
            inner.persistence.save(&persisted);
        }
        inner.events.attach(&descriptor.handle, self.event_handler());
        *inner.active.borrow_mut() = Some(descriptor);
        inner.status.set(ConnectionStatus::Connected);

        log::info!(
            "[wallet] connected {} via {} on chain {}",
            state.address.as_deref().map(format_address).unwrap_or_default(),
            kind,
            state.chain_id.as_deref().unwrap_or_default()
        );
        self.replace_state(state);
    }

    fn fail_attempt(&self, generation: u64, mode: AttemptMode, err: WalletError) -> ConnectionResult {
        let inner = &self.inner;
        if !inner.is_current(generation) {
            log::debug!("[wallet] discarding result of superseded attempt: {}", err);
            return ConnectionResult::failed(ErrorKind::ConnectionAborted);
        }

        log::warn!("[wallet] connection failed: {}", err);
        // The extension may inject later in the page's life; keep the record.
        if matches!(mode, AttemptMode::Silent) && !matches!(err, WalletError::NoProvider) {
            inner.persistence.clear();
        }
        inner.active.borrow_mut().take();
        inner.status.set(ConnectionStatus::Disconnected);
        self.replace_state(WalletState::failed(err.to_string()));

        ConnectionResult::failed(err.kind())
    }

    fn finish_attempt(&self, generation: u64) {
        if self.inner.is_current(generation) {
            self.inner.in_flight.borrow_mut().take();
            self.inner.abort.borrow_mut().take();
        }
    }

    fn ensure_current(&self, generation: u64) -> Result<()> {
        if self.inner.is_current(generation) {
            Ok(())
        } else {
            Err(WalletError::ConnectionAborted)
        }
    }

    fn active_provider(&self) -> Option<ProviderHandle> {
        self.inner.active.borrow().as_ref().map(|d| d.handle.clone())
    }

    /// Provider listeners hold a weak reference so the extension never keeps
    /// the manager alive.
    fn event_handler(&self) -> EventListener {
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        Rc::new(move |event: ProviderEvent| {
            if let Some(inner) = weak.upgrade() {
                WalletManager { inner }.handle_provider_event(event);
            }
        })
    }

    fn handle_provider_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => {
                    log::info!("[wallet] wallet exposed no accounts, disconnecting");
                    self.disconnect();
                }
                Some(address) => {
                    let unchanged = self
                        .get_state()
                        .address
                        .is_some_and(|current| current.eq_ignore_ascii_case(&address));
                    if !self.is_connected() || unchanged {
                        return;
                    }
                    log::info!("[wallet] account changed to {}", format_address(&address));
                    self.update_state(|state| {
                        state.address = Some(address);
                        state.balance = None;
                    });
                    self.persist_current();
                }
            },
            ProviderEvent::ChainChanged(raw) => {
                if !self.is_connected() {
                    return;
                }
                let chain_id = normalize_chain_id(&raw).unwrap_or(raw);
                log::info!("[wallet] chain changed to {}", chain_id);
                self.update_state(|state| {
                    state.chain_id = Some(chain_id);
                    state.balance = None;
                });
                self.persist_current();
            }
            ProviderEvent::Disconnect => {
                log::info!("[wallet] provider disconnected");
                self.disconnect();
            }
        }
    }

    fn persist_current(&self) {
        if let Some(persisted) = self.get_state().to_persisted() {
            self.inner.persistence.save(&persisted);
        }
    }

    fn update_state(&self, apply: impl FnOnce(&mut WalletState)) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            apply(&mut state);
            state.clone()
        };
        self.notify(&snapshot);
    }

    fn replace_state(&self, next: WalletState) {
        *self.inner.state.borrow_mut() = next.clone();
        self.notify(&next);
    }

    fn notify(&self, snapshot: &WalletState) {
        let observers: Vec<StateObserver> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(snapshot);
        }
    }
}
