//! Test doubles: a scriptable EIP-1193 provider, a fake `window`, a broken
//! store and a tokio-backed timer.

use async_trait::async_trait;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::error::{ProviderRpcError, StorageError};
use crate::services::persistence::KeyValueStore;
use crate::services::provider::{
    Eip1193Provider, EventListener, ListenerId, ProviderEvent, ProviderEventKind, ProviderHandle,
};
use crate::services::registry::{InjectedEnvironment, InjectedEthereum};
use crate::services::timer::Timer;

/// Scripted answer to one request.
#[derive(Clone)]
pub(crate) enum MockResponse {
    Ok(Value),
    Err(ProviderRpcError),
    /// Never settles, like a popup the user walked away from.
    Never,
    Delayed(Duration, Result<Value, ProviderRpcError>),
}

impl MockResponse {
    pub fn ok(value: Value) -> Self {
        MockResponse::Ok(value)
    }

    pub fn err(code: i64, message: &str) -> Self {
        MockResponse::Err(ProviderRpcError::new(code, message))
    }

    pub fn delayed(millis: u64, value: Value) -> Self {
        MockResponse::Delayed(Duration::from_millis(millis), Ok(value))
    }
}

/// In-memory provider. Each method answers from its script; the last
/// scripted response repeats once the queue is down to one entry.
pub(crate) struct MockProvider {
    flags: HashSet<String>,
    scripts: RefCell<HashMap<String, VecDeque<MockResponse>>>,
    calls: RefCell<Vec<(String, Value)>>,
    listeners: RefCell<Vec<(ListenerId, ProviderEventKind, EventListener)>>,
    next_id: Cell<ListenerId>,
    outstanding: Cell<usize>,
    peak: Cell<usize>,
}

impl MockProvider {
    pub fn with_flags(flags: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            flags: flags.iter().map(|f| f.to_string()).collect(),
            scripts: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            outstanding: Cell::new(0),
            peak: Cell::new(0),
        })
    }

    pub fn metamask() -> Rc<Self> {
        Self::with_flags(&["isMetaMask"])
    }

    /// Answer every `method` call with `response`.
    pub fn respond(&self, method: &str, response: MockResponse) {
        self.respond_sequence(method, vec![response]);
    }

    /// Answer successive `method` calls in order.
    pub fn respond_sequence(&self, method: &str, responses: Vec<MockResponse>) {
        self.scripts
            .borrow_mut()
            .insert(method.to_string(), responses.into_iter().collect());
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|(m, _)| m == method).count()
    }

    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    /// Deliver `event` to the listeners registered for its kind.
    pub fn emit(&self, event: ProviderEvent) {
        let kind = event.kind();
        let listeners: Vec<EventListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(event.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Most requests ever pending at the same time.
    pub fn peak_outstanding(&self) -> usize {
        self.peak.get()
    }

    fn next_response(&self, method: &str) -> MockResponse {
        let mut scripts = self.scripts.borrow_mut();
        let unscripted = || MockResponse::err(-32601, &format!("method {} not scripted", method));

        match scripts.get_mut(method) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(unscripted),
            Some(queue) => queue.front().cloned().unwrap_or_else(unscripted),
            None => unscripted(),
        }
    }
}

struct OutstandingGuard<'a> {
    outstanding: &'a Cell<usize>,
}

impl<'a> OutstandingGuard<'a> {
    fn enter(outstanding: &'a Cell<usize>, peak: &Cell<usize>) -> Self {
        outstanding.set(outstanding.get() + 1);
        peak.set(peak.get().max(outstanding.get()));
        Self { outstanding }
    }
}

impl Drop for OutstandingGuard<'_> {
    fn drop(&mut self) {
        self.outstanding.set(self.outstanding.get() - 1);
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.calls.borrow_mut().push((method.to_string(), params));
        let response = self.next_response(method);
        let _guard = OutstandingGuard::enter(&self.outstanding, &self.peak);

        match response {
            MockResponse::Ok(value) => Ok(value),
            MockResponse::Err(err) => Err(err),
            MockResponse::Never => future::pending().await,
            MockResponse::Delayed(delay, result) => {
                tokio::time::sleep(delay).await;
                result
            }
        }
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    fn on(&self, event: ProviderEventKind, listener: EventListener) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, event, listener));
        id
    }

    fn remove_listener(&self, event: ProviderEventKind, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(listener_id, kind, _)| !(*listener_id == id && *kind == event));
    }
}

/// Fake page globals: an Ethereum slot plus named namespaces that can be
/// hidden and restored. Holds are counted per namespace like the page glue
/// does, so several resolvers can share one environment.
pub(crate) struct MockEnvironment {
    ethereum: RefCell<Option<InjectedEthereum>>,
    /// namespace -> outstanding conceal holds (visible at 0)
    namespaces: RefCell<HashMap<String, usize>>,
    conceal_calls: Cell<usize>,
    reveal_calls: Cell<usize>,
}

impl MockEnvironment {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            ethereum: RefCell::new(None),
            namespaces: RefCell::new(HashMap::new()),
            conceal_calls: Cell::new(0),
            reveal_calls: Cell::new(0),
        })
    }

    pub fn inject_single(&self, provider: Rc<MockProvider>) {
        let handle: ProviderHandle = provider;
        *self.ethereum.borrow_mut() = Some(InjectedEthereum::Single(handle));
    }

    pub fn inject_multiple(&self, providers: Vec<Rc<MockProvider>>) {
        let handles: Vec<ProviderHandle> = providers
            .into_iter()
            .map(|p| p as ProviderHandle)
            .collect();
        *self.ethereum.borrow_mut() = Some(InjectedEthereum::Multiple(handles));
    }

    pub fn clear(&self) {
        self.ethereum.borrow_mut().take();
    }

    pub fn add_namespace(&self, namespace: &str) {
        self.namespaces.borrow_mut().insert(namespace.to_string(), 0);
    }

    pub fn is_visible(&self, namespace: &str) -> bool {
        self.namespaces.borrow().get(namespace) == Some(&0)
    }

    pub fn conceal_calls(&self) -> usize {
        self.conceal_calls.get()
    }

    pub fn reveal_calls(&self) -> usize {
        self.reveal_calls.get()
    }
}

impl InjectedEnvironment for MockEnvironment {
    fn ethereum(&self) -> Option<InjectedEthereum> {
        self.ethereum.borrow().clone()
    }

    fn conceal(&self, namespace: &str) -> bool {
        match self.namespaces.borrow_mut().get_mut(namespace) {
            Some(holds) => {
                *holds += 1;
                if *holds == 1 {
                    self.conceal_calls.set(self.conceal_calls.get() + 1);
                }
                true
            }
            None => false,
        }
    }

    fn reveal(&self, namespace: &str) {
        if let Some(holds) = self.namespaces.borrow_mut().get_mut(namespace) {
            if *holds == 0 {
                return;
            }
            *holds -= 1;
            if *holds == 0 {
                self.reveal_calls.set(self.reveal_calls.get() + 1);
            }
        }
    }
}

/// Store whose every operation fails, like storage in a locked-down
/// private window.
pub(crate) struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError("storage disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError("storage disabled".to_string()))
    }
}

pub(crate) struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed_local()
    }
}
