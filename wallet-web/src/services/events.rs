//! # Event Bridge
//!
//! Subscribes to provider-emitted events (`accountsChanged`, `chainChanged`,
//! `disconnect`) and forwards them to a single handler owned by the wallet
//! manager. Subscriptions are handles that remove their provider listener
//! when dropped, so teardown happens on every path.

use std::cell::RefCell;

use crate::services::provider::{EventListener, ListenerId, ProviderEventKind, ProviderHandle};

/// One registered provider listener. Removing happens on drop.
pub struct Subscription {
    provider: ProviderHandle,
    event: ProviderEventKind,
    id: ListenerId,
}

impl Subscription {
    pub fn new(provider: ProviderHandle, event: ProviderEventKind, listener: EventListener) -> Self {
        let id = provider.on(event, listener);
        Self { provider, event, id }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.provider.remove_listener(self.event, self.id);
    }
}

#[derive(Default)]
pub struct EventBridge {
    subscriptions: RefCell<Vec<Subscription>>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to every provider event. Replaces any previous
    /// attachment.
    pub fn attach(&self, provider: &ProviderHandle, handler: EventListener) {
        self.detach_all();

        let subscriptions: Vec<Subscription> = ProviderEventKind::ALL
            .iter()
            .map(|event| Subscription::new(provider.clone(), *event, handler.clone()))
            .collect();

        log::debug!("[events] attached {} provider listeners", subscriptions.len());
        *self.subscriptions.borrow_mut() = subscriptions;
    }

    /// Remove the listeners registered on `provider`. Safe to call when
    /// nothing is attached.
    pub fn detach(&self, provider: &ProviderHandle) {
        let removed: Vec<Subscription> = {
            let mut subscriptions = self.subscriptions.borrow_mut();
            let (removed, kept): (Vec<Subscription>, Vec<Subscription>) = std::mem::take(&mut *subscriptions)
                .into_iter()
                .partition(|s| std::rc::Rc::ptr_eq(&s.provider, provider));
            *subscriptions = kept;
            removed
        };

        if !removed.is_empty() {
            log::debug!("[events] detached {} provider listeners", removed.len());
        }
    }

    pub fn detach_all(&self) {
        let removed = std::mem::take(&mut *self.subscriptions.borrow_mut());
        if !removed.is_empty() {
            log::debug!("[events] detached {} provider listeners", removed.len());
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.borrow().is_empty()
    }
}
