//! # Provider Registry
//!
//! Finds injected wallet providers and hands out [`ProviderDescriptor`]s.
//!
//! Extensions compete for `window.ethereum`. When several are installed the
//! winner often exposes the others under `ethereum.providers`, so the
//! registry scans that array (best effort) and classifies each entry by its
//! marker flags. Without an explicit preference MetaMask is picked, since it
//! is the most broadly compatible.
//!
//! A missing wallet is the common case for first-time visitors, so lookups
//! return `Option` rather than an error.

use shared::WalletKind;
use std::rc::Rc;

use crate::services::provider::{ProviderDescriptor, ProviderHandle};

/// What the page currently has injected at the Ethereum namespace.
#[derive(Clone)]
pub enum InjectedEthereum {
    /// A single provider object.
    Single(ProviderHandle),
    /// Several extensions, listed in `ethereum.providers`.
    Multiple(Vec<ProviderHandle>),
}

/// The page's injected globals, as seen by the connector.
///
/// Only the registry reads providers through this trait and only the
/// conflict resolver conceals namespaces; nothing else touches `window`.
pub trait InjectedEnvironment {
    /// Current contents of the Ethereum namespace, if any.
    fn ethereum(&self) -> Option<InjectedEthereum>;

    /// Hide `namespace` behind an accessor returning `undefined`.
    ///
    /// Returns `false` when the namespace does not exist or cannot be
    /// reconfigured; nothing was changed in that case.
    fn conceal(&self, namespace: &str) -> bool;

    /// Release one hold taken by [`InjectedEnvironment::conceal`]. The
    /// namespace is restored once every hold on the page is released, even
    /// when several managers conceal the same global.
    fn reveal(&self, namespace: &str);
}

/// Resolves injected providers into descriptors.
#[derive(Clone)]
pub struct ProviderRegistry {
    env: Rc<dyn InjectedEnvironment>,
}

impl ProviderRegistry {
    pub fn new(env: Rc<dyn InjectedEnvironment>) -> Self {
        Self { env }
    }

    /// Probe the environment. Recomputed on every call: extensions may
    /// finish injecting after the page loaded.
    pub fn list_providers(&self) -> Vec<ProviderDescriptor> {
        match self.env.ethereum() {
            None => Vec::new(),
            Some(InjectedEthereum::Single(handle)) => vec![ProviderDescriptor::new(handle)],
            Some(InjectedEthereum::Multiple(handles)) => {
                handles.into_iter().map(ProviderDescriptor::new).collect()
            }
        }
    }

    /// Pick a provider. An explicit `preferred` kind must be present;
    /// otherwise MetaMask wins, then the first provider found.
    pub fn resolve(&self, preferred: Option<WalletKind>) -> Option<ProviderDescriptor> {
        let providers = self.list_providers();
        log::debug!(
            "[registry] found {} provider(s): {:?}",
            providers.len(),
            providers.iter().map(|p| p.kind).collect::<Vec<_>>()
        );

        match preferred {
            Some(kind) => providers.into_iter().find(|p| p.kind == kind),
            None => {
                let metamask = providers.iter().position(|p| p.kind == WalletKind::MetaMask);
                match metamask {
                    Some(index) => providers.into_iter().nth(index),
                    None => providers.into_iter().next(),
                }
            }
        }
    }
}
