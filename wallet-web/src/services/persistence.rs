//! # Connection Persistence
//!
//! Mirrors `{connected, address, chainId}` into a string key-value store so a
//! page reload can reconnect silently. Persistence is a convenience: storage
//! failures (quota, private mode, disabled storage) are logged and swallowed.
//!
//! ## Storage Layout
//!
//! | Key | Value |
//! |---|---|
//! | `<prefix>.walletConnected` | `"true"` |
//! | `<prefix>.walletAddress` | `0x…` address |
//! | `<prefix>.walletChainId` | hex chain id |

use shared::PersistedConnection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;
use crate::utils::constants::{KEY_ADDRESS, KEY_CHAIN_ID, KEY_CONNECTED};

/// String key-value store (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store, used when no browser storage is reachable.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

pub struct PersistenceAdapter {
    store: Rc<dyn KeyValueStore>,
    connected_key: String,
    address_key: String,
    chain_id_key: String,
}

impl PersistenceAdapter {
    pub fn new(store: Rc<dyn KeyValueStore>, prefix: &str) -> Self {
        Self {
            store,
            connected_key: format!("{}.{}", prefix, KEY_CONNECTED),
            address_key: format!("{}.{}", prefix, KEY_ADDRESS),
            chain_id_key: format!("{}.{}", prefix, KEY_CHAIN_ID),
        }
    }

    pub fn save(&self, connection: &PersistedConnection) {
        let result = self
            .store
            .set(&self.address_key, &connection.address)
            .and_then(|_| self.store.set(&self.chain_id_key, &connection.chain_id))
            .and_then(|_| self.store.set(&self.connected_key, bool_str(connection.connected)));

        if let Err(e) = result {
            log::warn!("[storage] failed to persist wallet connection: {}", e);
        }
    }

    /// Read the persisted connection. Partial or malformed records read as
    /// `None`.
    pub fn load(&self) -> Option<PersistedConnection> {
        let read = |key: &str| match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("[storage] failed to read {}: {}", key, e);
                None
            }
        };

        let connected = read(&self.connected_key)? == "true";
        let address = read(&self.address_key).filter(|a| !a.is_empty())?;
        let chain_id = read(&self.chain_id_key).filter(|c| !c.is_empty())?;

        if !connected {
            return None;
        }

        Some(PersistedConnection {
            connected,
            address,
            chain_id,
        })
    }

    pub fn clear(&self) {
        for key in [&self.connected_key, &self.address_key, &self.chain_id_key] {
            if let Err(e) = self.store.remove(key) {
                log::warn!("[storage] failed to remove {}: {}", key, e);
            }
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
