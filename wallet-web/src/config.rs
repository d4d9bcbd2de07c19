//! # Connector Configuration
//!
//! [`WalletConfig`] holds the tunables of the connector: timeouts, the
//! storage key prefix, which competing globals to hide during account
//! requests, and the chains the wallet may be asked to add.
//!
//! Every field has a default, so hosts only pass what they override. From
//! JavaScript the config is a plain object with camelCase keys:
//!
//! ```text
//! { connectTimeoutMs: 15000, competingNamespaces: ["solana", "phantom"] }
//! ```
//!
//! Call [`WalletConfig::validate`] before handing the config to the manager;
//! [`crate::WalletManager::new`] goes through [`WalletConfig::normalized`],
//! which validates and rewrites every chain id to canonical lowercase hex.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::constants::{
    CONFLICT_GRACE_MS, CONNECT_TIMEOUT_MS, MAINNET_CHAIN_ID, POLYGON_AMOY_CHAIN_ID,
    POLYGON_CHAIN_ID, SEPOLIA_CHAIN_ID, SOLANA_NAMESPACE, STORAGE_PREFIX,
};
use crate::utils::format::normalize_chain_id;

/// Native currency of a chain, as `wallet_addEthereumChain` expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Chain parameters passed to `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl ChainDescriptor {
    fn new(chain_id: &str, chain_name: &str, currency: (&str, &str), rpc: &str, explorer: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            chain_name: chain_name.to_string(),
            native_currency: NativeCurrency {
                name: currency.0.to_string(),
                symbol: currency.1.to_string(),
                decimals: 18,
            },
            rpc_urls: vec![rpc.to_string()],
            block_explorer_urls: vec![explorer.to_string()],
        }
    }
}

/// Chains the connector knows how to add out of the box.
pub fn default_chains() -> Vec<ChainDescriptor> {
    vec![
        ChainDescriptor::new(
            MAINNET_CHAIN_ID,
            "Ethereum Mainnet",
            ("Ether", "ETH"),
            "https://cloudflare-eth.com",
            "https://etherscan.io",
        ),
        ChainDescriptor::new(
            SEPOLIA_CHAIN_ID,
            "Sepolia",
            ("Sepolia Ether", "ETH"),
            "https://rpc.sepolia.org",
            "https://sepolia.etherscan.io",
        ),
        ChainDescriptor::new(
            POLYGON_CHAIN_ID,
            "Polygon Mainnet",
            ("POL", "POL"),
            "https://polygon-rpc.com",
            "https://polygonscan.com",
        ),
        ChainDescriptor::new(
            POLYGON_AMOY_CHAIN_ID,
            "Polygon Amoy Testnet",
            ("POL", "POL"),
            "https://rpc-amoy.polygon.technology",
            "https://amoy.polygonscan.com",
        ),
    ]
}

/// Wallet connector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConfig {
    /// Upper bound for the account request round trip.
    pub connect_timeout_ms: u64,

    /// How long competing namespaces may stay hidden.
    pub conflict_grace_ms: u64,

    /// Chain id assumed when `eth_chainId` cannot be read.
    pub default_chain_id: String,

    /// Namespace for the local storage keys.
    pub storage_prefix: String,

    /// Injected globals concealed while an Ethereum account request is in
    /// flight (e.g. `solana`).
    pub competing_namespaces: Vec<String>,

    /// Chains offered to `wallet_addEthereumChain` when a switch target is
    /// unknown to the wallet.
    pub chains: Vec<ChainDescriptor>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            conflict_grace_ms: CONFLICT_GRACE_MS,
            default_chain_id: MAINNET_CHAIN_ID.to_string(),
            storage_prefix: STORAGE_PREFIX.to_string(),
            competing_namespaces: vec![SOLANA_NAMESPACE.to_string()],
            chains: default_chains(),
        }
    }
}

impl WalletConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn conflict_grace(&self) -> Duration {
        Duration::from_millis(self.conflict_grace_ms)
    }

    /// Look up the add-chain descriptor for a chain id, hex or decimal.
    pub fn chain(&self, chain_id: &str) -> Option<&ChainDescriptor> {
        let target = normalize_chain_id(chain_id).ok()?;
        self.chains
            .iter()
            .find(|chain| normalize_chain_id(&chain.chain_id).ok().as_deref() == Some(target.as_str()))
    }

    /// Validate, then rewrite `default_chain_id` and every descriptor's
    /// `chain_id` as lowercase hex. `wallet_addEthereumChain` only takes hex.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.validate()?;
        self.default_chain_id = normalize_chain_id(&self.default_chain_id).map_err(|e| e.to_string())?;
        for chain in &mut self.chains {
            chain.chain_id = normalize_chain_id(&chain.chain_id).map_err(|e| e.to_string())?;
        }
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout_ms == 0 {
            return Err("connectTimeoutMs must be greater than 0".to_string());
        }

        if self.conflict_grace_ms == 0 {
            return Err("conflictGraceMs must be greater than 0".to_string());
        }

        normalize_chain_id(&self.default_chain_id)
            .map_err(|_| format!("defaultChainId is not a valid chain id: {}", self.default_chain_id))?;

        if self.storage_prefix.trim().is_empty() {
            return Err("storagePrefix must not be empty".to_string());
        }

        for chain in &self.chains {
            normalize_chain_id(&chain.chain_id)
                .map_err(|_| format!("chain {} has an invalid chainId", chain.chain_name))?;
            if chain.rpc_urls.is_empty() {
                return Err(format!("chain {} needs at least one RPC URL", chain.chain_name));
            }
        }

        Ok(())
    }
}
