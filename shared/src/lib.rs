//! # Shared Data Transfer Objects Library
//!
//! Types shared between the wallet connector and its front-ends.
//!
//! - **[`dto`]**: wallet state, connection outcomes and error kinds
//! - **[`utils`]**: display helpers ([`utils::format_address`])
//!
//! ## Wire Format
//!
//! DTOs serialize with `serde` using camelCase field names, the shape
//! JavaScript callers expect:
//!
//! ```rust
//! use shared::{WalletKind, WalletState};
//!
//! let state = WalletState::connected(
//!     "0x71c7656ec7ab88b098defb751b7401b5f6d8976f".to_string(),
//!     "0x89".to_string(),
//!     WalletKind::MetaMask,
//! );
//! assert!(state.is_connected);
//! assert_eq!(state.to_persisted().map(|p| p.chain_id), Some("0x89".to_string()));
//! ```

pub mod dto;
pub mod utils;

// Wildcard re-exports: shared is a DTO library and every export is public API
pub use dto::*;
pub use utils::*;
