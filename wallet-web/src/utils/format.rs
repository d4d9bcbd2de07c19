//! # Formatting Utilities for the Wallet Connector
//!
//! Display helpers for EVM addresses and native-currency balances.
//!
//! ## Functions
//!
//! - [`format_address`] - Shorten a `0x` address to `0x1234...abcd`
//! - [`wei_to_eth`] - Convert a hex wei quantity to a 4-decimal ETH string
//! - [`parse_hex_quantity`] - Parse an EIP-1193 hex quantity
//! - [`normalize_chain_id`] - Canonical lowercase hex chain id

use crate::error::{Result, WalletError};
use crate::utils::constants::{
    ADDRESS_PREFIX_LEN, ADDRESS_SUFFIX_LEN, ETH_DISPLAY_DECIMALS, WEI_PER_ETH,
};

/// Format an EVM address for display: first 6 characters (including `0x`),
/// `...`, last 4 characters.
///
/// Output length is 13 for every well-formed 20-byte address. Shorter
/// inputs are returned unchanged.
///
/// # Examples
///
/// ```rust
/// use carbon_wallet::utils::format::format_address;
///
/// let addr = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";
/// assert_eq!(format_address(addr), "0x71C7...976F");
/// ```
pub fn format_address(address: &str) -> String {
    shared::utils::format_address(address, ADDRESS_PREFIX_LEN, ADDRESS_SUFFIX_LEN)
}

/// Parse an EIP-1193 hex quantity (`"0x1bc16d674ec80000"`) into an integer.
///
/// `"0x"` and `"0x0"` are both zero.
pub fn parse_hex_quantity(value: &str) -> Result<u128> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| WalletError::UnknownProvider(format!("not a hex quantity: {}", value)))?;

    if digits.is_empty() {
        return Ok(0);
    }

    u128::from_str_radix(digits, 16)
        .map_err(|e| WalletError::UnknownProvider(format!("invalid hex quantity {}: {}", value, e)))
}

/// Convert a hex wei balance to ETH with 4 fixed decimals.
///
/// Integer arithmetic only; the fourth decimal is rounded half-up.
///
/// # Examples
///
/// ```rust
/// use carbon_wallet::utils::format::wei_to_eth;
///
/// assert_eq!(wei_to_eth("0xde0b6b3a7640000").unwrap(), "1.0000");
/// assert_eq!(wei_to_eth("0x0").unwrap(), "0.0000");
/// ```
pub fn wei_to_eth(wei_hex: &str) -> Result<String> {
    let wei = parse_hex_quantity(wei_hex)?;
    let unit = WEI_PER_ETH / 10u128.pow(ETH_DISPLAY_DECIMALS);
    let scale = 10u128.pow(ETH_DISPLAY_DECIMALS);

    let mut whole = wei / WEI_PER_ETH;
    let remainder = wei % WEI_PER_ETH;
    let mut fraction = (remainder + unit / 2) / unit;
    if fraction == scale {
        whole += 1;
        fraction = 0;
    }

    Ok(format!(
        "{}.{:0width$}",
        whole,
        fraction,
        width = ETH_DISPLAY_DECIMALS as usize
    ))
}

/// Canonical chain id: lowercase hex with `0x` prefix.
///
/// Accepts hex (`"0x89"`) or decimal (`"137"`).
pub fn normalize_chain_id(chain_id: &str) -> Result<String> {
    let trimmed = chain_id.trim();
    let value = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        parse_hex_quantity(trimmed).ok()
    } else {
        trimmed.parse::<u128>().ok()
    };

    match value {
        Some(id) if id > 0 => Ok(format!("0x{:x}", id)),
        _ => Err(WalletError::UnsupportedChain(format!("invalid chain id: {}", chain_id))),
    }
}
