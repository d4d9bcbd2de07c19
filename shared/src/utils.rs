//! # Shared Utility Functions
//!
//! ```rust
//! use shared::utils::format_address;
//!
//! let address = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";
//! assert_eq!(format_address(address, 6, 4), "0x71C7...976F");
//! ```

/// Shorten an address to its first `prefix_len` and last `suffix_len`
/// characters joined by `...`.
///
/// Addresses no longer than `prefix_len + suffix_len` come back unchanged.
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let len = address.chars().count();
    if len <= prefix_len + suffix_len {
        return address.to_string();
    }

    let prefix: String = address.chars().take(prefix_len).collect();
    let suffix: String = address.chars().skip(len - suffix_len).collect();

    format!("{}...{}", prefix, suffix)
}
