pub mod wallet;

pub use wallet::{provide_wallet_context, use_wallet_context, WalletContext};
