//! Wallet connector constants

// Timing
pub const CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const CONFLICT_GRACE_MS: u64 = 1_000;

// Chains (hex chain ids, lowercase)
pub const MAINNET_CHAIN_ID: &str = "0x1";
pub const SEPOLIA_CHAIN_ID: &str = "0xaa36a7";
pub const POLYGON_CHAIN_ID: &str = "0x89";
pub const POLYGON_AMOY_CHAIN_ID: &str = "0x13882";

// EIP-1193 methods
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const WALLET_SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
pub const WALLET_ADD_CHAIN: &str = "wallet_addEthereumChain";

// Provider error codes
pub const USER_REJECTED_CODE: i64 = 4001;
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
pub const REQUEST_PENDING_CODE: i64 = -32002;
pub const INTERNAL_ERROR_CODE: i64 = -32603;

// Injected provider marker flags
pub const FLAG_METAMASK: &str = "isMetaMask";
pub const FLAG_COINBASE: &str = "isCoinbaseWallet";
pub const FLAG_PHANTOM: &str = "isPhantom";

// Competing globals hidden during account requests
pub const SOLANA_NAMESPACE: &str = "solana";

// Local storage
pub const STORAGE_PREFIX: &str = "bluecarbon";
pub const KEY_CONNECTED: &str = "walletConnected";
pub const KEY_ADDRESS: &str = "walletAddress";
pub const KEY_CHAIN_ID: &str = "walletChainId";

// Display
pub const ADDRESS_PREFIX_LEN: usize = 6;
pub const ADDRESS_SUFFIX_LEN: usize = 4;
pub const ETH_DISPLAY_DECIMALS: u32 = 4;
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;
