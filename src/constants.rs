/// Uniswap Universal Router. Deployed at the same address on mainnet and
/// sepolia.
pub const UNIVERSAL_ROUTER_ADDRESS: &str = "0x3fC91A3afd70395Cd496C647d5a6CC9D4B2b7FAD";

/// Universal Router command byte for an exact-input V3 swap.
pub const V3_SWAP_EXACT_IN: u8 = 0x00;

/// Default pool fee tier (0.30%).
pub const DEFAULT_FEE_TIER: u32 = 3000;

/// Fixed gas limit used when estimation is unavailable.
pub const DEFAULT_GAS_LIMIT: u64 = 2_000_000;

/// Applied to the chain timestamp when the caller supplies no deadline.
pub const DEFAULT_DEADLINE_SECS: u64 = 30 * 60;

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko only maps contract addresses for mainnet.
pub const COINGECKO_PLATFORM: &str = "ethereum";

/// Well-known sepolia testnet tokens, checked before any network lookup.
pub const SEPOLIA_TOKENS: &[(&str, &str)] = &[
    ("WETH", "0xfFf9976782d46CC05630D1f6eBAb18b2324d6B14"),
    ("USDC", "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
    ("DAI", "0x68194a729C2450ad26072b3D33ADaCbcef39D574"),
    ("WBTC", "0xf864F011C5A97fD8Da79baEd78ba77b47112935a"),
];

/// Well-known mainnet tokens.
pub const MAINNET_TOKENS: &[(&str, &str)] = &[
    ("WETH", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
    ("USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
    ("USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7"),
    ("DAI", "0x6B175474E89094C44Da98b954EedeAC495271d0F"),
    ("WBTC", "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"),
    ("UNI", "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984"),
    ("LINK", "0x514910771AF9Ca656af840dff83E8264EcF986CA"),
];

/// The static token registry for a network. Unknown networks get an empty
/// registry, so every identifier falls through to the external lookup.
pub fn token_registry(network: &str) -> &'static [(&'static str, &'static str)] {
    match network {
        "sepolia" => SEPOLIA_TOKENS,
        "mainnet" => MAINNET_TOKENS,
        _ => &[],
    }
}

/// The canonical wrapped-native-asset (WETH) address for a network. Swaps
/// selling this token attach native value instead of pulling ERC-20 funds.
pub fn wrapped_native_address(network: &str) -> Option<&'static str> {
    token_registry(network)
        .iter()
        .find(|(symbol, _)| *symbol == "WETH")
        .map(|(_, address)| *address)
}
