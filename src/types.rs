use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use serde::Deserialize;

/// A swap as requested by the caller: free-form token identifiers and
/// human-readable decimal amounts. Consumed exactly once by the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwapRequest {
    /// Name, symbol, or 20-byte hex address of the token to sell.
    pub token_in: String,
    /// Name, symbol, or 20-byte hex address of the token to buy.
    pub token_out: String,
    pub amount_in: Decimal,
    pub min_amount_out: Decimal,
    /// Unix seconds. Defaults to chain timestamp + 30 minutes when absent.
    #[serde(default)]
    pub deadline: Option<u64>,
}

/// A [`SwapRequest`] after address resolution and decimal normalization.
/// Amounts are base units scaled by each token's on-chain decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSwap {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub deadline: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStatus {
    Success,
    Reverted,
}

/// Outcome of confirmation polling for a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReceipt {
    pub status: SwapStatus,
    pub block_number: u64,
}
