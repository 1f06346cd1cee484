use std::time::Duration;

use ethers::types::TxHash;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error kinds surfaced at the pipeline boundary. Callers can match on the
/// kind to tell retryable conditions from fatal ones without parsing
/// message text.
#[derive(Debug, Error)]
pub enum SwapError {
    /// The identifier matched neither an address, the local registry, nor
    /// the external lookup for the active network.
    #[error("could not find a contract address for token `{identifier}` on {network}")]
    NotFound { identifier: String, network: String },

    /// The amount cannot be represented exactly at the token's decimal
    /// scale. Never truncated silently.
    #[error("amount {amount} cannot be represented exactly with {decimals} decimals")]
    Precision { amount: Decimal, decimals: u8 },

    /// Caller-supplied deadline is not in the future relative to the chain
    /// timestamp read at assembly time.
    #[error("deadline {deadline} is not later than the current chain timestamp {now}")]
    DeadlineExpired { deadline: u64, now: u64 },

    /// The node validated and rejected the transaction (insufficient funds,
    /// nonce conflict, revert). Not retried automatically: re-submission
    /// requires a fresh nonce read and a new decision by the caller.
    #[error("node rejected the transaction: {reason}")]
    Rejected { reason: String },

    /// Network or node failure while submitting. The transaction may or may
    /// not have reached the mempool.
    #[error("failed to broadcast the transaction: {0}")]
    Broadcast(String),

    /// No receipt within the polling bound. The transaction may still be
    /// pending; absence of a receipt is not failure.
    #[error("no receipt for {tx_hash:?} after {timeout:?}; the transaction may still be pending")]
    Timeout { tx_hash: TxHash, timeout: Duration },

    /// RPC reads, encoding, or other plumbing failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
