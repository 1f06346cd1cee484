use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use ethers::prelude::*;
use tracing::{debug, info, warn};

use crate::configuration::Configuration;
use crate::error::SwapError;
use crate::types::{SwapReceipt, SwapStatus};

abigen!(RawErc20, "./abis/ERC20.json");

pub struct EthereumClient {
    inner_client: Provider<Http>,
    chain_id: u64,
    gas_limit: U256,
    poll_interval: Duration,
}

impl EthereumClient {
    pub async fn new(config: &Configuration) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.node_url.as_str())
            .context("failed to construct http provider")?;

        let chain_id = provider
            .get_chainid()
            .await
            .context("failed to read chain id from node")?
            .as_u64();

        info!("connected to {} (chain id {})", config.network, chain_id);

        Ok(Self {
            inner_client: provider,
            chain_id,
            gas_limit: U256::from(config.gas_limit),
            poll_interval: Duration::from_secs(config.polling_frequency_secs),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Decimal precision as declared by the token contract. The on-chain
    /// value is the source of truth; decimals are never hard-coded.
    pub async fn get_token_decimals(&self, token: Address) -> Result<u8> {
        let erc20 = RawErc20::new(token, Arc::new(self.inner_client.clone()));
        erc20
            .decimals()
            .call()
            .await
            .context(format!("failed to read decimals() of token {:?}", token))
    }

    /// Timestamp of the latest block. Deadlines are computed against chain
    /// time, not the local clock, to stay consistent with the router's
    /// block-time validation.
    pub async fn get_current_timestamp(&self) -> Result<u64> {
        Ok(self
            .inner_client
            .get_block(BlockNumber::Latest)
            .await?
            .ok_or_else(|| anyhow!("error fetching latest block"))?
            .timestamp
            .as_u64())
    }

    /// Build the unsigned swap transaction. Nonce and gas price are read
    /// from the node on every call; a stale nonce gets the broadcast
    /// rejected, so nothing is cached across attempts.
    pub async fn assemble(
        &self,
        sender: Address,
        router: Address,
        value: U256,
        calldata: Bytes,
    ) -> Result<TransactionRequest> {
        let nonce = self
            .inner_client
            .get_transaction_count(sender, None)
            .await
            .context("failed to read account nonce")?;

        let gas_price = self
            .inner_client
            .get_gas_price()
            .await
            .context("failed to read gas price")?;

        debug!(
            "assembling transaction: nonce {}, gas price {}, value {}",
            nonce, gas_price, value
        );

        let tx = TransactionRequest::new()
            .from(sender)
            .to(router)
            .nonce(nonce)
            .gas(self.gas_limit)
            .gas_price(gas_price)
            .value(value)
            .data(calldata)
            .chain_id(self.chain_id);

        // Estimation failure is non-fatal: keep the fixed limit.
        match self.inner_client.estimate_gas(&tx.clone().into()).await {
            Ok(estimate) if estimate < self.gas_limit => Ok(tx.gas(estimate * 12u64 / 10u64)),
            Ok(_) => Ok(tx),
            Err(err) => {
                warn!(
                    "gas estimation failed, keeping fixed limit {}: {:?}",
                    self.gas_limit, err
                );
                Ok(tx)
            }
        }
    }

    /// Sign with the supplied credential and broadcast. The wallet lives
    /// only for the duration of this call and is never logged.
    pub async fn submit(
        &self,
        tx: TransactionRequest,
        wallet: LocalWallet,
    ) -> Result<TxHash, SwapError> {
        let wallet = wallet.with_chain_id(self.chain_id);
        let signer_client = SignerMiddleware::new(self.inner_client.clone(), wallet);

        let pending_tx = signer_client
            .send_transaction(tx, None)
            .await
            .map_err(|err| classify_submit_error(&err.to_string()))?;

        Ok(*pending_tx)
    }

    /// Poll for the receipt until it appears or `timeout` elapses. A
    /// timeout does not mean the transaction failed; it may still be
    /// pending in the mempool.
    pub async fn await_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<SwapReceipt, SwapError> {
        let started_at = Instant::now();

        loop {
            let maybe_receipt = self
                .inner_client
                .get_transaction_receipt(tx_hash)
                .await
                .context("failed to poll for transaction receipt")?;

            if let Some(receipt) = maybe_receipt {
                let status = match receipt.status {
                    Some(code) if code == U64::one() => SwapStatus::Success,
                    _ => SwapStatus::Reverted,
                };
                let block_number = receipt
                    .block_number
                    .ok_or_else(|| anyhow!("receipt for {:?} is missing a block number", tx_hash))?
                    .as_u64();

                return Ok(SwapReceipt {
                    status,
                    block_number,
                });
            }

            if started_at.elapsed() >= timeout {
                return Err(SwapError::Timeout { tx_hash, timeout });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Distinguish node-validated rejections from transport failures. Rejections
/// must not be blindly retried: re-broadcasting after "nonce too low"
/// without a fresh nonce read can double-submit.
fn classify_submit_error(message: &str) -> SwapError {
    const REJECTIONS: &[&str] = &[
        "nonce too low",
        "insufficient funds",
        "replacement transaction underpriced",
        "already known",
        "execution reverted",
    ];

    let lowered = message.to_lowercase();
    if REJECTIONS.iter().any(|needle| lowered.contains(needle)) {
        SwapError::Rejected {
            reason: message.to_string(),
        }
    } else {
        SwapError::Broadcast(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_conflicts_classify_as_rejected() {
        let err = classify_submit_error("(code: -32000, message: nonce too low, data: None)");
        assert!(matches!(err, SwapError::Rejected { .. }));
    }

    #[test]
    fn insufficient_funds_classify_as_rejected() {
        let err = classify_submit_error(
            "(code: -32000, message: Insufficient funds for gas * price + value, data: None)",
        );
        assert!(matches!(err, SwapError::Rejected { .. }));
    }

    #[test]
    fn transport_failures_classify_as_broadcast() {
        let err = classify_submit_error("error sending request for url (http://localhost:8545/)");
        assert!(matches!(err, SwapError::Broadcast(_)));
    }
}
