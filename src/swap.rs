use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, TxHash, U256};
use tokio::sync::Mutex;
use tracing::info;

use crate::configuration::Configuration;
use crate::constants::{wrapped_native_address, DEFAULT_DEADLINE_SECS, V3_SWAP_EXACT_IN};
use crate::encoder;
use crate::error::SwapError;
use crate::ethereum_client::EthereumClient;
use crate::resolver::TokenResolver;
use crate::types::{ResolvedSwap, SwapReceipt, SwapRequest};
use crate::units;

/// The swap pipeline: resolution, normalization, encoding, assembly,
/// signing, broadcast. Strictly sequential; each stage consumes the
/// previous stage's output. Once a transaction is broadcast there is no
/// cancelling it.
pub struct SwapPipeline {
    client: EthereumClient,
    resolver: TokenResolver,
    router: Address,
    wrapped_native: Option<Address>,
    fee_tier: u32,
    /// Serializes the window from nonce read to broadcast. Two assemblies
    /// racing for the same sender would observe the same nonce and one
    /// broadcast would be rejected.
    submit_lock: Mutex<()>,
}

impl SwapPipeline {
    pub fn new(
        config: &Configuration,
        client: EthereumClient,
        resolver: TokenResolver,
    ) -> anyhow::Result<Self> {
        let router = Address::from_str(&config.router_address)
            .context("router address in configuration is invalid")?;

        let wrapped_native = match wrapped_native_address(&config.network) {
            Some(address) => Some(
                Address::from_str(address)
                    .context("wrapped native address in registry is invalid")?,
            ),
            None => None,
        };

        Ok(Self {
            client,
            resolver,
            router,
            wrapped_native,
            fee_tier: config.fee_tier,
            submit_lock: Mutex::new(()),
        })
    }

    /// Resolve identifiers to addresses and scale amounts to base units
    /// using each token's on-chain decimals. Pure besides the resolver
    /// fallback and the RPC reads.
    pub async fn resolve_request(&self, request: &SwapRequest) -> Result<ResolvedSwap, SwapError> {
        let token_in = self.resolver.resolve(&request.token_in).await?;
        let token_out = self.resolver.resolve(&request.token_out).await?;

        let decimals_in = self.client.get_token_decimals(token_in).await?;
        let decimals_out = self.client.get_token_decimals(token_out).await?;

        let amount_in = units::to_base_units(request.amount_in, decimals_in)?;
        let min_amount_out = units::to_base_units(request.min_amount_out, decimals_out)?;

        let now = self.client.get_current_timestamp().await?;
        let deadline = effective_deadline(request.deadline, now, DEFAULT_DEADLINE_SECS)?;

        Ok(ResolvedSwap {
            token_in,
            token_out,
            amount_in,
            min_amount_out,
            deadline,
        })
    }

    /// Run the full pipeline and return the broadcast transaction hash.
    pub async fn execute(
        &self,
        request: &SwapRequest,
        wallet: &LocalWallet,
    ) -> Result<TxHash, SwapError> {
        info!(
            "starting swap: {} {} -> {}",
            request.amount_in, request.token_in, request.token_out
        );

        let resolved = self.resolve_request(request).await?;

        let recipient = wallet.address();
        let (value, payer_is_user) =
            native_value(resolved.token_in, self.wrapped_native, resolved.amount_in);

        let path = encoder::encode_path(resolved.token_in, self.fee_tier, resolved.token_out);
        let swap_input = encoder::encode_v3_swap_exact_in(
            recipient,
            resolved.amount_in,
            resolved.min_amount_out,
            &path,
            payer_is_user,
        );
        let calldata = encoder::encode_execute(V3_SWAP_EXACT_IN, &swap_input, resolved.deadline)?;

        let _submit_guard = self.submit_lock.lock().await;

        let tx = self
            .client
            .assemble(recipient, self.router, value, calldata)
            .await?;
        let tx_hash = self.client.submit(tx, wallet.clone()).await?;

        info!("transaction sent with hash {:?}", tx_hash);

        Ok(tx_hash)
    }

    /// Block until the transaction is mined or `timeout` elapses.
    pub async fn await_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<SwapReceipt, SwapError> {
        self.client.await_receipt(tx_hash, timeout).await
    }
}

/// Transaction value and payer flag for the input token. Selling the
/// wrapped native asset attaches the full input amount as value and
/// bypasses the payer-is-user transfer path; every other token transfers
/// from the sender's ERC-20 balance.
fn native_value(
    token_in: Address,
    wrapped_native: Option<Address>,
    amount_in: U256,
) -> (U256, bool) {
    if Some(token_in) == wrapped_native {
        (amount_in, false)
    } else {
        (U256::zero(), true)
    }
}

/// Deadline for the router's block-time validation. `now` is the chain
/// timestamp, never the local clock. Caller-supplied deadlines must be
/// strictly in the future.
fn effective_deadline(
    requested: Option<u64>,
    now: u64,
    default_delta_secs: u64,
) -> Result<u64, SwapError> {
    match requested {
        Some(deadline) if deadline <= now => Err(SwapError::DeadlineExpired { deadline, now }),
        Some(deadline) => Ok(deadline),
        None => Ok(now + default_delta_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn selling_the_wrapped_native_asset_attaches_value() {
        let weth = address(0xaa);
        let amount = U256::from(1_000_000_000_000_000_000u128);

        let (value, payer_is_user) = native_value(weth, Some(weth), amount);

        assert_eq!(value, amount);
        assert!(!payer_is_user);
    }

    #[test]
    fn selling_an_erc20_sends_no_value() {
        let usdc = address(0x01);
        let weth = address(0xaa);

        let (value, payer_is_user) = native_value(usdc, Some(weth), U256::from(10_500_000u64));

        assert_eq!(value, U256::zero());
        assert!(payer_is_user);
    }

    #[test]
    fn networks_without_wrapped_native_never_attach_value() {
        let token = address(0x01);

        let (value, payer_is_user) = native_value(token, None, U256::from(1u64));

        assert_eq!(value, U256::zero());
        assert!(payer_is_user);
    }

    #[test]
    fn missing_deadline_defaults_to_chain_time_plus_delta() {
        assert_eq!(effective_deadline(None, 1_700_000_000, 1800).unwrap(), 1_700_001_800);
    }

    #[test]
    fn future_deadlines_pass_through() {
        assert_eq!(
            effective_deadline(Some(1_700_000_001), 1_700_000_000, 1800).unwrap(),
            1_700_000_001
        );
    }

    #[test]
    fn stale_deadlines_fail_before_assembly() {
        let err = effective_deadline(Some(1_700_000_000), 1_700_000_000, 1800).unwrap_err();
        assert!(matches!(
            err,
            SwapError::DeadlineExpired {
                deadline: 1_700_000_000,
                now: 1_700_000_000
            }
        ));
    }
}
