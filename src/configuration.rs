use anyhow::{anyhow, Context, Result};
use std::env;
use tracing::debug;
use url::Url;

use crate::constants::{DEFAULT_FEE_TIER, DEFAULT_GAS_LIMIT, UNIVERSAL_ROUTER_ADDRESS};

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Resolved JSON-RPC endpoint, from NODE_BASE_URL or built from
    /// INFURA_API_KEY and the network name.
    pub node_url: String,
    pub network: String, // whatever infura accepts as a network e.g., 'mainnet' or 'sepolia'
    pub router_address: String,
    pub fee_tier: u32,
    pub gas_limit: u64,
    pub polling_frequency_secs: u64,
    pub confirmation_timeout_secs: u64,
    pub coingecko_api_key: Option<String>,
}

impl Configuration {
    pub fn get_from_environment() -> Result<Self> {
        let infura_api_key = collect_optional_environment_variable("INFURA_API_KEY")?;
        let node_base_url = collect_optional_environment_variable("NODE_BASE_URL")?;

        let network =
            collect_optional_environment_variable("SWAP_NETWORK")?.unwrap_or("sepolia".to_string());

        let node_url = match (node_base_url, infura_api_key) {
            (Some(node_base_url), _) => node_base_url,
            (None, Some(infura_api_key)) => {
                format!("https://{}.infura.io/v3/{}", network, infura_api_key)
            }
            (None, None) => {
                return Err(anyhow!(
                    "either `NODE_BASE_URL` or `INFURA_API_KEY` must be set"
                ))
            }
        };
        Url::parse(&node_url).context("node url is not a valid url")?;

        let router_address = collect_optional_environment_variable("ROUTER_ADDRESS")?
            .unwrap_or(UNIVERSAL_ROUTER_ADDRESS.to_string());

        let fee_tier = collect_optional_environment_variable("SWAP_FEE_TIER")?
            .map(|var| var.parse::<u32>())
            .transpose()?
            .unwrap_or(DEFAULT_FEE_TIER);

        let gas_limit = collect_optional_environment_variable("SWAP_GAS_LIMIT")?
            .map(|var| var.parse::<u64>())
            .transpose()?
            .unwrap_or(DEFAULT_GAS_LIMIT);

        let polling_frequency_secs =
            collect_optional_environment_variable("POLLING_FREQUENCY_SECS")?
                .map(|var| var.parse::<u64>())
                .transpose()?
                .unwrap_or(5);

        let confirmation_timeout_secs =
            collect_optional_environment_variable("CONFIRMATION_TIMEOUT_SECS")?
                .map(|var| var.parse::<u64>())
                .transpose()?
                .unwrap_or(300);

        let coingecko_api_key = collect_optional_environment_variable("COINGECKO_DEMO_API_KEY")?;

        Ok(Self {
            node_url,
            network,
            router_address,
            fee_tier,
            gas_limit,
            polling_frequency_secs,
            confirmation_timeout_secs,
            coingecko_api_key,
        })
    }
}

fn collect_optional_environment_variable(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            debug!(
                "environment variable {} not set but it wasn't required",
                key
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config() {
        setup_env_vars(Some("http://localhost:8545"), None, None);
        let config = Configuration::get_from_environment().expect("failed to get");
        assert_eq!(config.node_url, "http://localhost:8545");
        assert_eq!(config.network, "sepolia");
        assert_eq!(config.fee_tier, DEFAULT_FEE_TIER);
        assert_eq!(config.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(config.router_address, UNIVERSAL_ROUTER_ADDRESS);

        setup_env_vars(None, Some("abc123"), Some("mainnet"));
        let config = Configuration::get_from_environment().expect("failed to get");
        assert_eq!(config.node_url, "https://mainnet.infura.io/v3/abc123");
        assert_eq!(config.network, "mainnet");

        setup_env_vars(None, None, Some("mainnet"));
        assert!(Configuration::get_from_environment().is_err());

        setup_env_vars(Some("not a url"), None, None);
        assert!(Configuration::get_from_environment().is_err());

        setup_env_vars(Some("http://localhost:8545"), None, None);
        env::set_var("SWAP_FEE_TIER", "500");
        env::set_var("SWAP_GAS_LIMIT", "750000");
        let config = Configuration::get_from_environment().expect("failed to get");
        assert_eq!(config.fee_tier, 500);
        assert_eq!(config.gas_limit, 750_000);
        env::remove_var("SWAP_FEE_TIER");
        env::remove_var("SWAP_GAS_LIMIT");
    }

    fn setup_env_vars(
        node_base_url: Option<&str>,
        infura_api_key: Option<&str>,
        network: Option<&str>,
    ) {
        fn setup_env_var(key: &str, value: Option<&str>) {
            match value {
                None => env::remove_var(key),
                Some(value) => env::set_var(key, value),
            }
        }

        setup_env_var("NODE_BASE_URL", node_base_url);
        setup_env_var("INFURA_API_KEY", infura_api_key);
        setup_env_var("SWAP_NETWORK", network);
    }
}
