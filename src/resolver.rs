use std::str::FromStr;

use ethers::types::Address;
use tracing::{debug, warn};

use crate::coingecko_client::CoinGeckoClient;
use crate::constants::{token_registry, COINGECKO_PLATFORM};
use crate::error::SwapError;

/// Maps free-form token identifiers to on-chain addresses for one network.
///
/// Resolution order, first success wins: literal 20-byte hex address, the
/// network's static registry (case-insensitive), then the external lookup.
/// The registry is checked before the lookup because an identifier visible
/// on the lookup service's default network may not exist on the network the
/// pipeline is targeting.
pub struct TokenResolver {
    network: String,
    lookup: CoinGeckoClient,
}

impl TokenResolver {
    pub fn new(network: &str, lookup: CoinGeckoClient) -> Self {
        Self {
            network: network.to_string(),
            lookup,
        }
    }

    pub async fn resolve(&self, identifier: &str) -> Result<Address, SwapError> {
        if let Some(address) = self.resolve_local(identifier) {
            debug!("resolved `{}` locally to {:?}", identifier, address);
            return Ok(address);
        }

        warn!(
            "token `{}` not in the {} registry, falling back to coingecko (mainnet only)",
            identifier, self.network
        );

        let not_found = || SwapError::NotFound {
            identifier: identifier.to_string(),
            network: self.network.clone(),
        };

        match self
            .lookup
            .get_contract_address(identifier, COINGECKO_PLATFORM)
            .await
        {
            Ok(Some(address)) => Address::from_str(&address).map_err(|_| not_found()),
            Ok(None) => Err(not_found()),
            Err(err) => {
                warn!("coingecko lookup for `{}` failed: {:?}", identifier, err);
                Err(not_found())
            }
        }
    }

    /// Literal-address and registry resolution. Never touches the network.
    fn resolve_local(&self, identifier: &str) -> Option<Address> {
        let identifier = identifier.trim();

        if let Ok(address) = Address::from_str(identifier) {
            return Some(address);
        }

        let symbol = identifier.to_uppercase();
        token_registry(&self.network)
            .iter()
            .find(|(registered, _)| *registered == symbol)
            .and_then(|(_, address)| Address::from_str(address).ok())
    }
}
