use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::configuration::Configuration;
use crate::constants::COINGECKO_BASE_URL;

/// Client for the CoinGecko token-metadata API, the pipeline's external
/// lookup capability. Only consulted after the local registry misses.
pub struct CoinGeckoClient {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(config: &Configuration) -> Self {
        Self {
            base_url: COINGECKO_BASE_URL.to_string(),
            api_key: config.coingecko_api_key.clone(),
        }
    }

    /// Search for a token by name or symbol and return its contract address
    /// on the given platform. First search match wins; `None` when the token
    /// or a platform entry for it does not exist.
    pub async fn get_contract_address(
        &self,
        token_identifier: &str,
        platform: &str,
    ) -> Result<Option<String>> {
        let coin_id = match self.search_first_coin_id(token_identifier).await? {
            Some(coin_id) => coin_id,
            None => return Ok(None),
        };

        info!("found coin id `{}` for `{}`", coin_id, token_identifier);

        let response_body = self
            .get_json(&format!("{}/coins/{}", self.base_url, coin_id))
            .await?;

        let contract_address = response_body["platforms"][platform]
            .as_str()
            .filter(|address| !address.is_empty())
            .map(str::to_owned);

        Ok(contract_address)
    }

    async fn search_first_coin_id(&self, query: &str) -> Result<Option<String>> {
        let response_body = self
            .get_json(&format!(
                "{}/search?query={}",
                self.base_url,
                urlencode(query)
            ))
            .await?;

        let coins = response_body["coins"]
            .as_array()
            .context("unable to get `coins` from search response")?;

        Ok(coins
            .first()
            .and_then(|coin| coin["id"].as_str())
            .map(str::to_owned))
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let http_client = reqwest::Client::new();

        let mut request = http_client.get(url);
        if let Some(api_key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", api_key);
        }

        let response = request.send().await?;

        match response.error_for_status_ref() {
            Ok(_) => Ok(response.json::<Value>().await?),
            Err(err) => {
                debug!("GET {} failed with body: {:?}", url, response.text().await?);
                Err(anyhow!(err))
            }
        }
    }
}

fn urlencode(query: &str) -> String {
    url::form_urlencoded::byte_serialize(query.as_bytes()).collect()
}
