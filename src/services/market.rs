use alloy::primitives::Address;
use log::{debug, info};
use serde_json::{json, Value};

use crate::services::error::ServiceError;

/// Map an EVM chain id onto GeckoTerminal's network slug.
pub fn network_slug(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("eth"),
        56 => Some("bsc"),
        137 => Some("polygon_pos"),
        8453 => Some("base"),
        42161 => Some("arbitrum"),
        43114 => Some("avax"),
        _ => None,
    }
}

/// GeckoTerminal token lookup. Unlike the other adapters this one forwards
/// the upstream status code to the caller on failure.
pub async fn fetch_token_data(
    client: &reqwest::Client,
    base_url: &str,
    chain_id: u64,
    address: Address,
) -> Result<Value, ServiceError> {
    let Some(network) = network_slug(chain_id) else {
        return Err(ServiceError::BadRequest(format!(
            "Unsupported chain id: {}",
            chain_id
        )));
    };

    let url = format!("{}/networks/{}/tokens/{}", base_url, network, address);

    info!("Fetching market data for {} on {}", address, network);

    let response = client.get(&url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ServiceError::Upstream(status.as_u16(), body));
    }

    debug!("GeckoTerminal response: {}", body);

    let upstream: Value = serde_json::from_str(&body)?;
    Ok(json!({ "token_data": upstream }))
}
