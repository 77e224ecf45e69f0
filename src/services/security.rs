use alloy::primitives::Address;
use log::{debug, info};
use serde_json::Value;

use crate::services::error::ServiceError;

/// GoPlus token-security lookup. Both security-flavoured investigation
/// operations land here rather than in local logic.
pub async fn fetch_token_security(
    client: &reqwest::Client,
    base_url: &str,
    chain_id: u64,
    address: Address,
) -> Result<Value, ServiceError> {
    let url = format!(
        "{}/token_security/{}?contract_addresses={}",
        base_url, chain_id, address
    );

    info!("Fetching token security for {} on chain {}", address, chain_id);

    let response = client.get(&url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ServiceError::UpstreamInternal(status.as_u16(), body));
    }

    debug!("GoPlus response: {}", body);

    let value: Value = serde_json::from_str(&body)?;
    Ok(value)
}
