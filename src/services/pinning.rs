use log::info;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::services::error::ServiceError;

pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

const GATEWAY_BASE: &str = "https://gateway.pinata.cloud/ipfs";

#[derive(Debug, Deserialize)]
struct PinataResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Gatekeeping before any upstream call: logo uploads must be images and
/// small enough to pin cheaply.
pub fn validate_upload(content_type: &str, size: usize) -> Result<(), ServiceError> {
    if !content_type.starts_with("image/") {
        return Err(ServiceError::BadRequest(format!(
            "Only image uploads are accepted, got {}",
            content_type
        )));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ServiceError::BadRequest(format!(
            "File too large: {} bytes (limit {})",
            size, MAX_UPLOAD_BYTES
        )));
    }
    Ok(())
}

pub async fn pin_file(
    client: &reqwest::Client,
    base_url: &str,
    jwt: Option<&str>,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
) -> Result<Value, ServiceError> {
    validate_upload(&content_type, bytes.len())?;

    let jwt = jwt
        .ok_or_else(|| ServiceError::Process("PINATA_JWT is not configured".to_string()))?;

    let url = format!("{}/pinning/pinFileToIPFS", base_url);

    info!("Pinning {} ({} bytes) to IPFS", file_name, bytes.len());

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(&content_type)
        .map_err(|e| ServiceError::BadRequest(format!("Invalid MIME type: {}", e)))?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", jwt))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ServiceError::UpstreamInternal(status.as_u16(), body));
    }

    let pinned: PinataResponse = serde_json::from_str(&body)?;

    Ok(json!({
        "success": true,
        "ipfsHash": pinned.ipfs_hash,
        "ipfsUrl": format!("{}/{}", GATEWAY_BASE, pinned.ipfs_hash),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_small_image() {
        assert!(validate_upload("image/png", 1024).is_ok());
        assert!(validate_upload("image/svg+xml", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn rejects_non_image_mime() {
        let err = validate_upload("application/pdf", 10).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn rejects_oversized_file() {
        let err = validate_upload("image/png", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn upstream_rejection_is_masked_as_500() {
        let base_url = crate::services::security::tests::serve_once(
            "HTTP/1.1 403 Forbidden\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        );
        let client = reqwest::Client::new();
        let err = pin_file(
            &client,
            &base_url,
            Some("test-jwt"),
            "logo.png".to_string(),
            "image/png".to_string(),
            vec![0u8; 64],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamInternal(403, _)));
        assert_eq!(err.to_response().status().as_u16(), 500);
    }
}
