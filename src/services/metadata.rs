use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    normalize::{normalize_completion, NormalizedMetadata},
    services::error::ServiceError,
};

const MODEL: &str = "llama-3.3-70b-versatile";
const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f64 = 0.9;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Ask the model for token metadata and normalize whatever comes back.
/// Parse failures never surface here; the normalizer substitutes its
/// fallback record and flags it.
pub async fn generate_metadata(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<NormalizedMetadata, ServiceError> {
    let api_key = api_key.ok_or_else(|| {
        ServiceError::Process("GROQ_API_KEY is not configured".to_string())
    })?;

    let url = format!("{}/chat/completions", base_url);

    let request = ChatRequest {
        model: MODEL.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: user_prompt.to_string(),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    };

    info!("Requesting metadata generation from {}", url);

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ServiceError::UpstreamInternal(status.as_u16(), body));
    }

    let parsed: ChatResponse = serde_json::from_str(&body)?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| ServiceError::Process("completion had no choices".to_string()))?;

    debug!("Model completion: {}", content);

    Ok(normalize_completion(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::security::tests::serve_once;

    #[tokio::test]
    async fn upstream_rejection_is_masked_as_500() {
        let base_url = serve_once(
            "HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        );
        let client = reqwest::Client::new();
        let err = generate_metadata(&client, &base_url, Some("test-key"), "sys", "user")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamInternal(401, _)));
        assert_eq!(err.to_response().status().as_u16(), 500);
    }
}
