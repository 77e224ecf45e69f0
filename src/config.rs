use dotenv::dotenv;
use log::warn;
use std::env;

// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub pinata_jwt: Option<String>,
    pub pinata_base_url: String,
    pub goplus_base_url: String,
    pub gecko_base_url: String,
    pub investigator_interpreter: String,
    pub investigator_script: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv().ok();

        let groq_api_key = env::var("GROQ_API_KEY").ok();
        if groq_api_key.is_none() {
            warn!("GROQ_API_KEY not set, metadata generation will fail");
        }

        let pinata_jwt = env::var("PINATA_JWT").ok();
        if pinata_jwt.is_none() {
            warn!("PINATA_JWT not set, IPFS pinning will fail");
        }

        AppConfig {
            groq_api_key,
            groq_base_url: env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            pinata_jwt,
            pinata_base_url: env::var("PINATA_BASE_URL")
                .unwrap_or_else(|_| "https://api.pinata.cloud".to_string()),
            goplus_base_url: env::var("GOPLUS_BASE_URL")
                .unwrap_or_else(|_| "https://api.gopluslabs.io/api/v1".to_string()),
            gecko_base_url: env::var("GECKO_BASE_URL")
                .unwrap_or_else(|_| "https://api.geckoterminal.com/api/v2".to_string()),
            investigator_interpreter: env::var("INVESTIGATOR_INTERPRETER")
                .unwrap_or_else(|_| "python3".to_string()),
            investigator_script: env::var("INVESTIGATOR_SCRIPT")
                .unwrap_or_else(|_| "scripts/investigate.py".to_string()),
        }
    }
}
