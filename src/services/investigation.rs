use alloy::primitives::Address;
use log::{error, info, warn};
use serde_json::{json, Value};
use tokio::process::Command;

use crate::{
    config::AppConfig,
    services::{error::ServiceError, security},
};

// The investigation route fans out to a fixed set of named operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    RugAnalysis,
    LaunchSecurity,
    TokenStats,
    TopTraders,
}

pub const VALID_DATA_TYPES: [&str; 4] = [
    "rug_analysis",
    "launch_security",
    "token_stats",
    "top_traders",
];

impl DataType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rug_analysis" => Some(DataType::RugAnalysis),
            "launch_security" => Some(DataType::LaunchSecurity),
            "token_stats" => Some(DataType::TokenStats),
            "top_traders" => Some(DataType::TopTraders),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::RugAnalysis => "rug_analysis",
            DataType::LaunchSecurity => "launch_security",
            DataType::TokenStats => "token_stats",
            DataType::TopTraders => "top_traders",
        }
    }
}

/// Run one investigation operation and wrap its result under the
/// operation's own key.
pub async fn investigate(
    config: &AppConfig,
    client: &reqwest::Client,
    data_type: DataType,
    address: Address,
    chain_id: u64,
) -> Result<Value, ServiceError> {
    info!(
        "Investigating {:?} for {} on chain {}",
        data_type, address, chain_id
    );

    let data = match data_type {
        // Security flavours are backed by the external API, not local logic.
        DataType::RugAnalysis | DataType::LaunchSecurity => {
            security::fetch_token_security(client, &config.goplus_base_url, chain_id, address)
                .await?
        }
        DataType::TokenStats | DataType::TopTraders => {
            run_analysis_script(config, data_type, address).await?
        }
    };

    Ok(wrap_result(data_type, data))
}

pub fn wrap_result(data_type: DataType, data: Value) -> Value {
    json!({
        data_type.as_str(): {
            "code": 0,
            "msg": "success",
            "data": data,
        }
    })
}

/// One-shot child process: `<interpreter> <script> <operation> <address>`.
/// Output is fully buffered; the script must emit a single JSON document on
/// stdout and exit 0.
async fn run_analysis_script(
    config: &AppConfig,
    data_type: DataType,
    address: Address,
) -> Result<Value, ServiceError> {
    let output = Command::new(&config.investigator_interpreter)
        .arg(&config.investigator_script)
        .arg(data_type.as_str())
        .arg(address.to_string())
        .output()
        .await
        .map_err(|e| ServiceError::Process(format!("failed to spawn: {}", e)))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        warn!("Analysis script stderr: {}", stderr.trim());
    }

    if !output.status.success() {
        error!(
            "Analysis script exited with {:?} for {:?}",
            output.status.code(),
            data_type
        );
        return Err(ServiceError::Process(format!(
            "script exited with status {:?}",
            output.status.code()
        )));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| ServiceError::Process(format!("stdout not UTF-8: {}", e)))?;

    let value: Value = serde_json::from_str(stdout.trim())
        .map_err(|e| ServiceError::Process(format!("stdout not valid JSON: {}", e)))?;

    Ok(value)
}
