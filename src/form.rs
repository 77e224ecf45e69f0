use alloy::primitives::{Address, U256};
use log::info;

use crate::{
    deploy::{run_launch, LaunchSubmitter},
    normalize::NormalizedMetadata,
    token::{DeploymentResult, TokenConfig, TokenFeature, MAX_DECIMALS, MAX_TAX, MAX_TOTAL_SUPPLY},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployProgress {
    Idle,
    Submitting,
    Confirmed,
    Failed,
}

// In-memory holder for the token being configured, plus the observable
// outcome fields the UI renders. Nothing here survives the session.
#[derive(Debug)]
pub struct TokenForm {
    pub config: TokenConfig,
    pub progress: DeployProgress,
    pub result: Option<DeploymentResult>,
    pub error: Option<String>,
    // True when the last auto-generate round fell back to the fixed record.
    pub generated_from_fallback: bool,
}

impl Default for TokenForm {
    fn default() -> Self {
        TokenForm {
            config: TokenConfig::default(),
            progress: DeployProgress::Idle,
            result: None,
            error: None,
            generated_from_fallback: false,
        }
    }
}

impl TokenForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: String) {
        self.config.name = name;
    }

    pub fn set_symbol(&mut self, symbol: String) {
        self.config.symbol = symbol;
    }

    pub fn set_decimals(&mut self, decimals: u8) {
        self.config.decimals = decimals.min(MAX_DECIMALS);
    }

    pub fn set_total_supply(&mut self, total_supply: u64) {
        self.config.total_supply = total_supply.min(MAX_TOTAL_SUPPLY);
    }

    pub fn set_description(&mut self, description: String) {
        self.config.description = description;
    }

    pub fn set_logo_uri(&mut self, logo_uri: String) {
        self.config.logo_uri = logo_uri;
    }

    pub fn set_buy_tax(&mut self, tax: u8) {
        self.config.buy_tax = tax.min(MAX_TAX);
    }

    pub fn set_sell_tax(&mut self, tax: u8) {
        self.config.sell_tax = tax.min(MAX_TAX);
    }

    pub fn toggle_feature(&mut self, feature: TokenFeature) {
        if let Some(pos) = self.config.features.iter().position(|f| *f == feature) {
            self.config.features.remove(pos);
        } else {
            self.config.features.push(feature);
        }
    }

    /// Replace the whole record with an auto-generated one.
    pub fn apply_generated(&mut self, generated: NormalizedMetadata) {
        info!(
            "Applying generated config {} ({}){}",
            generated.config.name,
            generated.config.symbol,
            if generated.fallback { " [fallback]" } else { "" }
        );
        self.config = generated.config;
        self.generated_from_fallback = generated.fallback;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.config.name.trim().is_empty() {
            return Err("Token name is required".to_string());
        }
        if self.config.symbol.trim().is_empty() {
            return Err("Token symbol is required".to_string());
        }
        if self.config.total_supply == 0 {
            return Err("Total supply must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Validate, then hand off to the two-step launch flow, recording
    /// progress, result and error for the UI.
    pub async fn deploy<S: LaunchSubmitter + ?Sized>(
        &mut self,
        submitter: &S,
        token: Address,
        amount: U256,
        launchpad: Address,
    ) {
        if let Err(msg) = self.validate() {
            self.progress = DeployProgress::Failed;
            self.error = Some(msg);
            return;
        }

        self.progress = DeployProgress::Submitting;
        self.error = None;

        match run_launch(submitter, token, amount, launchpad).await {
            Ok(result) => {
                self.progress = DeployProgress::Confirmed;
                self.result = Some(result);
            }
            Err(e) => {
                self.progress = DeployProgress::Failed;
                self.error = Some(e.to_string());
            }
        }
    }
}
