use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

pub const MAX_DECIMALS: u8 = 18;
pub const MAX_TOTAL_SUPPLY: u64 = 1_000_000_000_000;
pub const MAX_TAX: u8 = 25;

// Everything the launch flow needs to know about a token before it exists
// on chain. Held in memory only; discarded when the session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "totalSupply")]
    pub total_supply: u64,
    pub description: String,
    #[serde(rename = "logoUri")]
    pub logo_uri: String,
    #[serde(rename = "buyTax")]
    pub buy_tax: u8,
    #[serde(rename = "sellTax")]
    pub sell_tax: u8,
    pub features: Vec<TokenFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFeature {
    Mintable,
    Burnable,
    Pausable,
    AntiWhale,
    AutoLiquidity,
}

impl TokenFeature {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mintable" => Some(TokenFeature::Mintable),
            "burnable" => Some(TokenFeature::Burnable),
            "pausable" => Some(TokenFeature::Pausable),
            "anti_whale" => Some(TokenFeature::AntiWhale),
            "auto_liquidity" => Some(TokenFeature::AutoLiquidity),
            _ => None,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        TokenConfig {
            name: String::new(),
            symbol: String::new(),
            decimals: 18,
            total_supply: 1_000_000,
            description: String::new(),
            logo_uri: String::new(),
            buy_tax: 0,
            sell_tax: 0,
            features: Vec::new(),
        }
    }
}

// Produced once per successful launch, immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentResult {
    #[serde(rename = "contractAddress")]
    pub contract_address: Address,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: TxHash,
}
