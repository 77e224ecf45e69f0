use std::{
    error::Error,
    fmt::{self, Display},
};

use alloy::primitives::Address;
use async_trait::async_trait;
use log::{info, warn};

#[derive(Debug)]
pub enum WalletError {
    NoAccounts,
    Provider(String),
}

impl Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::NoAccounts => write!(f, "wallet exposed no accounts"),
            WalletError::Provider(msg) => write!(f, "wallet provider error: {}", msg),
        }
    }
}

impl Error for WalletError {}

/// The injected-provider surface the session depends on. Passed in
/// explicitly rather than reached for as ambient state, so tests can hand
/// the session a scripted provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`: prompts the user, returns authorized accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;
    /// Chain id the provider is currently pointed at.
    async fn chain_id(&self) -> Result<u64, WalletError>;
}

// At most one session per holder; invalidated by disconnects and by
// account/chain change events.
#[derive(Debug, Default)]
pub struct WalletSession {
    pub connected: bool,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect<P: WalletProvider>(&mut self, provider: &P) -> Result<(), WalletError> {
        let accounts = provider.request_accounts().await?;
        let Some(account) = accounts.first().copied() else {
            return Err(WalletError::NoAccounts);
        };
        let chain_id = provider.chain_id().await?;

        info!("Wallet connected: {} on chain {}", account, chain_id);

        self.connected = true;
        self.account = Some(account);
        self.chain_id = Some(chain_id);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
        self.account = None;
        self.chain_id = None;
    }

    /// `accountsChanged` callback. An empty list means the user revoked
    /// access; otherwise the first account replaces the current one. On a
    /// disconnected session only the revocation applies; a fresh session
    /// must go through `connect` so the chain id is populated too.
    pub fn on_accounts_changed(&mut self, accounts: &[Address]) {
        match accounts.first() {
            Some(account) if self.connected => {
                info!("Wallet account changed to {}", account);
                self.account = Some(*account);
            }
            Some(account) => {
                info!("Ignoring account event for {} without a session", account);
            }
            None => {
                warn!("Wallet access revoked");
                self.disconnect();
            }
        }
    }

    /// `chainChanged` callback. Idempotent reset of the chain id only.
    pub fn on_chain_changed(&mut self, chain_id: u64) {
        info!("Wallet chain changed to {}", chain_id);
        self.chain_id = Some(chain_id);
    }
}
