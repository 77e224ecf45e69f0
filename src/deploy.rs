use std::{
    error::Error,
    fmt::{self, Display},
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::{
    primitives::{Address, TxHash, U256},
    providers::Provider,
};
use async_trait::async_trait;
use log::{error, info};

use crate::{
    erc20::{TokenLaunchpad, ERC20},
    token::DeploymentResult,
};

// Transactions submitted after this many seconds are no longer valid.
pub const DEADLINE_OFFSET_SECS: u64 = 20 * 60;

#[derive(Debug)]
pub enum DeployError {
    // The wallet rejected or the chain reverted the approval.
    Approve(String),
    // Approval went through but the launch call failed. The allowance is
    // left granted; there is no compensating action.
    Launch(String),
}

impl Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::Approve(msg) => write!(f, "approval failed: {}", msg),
            DeployError::Launch(msg) => write!(f, "launch failed: {}", msg),
        }
    }
}

impl Error for DeployError {}

/// Transaction submission capability, injected so the flow never touches an
/// ambient provider and so tests can script either step.
#[async_trait]
pub trait LaunchSubmitter: Send + Sync {
    /// Submit an ERC-20 approve and wait for it to confirm.
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, DeployError>;

    /// Submit the launchpad call and wait for it to confirm.
    async fn launch(
        &self,
        token: Address,
        amount: U256,
        min_token: U256,
        min_eth: U256,
        deadline: U256,
    ) -> Result<TxHash, DeployError>;
}

/// Strictly sequential two-step flow: approve, then launch. The second step
/// is never attempted when the first fails, and nothing is retried.
pub async fn run_launch<S: LaunchSubmitter + ?Sized>(
    submitter: &S,
    token: Address,
    amount: U256,
    launchpad: Address,
) -> Result<DeploymentResult, DeployError> {
    info!("Approving {} for launchpad {}", amount, launchpad);

    let approve_hash = submitter.approve(token, launchpad, amount).await.map_err(|e| {
        error!("Approval step failed: {}", e);
        e
    })?;

    info!("Approval confirmed in {}", approve_hash);

    let deadline = U256::from(unix_now() + DEADLINE_OFFSET_SECS);

    // Minimum-out values are zero: no slippage protection, matching the
    // launchpad's expectations for a fresh pair.
    let launch_hash = submitter
        .launch(token, amount, U256::ZERO, U256::ZERO, deadline)
        .await
        .map_err(|e| {
            error!("Launch step failed: {}", e);
            e
        })?;

    info!("Launch confirmed in {}", launch_hash);

    Ok(DeploymentResult {
        contract_address: token,
        transaction_hash: launch_hash,
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Submitter backed by an alloy provider with a wallet filler attached.
pub struct AlloySubmitter<P> {
    provider: P,
    launchpad: Address,
}

impl<P: Provider> AlloySubmitter<P> {
    pub fn new(provider: P, launchpad: Address) -> Self {
        Self { provider, launchpad }
    }
}

#[async_trait]
impl<P: Provider> LaunchSubmitter for AlloySubmitter<P> {
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, DeployError> {
        let erc20 = ERC20::new(token, &self.provider);
        let pending = erc20
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| DeployError::Approve(e.to_string()))?;
        pending
            .watch()
            .await
            .map_err(|e| DeployError::Approve(e.to_string()))
    }

    async fn launch(
        &self,
        token: Address,
        amount: U256,
        min_token: U256,
        min_eth: U256,
        deadline: U256,
    ) -> Result<TxHash, DeployError> {
        let launchpad = TokenLaunchpad::new(self.launchpad, &self.provider);
        let pending = launchpad
            .launch(token, amount, min_token, min_eth, deadline)
            .send()
            .await
            .map_err(|e| DeployError::Launch(e.to_string()))?;
        pending
            .watch()
            .await
            .map_err(|e| DeployError::Launch(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::sync::Mutex;

    const TOKEN: Address = address!("0000000000000000000000000000000000000011");
    const LAUNCHPAD: Address = address!("0000000000000000000000000000000000000022");

    struct ScriptedSubmitter {
        approve_result: Result<TxHash, String>,
        launch_result: Result<TxHash, String>,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl LaunchSubmitter for ScriptedSubmitter {
        async fn approve(
            &self,
            _token: Address,
            _spender: Address,
            _amount: U256,
        ) -> Result<TxHash, DeployError> {
            self.calls.lock().unwrap().push("approve");
            self.approve_result
                .clone()
                .map_err(DeployError::Approve)
        }

        async fn launch(
            &self,
            _token: Address,
            _amount: U256,
            min_token: U256,
            min_eth: U256,
            deadline: U256,
        ) -> Result<TxHash, DeployError> {
            self.calls.lock().unwrap().push("launch");
            assert_eq!(min_token, U256::ZERO);
            assert_eq!(min_eth, U256::ZERO);
            assert!(deadline > U256::ZERO);
            self.launch_result.clone().map_err(DeployError::Launch)
        }
    }

    #[tokio::test]
    async fn happy_path_runs_both_steps_in_order() {
        let submitter = ScriptedSubmitter {
            approve_result: Ok(TxHash::with_last_byte(1)),
            launch_result: Ok(TxHash::with_last_byte(2)),
            calls: Mutex::new(Vec::new()),
        };
        let result = run_launch(&submitter, TOKEN, U256::from(1000), LAUNCHPAD)
            .await
            .unwrap();
        assert_eq!(result.contract_address, TOKEN);
        assert_eq!(result.transaction_hash, TxHash::with_last_byte(2));
        assert_eq!(*submitter.calls.lock().unwrap(), vec!["approve", "launch"]);
    }

    #[tokio::test]
    async fn launch_is_never_submitted_when_approve_fails() {
        let submitter = ScriptedSubmitter {
            approve_result: Err("user rejected the request".to_string()),
            launch_result: Ok(TxHash::with_last_byte(2)),
            calls: Mutex::new(Vec::new()),
        };
        let err = run_launch(&submitter, TOKEN, U256::from(1000), LAUNCHPAD)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Approve(_)));
        assert!(err.to_string().contains("user rejected the request"));
        assert_eq!(*submitter.calls.lock().unwrap(), vec!["approve"]);
    }

    #[tokio::test]
    async fn launch_failure_surfaces_after_successful_approve() {
        let submitter = ScriptedSubmitter {
            approve_result: Ok(TxHash::with_last_byte(1)),
            launch_result: Err("execution reverted".to_string()),
            calls: Mutex::new(Vec::new()),
        };
        let err = run_launch(&submitter, TOKEN, U256::from(1000), LAUNCHPAD)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Launch(_)));
        assert_eq!(*submitter.calls.lock().unwrap(), vec!["approve", "launch"]);
    }
}
