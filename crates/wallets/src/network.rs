use crate::{
    eip1193::{Eip1193, methods, request_typed},
    error::WalletError,
};
use alloy_chains::Chain;
use alloy_primitives::{ChainId, U64};
use serde_json::json;

/// Keeps contract calls on the required chain.
///
/// Must complete before a call is dispatched, otherwise the call could target the wrong chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkGuard {
    required: ChainId,
}

impl NetworkGuard {
    pub const fn new(required: ChainId) -> Self {
        Self { required }
    }

    /// The chain every call must target.
    pub const fn required(&self) -> ChainId {
        self.required
    }

    /// Reads the extension's active chain.
    pub async fn current_chain(extension: &dyn Eip1193) -> Result<ChainId, WalletError> {
        let id: U64 = request_typed(extension, methods::ETH_CHAIN_ID, json!([])).await?;
        Ok(id.to())
    }

    /// Ensures the extension is on the required chain, requesting a switch if it is not.
    ///
    /// A no-op when already on the required chain. The switch may prompt the user; if it is
    /// declined or unsupported this fails with [`WalletError::NetworkMismatch`].
    pub async fn ensure_network(&self, extension: &dyn Eip1193) -> Result<(), WalletError> {
        let actual = Self::current_chain(extension).await?;
        if actual == self.required {
            trace!(target: "wallet", chain_id = actual, "already on required chain");
            return Ok(());
        }

        debug!(target: "wallet", actual, required = self.required, "requesting network switch");
        let params = json!([{ "chainId": format!("{:#x}", self.required) }]);
        if let Err(err) = extension.request(methods::WALLET_SWITCH_ETHEREUM_CHAIN, params).await {
            warn!(target: "wallet", %err, "network switch failed");
            return Err(self.mismatch(actual));
        }

        // some wallets acknowledge the switch without performing it
        let switched = Self::current_chain(extension).await?;
        if switched != self.required {
            return Err(self.mismatch(switched));
        }
        debug!(target: "wallet", chain_id = switched, "switched network");
        Ok(())
    }

    fn mismatch(&self, actual: ChainId) -> WalletError {
        WalletError::NetworkMismatch {
            expected: self.required,
            actual,
            name: Chain::from_id(self.required).to_string(),
        }
    }
}
