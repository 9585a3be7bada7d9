//! The wallet extension boundary.
//!
//! Models the [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193) provider API: a single
//! `request` entry point plus the `accountsChanged` and `chainChanged` notifications, which are
//! published as typed [`ProviderEvent`]s instead of callbacks.

use alloy_primitives::{Address, Bytes, ChainId, hex};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt;
use tokio::sync::broadcast;

/// Method names used by this crate and its consumers.
pub mod methods {
    pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ETH_ACCOUNTS: &str = "eth_accounts";
    pub const ETH_CHAIN_ID: &str = "eth_chainId";
    pub const WALLET_SWITCH_ETHEREUM_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ETH_CALL: &str = "eth_call";
    pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
    pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
}

/// A notification published by the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of exposed accounts changed. An empty list means the user disconnected.
    AccountsChanged(Vec<Address>),
    /// The active chain changed.
    ChainChanged(ChainId),
}

/// Error returned by [`Eip1193::request`].
///
/// See <https://eips.ethereum.org/EIPS/eip-1193#provider-errors>
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderRpcError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested method and/or account has not been authorized by the user.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not support the requested method.
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// The provider is disconnected from all chains.
    pub const DISCONNECTED: i64 = 4900;
    /// The requested chain has not been added to the wallet.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// Geth's code for `execution reverted`.
    pub const EXECUTION_REVERTED: i64 = 3;
    /// JSON-RPC internal error.
    pub const INTERNAL_ERROR: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::new(Self::USER_REJECTED, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(Self::UNAUTHORIZED, message)
    }

    pub fn unsupported_method(method: &str) -> Self {
        Self::new(Self::UNSUPPORTED_METHOD, format!("the method {method} does not exist"))
    }

    pub fn unrecognized_chain(chain_id: ChainId) -> Self {
        Self::new(Self::UNRECOGNIZED_CHAIN, format!("unrecognized chain id {chain_id:#x}"))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL_ERROR, message)
    }

    /// An `execution reverted` error carrying the raw revert data.
    pub fn reverted(message: impl Into<String>, data: &[u8]) -> Self {
        Self::new(Self::EXECUTION_REVERTED, message)
            .with_data(Value::String(hex::encode_prefixed(data)))
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code == Self::USER_REJECTED
    }

    /// Whether this error reports an on-chain execution revert.
    pub fn is_revert(&self) -> bool {
        self.code == Self::EXECUTION_REVERTED
            || self.message.contains("execution reverted")
            || self.revert_data().is_some()
    }

    /// Returns the revert data attached to the error, if any.
    ///
    /// Wallets nest it differently: as the `data` string itself, as `data.data`, or under
    /// `data.originalError.data`.
    pub fn revert_data(&self) -> Option<Bytes> {
        fn hex_bytes(value: &Value) -> Option<Bytes> {
            let s = value.as_str()?;
            if !s.starts_with("0x") || s.len() <= 2 {
                return None;
            }
            s.parse().ok()
        }

        let data = self.data.as_ref()?;
        hex_bytes(data)
            .or_else(|| data.get("data").and_then(hex_bytes))
            .or_else(|| data.get("originalError").and_then(|e| e.get("data")).and_then(hex_bytes))
    }
}

impl fmt::Display for ProviderRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderRpcError {}

/// An EIP-1193 compatible wallet extension.
#[async_trait]
pub trait Eip1193: Send + Sync + fmt::Debug {
    /// Submits a JSON-RPC request to the extension.
    ///
    /// Account access and transaction requests may prompt the user.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;

    /// Subscribes to the extension's notifications.
    ///
    /// Dropping the receiver removes the listener.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Issues a request and deserializes the response into `R`.
pub async fn request_typed<R: DeserializeOwned>(
    extension: &dyn Eip1193,
    method: &str,
    params: Value,
) -> Result<R, ProviderRpcError> {
    let value = extension.request(method, params).await?;
    serde_json::from_value(value).map_err(|err| {
        ProviderRpcError::internal(format!("invalid `{method}` response from wallet: {err}"))
    })
}
