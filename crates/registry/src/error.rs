use alloy_sol_types::{Revert, SolError, decode_revert_reason};
use certify_wallets::{ProviderRpcError, WalletError};
use serde::Serialize;
use std::fmt;

/// Errors returned by [`ContractClient`](crate::ContractClient) operations.
#[derive(Clone, Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    /// The contract rejected the call.
    #[error("transaction reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    ContractRevert { reason: Option<String> },
    /// An argument was rejected before anything was sent to the wallet.
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    /// The contract returned data that does not match the registry ABI.
    #[error("failed to decode `{function}` result: {message}")]
    Decode { function: &'static str, message: String },
}

impl RegistryError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    /// The normalized kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Wallet(err) => match err {
                WalletError::NoWallet => ErrorKind::NoWallet,
                WalletError::NotConnected => ErrorKind::NotConnected,
                WalletError::NetworkMismatch { .. } => ErrorKind::NetworkMismatch,
                WalletError::UserRejected(_) => ErrorKind::UserRejected,
                WalletError::Rpc(_) => ErrorKind::Rpc,
            },
            Self::ContractRevert { .. } => ErrorKind::ContractRevert,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }
}

impl From<ProviderRpcError> for RegistryError {
    fn from(err: ProviderRpcError) -> Self {
        if !err.is_user_rejected() && err.is_revert() {
            return Self::ContractRevert { reason: revert_reason(&err) };
        }
        Self::Wallet(err.into())
    }
}

/// Extracts the revert reason from a wallet error.
///
/// Prefers the abi-encoded revert data and falls back to the `execution reverted: <reason>`
/// message nodes produce when the data was stripped. `require` messages are returned as is;
/// panics and custom errors keep their decoded description.
fn revert_reason(err: &ProviderRpcError) -> Option<String> {
    if let Some(data) = err.revert_data() {
        if let Ok(revert) = Revert::abi_decode(&data) {
            return Some(revert.reason);
        }
        if let Some(reason) = decode_revert_reason(&data) {
            return Some(reason);
        }
    }
    let (_, reason) = err.message.split_once("execution reverted:")?;
    let reason = reason.trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

/// Normalized error kinds, one per actionable failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NoWallet,
    NotConnected,
    NetworkMismatch,
    UserRejected,
    ContractRevert,
    Rpc,
    Validation,
    Decode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoWallet => "no wallet",
            Self::NotConnected => "not connected",
            Self::NetworkMismatch => "network mismatch",
            Self::UserRejected => "user rejected",
            Self::ContractRevert => "contract revert",
            Self::Rpc => "rpc",
            Self::Validation => "validation",
            Self::Decode => "decode",
        })
    }
}
