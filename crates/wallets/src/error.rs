use crate::eip1193::ProviderRpcError;
use alloy_primitives::{ChainId, hex::FromHexError};
use alloy_signer_local::LocalSignerError;

#[derive(Debug, thiserror::Error)]
pub enum PrivateKeyError {
    #[error("Failed to create wallet from private key. Private key is invalid hex: {0}")]
    InvalidHex(#[from] FromHexError),
    #[error("Failed to create wallet from private key: {0}")]
    InvalidKey(#[from] LocalSignerError),
    #[error(
        "Failed to create wallet from private key. Invalid private key. But env var {0} exists. Is the `$` anchor missing?"
    )]
    ExistsAsEnvVar(String),
}

/// Errors surfaced by the wallet session and the network guard.
#[derive(Clone, Debug, thiserror::Error)]
pub enum WalletError {
    /// No compatible wallet extension was detected.
    #[error("no wallet extension detected; install a browser wallet such as MetaMask to continue")]
    NoWallet,
    /// The wallet exposes no account, or was disconnected before a signer was obtained.
    #[error("wallet is not connected; connect a wallet and try again")]
    NotConnected,
    /// The wallet is on the wrong chain and switching failed or was declined.
    #[error("wallet is on chain {actual}, expected {expected}; please switch to {name} manually")]
    NetworkMismatch { expected: ChainId, actual: ChainId, name: String },
    /// The user declined an account-access or transaction prompt.
    #[error("request rejected in wallet: {0}")]
    UserRejected(String),
    /// Transport or node failure.
    #[error("wallet request failed: {0}")]
    Rpc(ProviderRpcError),
}

impl From<ProviderRpcError> for WalletError {
    fn from(err: ProviderRpcError) -> Self {
        if err.is_user_rejected() { Self::UserRejected(err.message) } else { Self::Rpc(err) }
    }
}
