//! # certify-wallets
//!
//! Wallet extension access: the EIP-1193 boundary, the connection session and the network guard.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

pub mod eip1193;
pub use eip1193::{Eip1193, ProviderEvent, ProviderRpcError};

pub mod error;
pub use error::{PrivateKeyError, WalletError};

pub mod network;
pub use network::NetworkGuard;

pub mod opts;
pub use opts::WalletOpts;

pub mod rpc;
pub use rpc::RpcWallet;

pub mod session;
pub use session::{ExtensionSigner, SessionSnapshot, Transition, WalletSession, transition};

pub mod utils;
