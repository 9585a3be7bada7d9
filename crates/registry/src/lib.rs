//! # certify-registry
//!
//! Client for the on-chain certificate registry: issuance, verification, revocation and roles.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod abi;

mod client;
pub use client::{ContractClient, DEFAULT_POLL_INTERVAL, PendingTx, Reader, TxReceipt, Writer};

mod error;
pub use error::{ErrorKind, RegistryError};

pub mod format;
pub use format::Certificate;

mod role;
pub use role::{Role, RoleResolver, resolve_role};
