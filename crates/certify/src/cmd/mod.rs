//! Subcommands of the `certify` CLI.
//!
//! Each command is a clap struct with its options and a `run` method.

use alloy_primitives::TxHash;
use certify_config::Config;
use certify_registry::{PendingTx, TxReceipt};
use eyre::{Result, eyre};

pub mod connect;
pub mod issue;
pub mod issuer;
pub mod mirror;
pub mod revoke;
pub mod verify;

/// Waits for `pending` to be confirmed, bounded by the configured receipt timeout.
///
/// The hash is printed to stderr first, so an interrupted or timed out wait can be followed up
/// instead of resubmitted.
pub(crate) async fn confirm(pending: PendingTx, config: &Config) -> Result<TxReceipt> {
    let tx_hash = pending.tx_hash();
    eprintln!("{}", pending_message(tx_hash, config.confirmations));
    let receipt = match config.receipt_timeout() {
        Some(timeout) => tokio::time::timeout(timeout, pending.wait()).await.map_err(|_| {
            eyre!(
                "timed out after {}s waiting for transaction {tx_hash}; \
                 it may still be included later",
                timeout.as_secs()
            )
        })??,
        None => pending.wait().await?,
    };
    Ok(receipt)
}

fn pending_message(tx_hash: TxHash, confirmations: u64) -> String {
    match confirmations {
        0 | 1 => format!("Submitted transaction {tx_hash}, waiting for it to be mined"),
        n => format!("Submitted transaction {tx_hash}, waiting for {n} confirmations"),
    }
}
