use crate::cmd::confirm;
use certify_cli::{opts::RegistryOpts, utils::print_json};
use clap::Parser;
use eyre::Result;
use serde_json::json;

/// CLI arguments for `certify revoke`.
#[derive(Clone, Debug, Parser)]
pub struct RevokeArgs {
    /// The certificate ID.
    pub certificate_id: String,

    /// Only submit the transaction and print its hash, without waiting for it.
    #[arg(long = "async", alias = "no-wait")]
    pub send_async: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,
}

impl RevokeArgs {
    pub async fn run(self) -> Result<()> {
        let Self { certificate_id, send_async, json, registry } = self;
        let (config, client) = registry.client()?;
        let pending = client.revoke_certificate(&certificate_id).await?;
        let tx_hash = pending.tx_hash();
        if send_async {
            if json {
                print_json(&json!({ "transactionHash": tx_hash }))?;
            } else {
                println!("{tx_hash}");
            }
            return Ok(());
        }

        let receipt = confirm(pending, &config).await?;
        if json {
            print_json(&receipt)?;
        } else {
            println!(
                "Revoked {certificate_id:?} in block {} (tx {tx_hash})",
                receipt.block_number()
            );
        }
        Ok(())
    }
}
