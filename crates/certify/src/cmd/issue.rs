use crate::cmd::confirm;
use certify_cli::{
    opts::{MirrorOpts, RegistryOpts},
    utils::print_json,
};
use certify_config::Config;
use certify_mirror::{NewCertificate, sync::sync_issued};
use certify_registry::TxReceipt;
use clap::Parser;
use eyre::Result;
use serde::Serialize;
use serde_json::json;

/// CLI arguments for `certify issue`.
#[derive(Clone, Debug, Parser)]
pub struct IssueArgs {
    /// The certificate ID. Must not have been issued before.
    pub certificate_id: String,

    /// The student's name.
    pub student_name: String,

    /// The course name.
    pub course_name: String,

    /// IPFS hash of the certificate document.
    pub ipfs_hash: String,

    /// Only submit the transaction and print its hash, without waiting for it.
    ///
    /// The mirror is not updated.
    #[arg(long = "async", alias = "no-wait")]
    pub send_async: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,

    #[command(flatten)]
    pub mirror: MirrorOpts,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Issued<'a> {
    certificate_id: &'a str,
    #[serde(flatten)]
    receipt: &'a TxReceipt,
    mirrored: bool,
}

impl IssueArgs {
    pub async fn run(self) -> Result<()> {
        let Self {
            certificate_id,
            student_name,
            course_name,
            ipfs_hash,
            send_async,
            json,
            registry,
            mirror,
        } = self;
        let config = Config::try_from(Config::figment().merge(&registry).merge(&mirror))?;
        let client = registry.client_for(&config)?;
        let mirror_client = MirrorOpts::client(&config)?;

        let pending = client
            .issue_certificate(&certificate_id, &student_name, &course_name, &ipfs_hash)
            .await?;
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

        // the ledger is authoritative, a mirror failure is only logged
        let mut mirrored = false;
        if let Some(mirror_client) = mirror_client {
            let issuer = client.session().address().map(|a| a.to_string()).unwrap_or_default();
            let new = NewCertificate {
                certificate_id: certificate_id.clone(),
                student_name,
                course_name,
                ipfs_hash,
                issuer_address: issuer,
                transaction_hash: Some(tx_hash.to_string()),
            };
            mirrored = sync_issued(&mirror_client, new).await.is_some();
        } else {
            trace!("no mirror configured, skipping sync");
        }

        if json {
            print_json(&Issued { certificate_id: &certificate_id, receipt: &receipt, mirrored })?;
        } else {
            println!(
                "Issued {certificate_id:?} in block {} (tx {tx_hash})",
                receipt.block_number()
            );
        }
        Ok(())
    }
}
