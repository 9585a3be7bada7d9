use crate::cmd::confirm;
use alloy_primitives::Address;
use certify_cli::{opts::RegistryOpts, utils::print_json};
use clap::Parser;
use eyre::Result;
use serde_json::json;

/// CLI arguments for `certify add-issuer`.
#[derive(Clone, Debug, Parser)]
pub struct AddIssuerArgs {
    /// The account to authorize.
    ///
    /// Checksummed or all-lowercase hex; malformed addresses are rejected before the wallet is
    /// asked to sign anything.
    pub issuer: String,

    /// Only submit the transaction and print its hash, without waiting for it.
    #[arg(long = "async", alias = "no-wait")]
    pub send_async: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,
}

impl AddIssuerArgs {
    pub async fn run(self) -> Result<()> {
        let Self { issuer, send_async, json, registry } = self;
        let (config, client) = registry.client()?;
        let pending = client.add_issuer(&issuer).await?;
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
                "Authorized {} in block {} (tx {tx_hash})",
                issuer.trim(),
                receipt.block_number()
            );
        }
        Ok(())
    }
}

/// CLI arguments for `certify admin`.
#[derive(Clone, Debug, Parser)]
pub struct AdminArgs {
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,
}

impl AdminArgs {
    pub async fn run(self) -> Result<()> {
        let Self { json, registry } = self;
        let (_, client) = registry.client()?;
        let admin = client.check_admin().await?;
        if json {
            print_json(&json!({ "admin": admin }))?;
        } else {
            println!("{admin}");
        }
        Ok(())
    }
}

/// CLI arguments for `certify is-issuer`.
#[derive(Clone, Debug, Parser)]
pub struct IsIssuerArgs {
    /// The account to check.
    pub account: Address,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,
}

impl IsIssuerArgs {
    pub async fn run(self) -> Result<()> {
        let Self { account, json, registry } = self;
        let (_, client) = registry.client()?;
        let authorized = client.is_issuer(account).await?;
        if json {
            print_json(&json!({ "account": account, "isIssuer": authorized }))?;
        } else {
            println!("{authorized}");
        }
        Ok(())
    }
}

/// CLI arguments for `certify role`.
#[derive(Clone, Debug, Parser)]
pub struct RoleArgs {
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,
}

impl RoleArgs {
    pub async fn run(self) -> Result<()> {
        let Self { json, registry } = self;
        let (_, client) = registry.client()?;
        let role = client.check_role().await?;
        let account = client.session().address();
        if json {
            print_json(&json!({ "account": account, "role": role, "canIssue": role.can_issue() }))?;
        } else if role.can_issue() {
            println!("{role} (can issue certificates)");
        } else {
            println!("{role}");
        }
        Ok(())
    }
}
