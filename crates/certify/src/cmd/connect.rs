use certify_cli::{opts::RegistryOpts, utils::print_json};
use clap::Parser;
use eyre::Result;
use serde_json::json;

/// CLI arguments for `certify connect`.
#[derive(Clone, Debug, Parser)]
pub struct ConnectArgs {
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,
}

impl ConnectArgs {
    pub async fn run(self) -> Result<()> {
        let Self { json, registry } = self;
        let (_, client) = registry.client()?;
        let signer = client.session().connect().await?;
        let account = signer.address();
        if json {
            print_json(&json!({ "address": account }))?;
        } else {
            println!("{account}");
        }
        Ok(())
    }
}

/// CLI arguments for `certify disconnect`.
#[derive(Clone, Debug, Parser)]
pub struct DisconnectArgs {
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,
}

impl DisconnectArgs {
    pub async fn run(self) -> Result<()> {
        let Self { json, registry } = self;
        let (_, client) = registry.client()?;
        let session = client.session();
        // never prompts; picks up an account the wallet already authorized
        let previous = session.restore().await;
        session.disconnect();
        if json {
            print_json(&json!({ "disconnected": previous }))?;
        } else {
            match previous {
                Some(account) => println!("Disconnected {account}"),
                None => println!("Not connected"),
            }
        }
        Ok(())
    }
}
