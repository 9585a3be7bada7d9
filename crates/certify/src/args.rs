use crate::opts::{Certify, CertifySubcommand};
use certify_cli::{handler, utils};
use clap::Parser;
use eyre::Result;

/// Runs the `certify` command-line interface.
pub fn run() -> Result<()> {
    setup()?;

    let args = Certify::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_command(args))
}

/// Sets up error reporting, `.env` loading and the global logger.
pub fn setup() -> Result<()> {
    handler::install();
    utils::load_dotenv();
    utils::subscriber();

    Ok(())
}

/// Runs the subcommand.
pub async fn run_command(args: Certify) -> Result<()> {
    match args.cmd {
        CertifySubcommand::Connect(cmd) => cmd.run().await,
        CertifySubcommand::Disconnect(cmd) => cmd.run().await,
        CertifySubcommand::Issue(cmd) => cmd.run().await,
        CertifySubcommand::Verify(cmd) => cmd.run().await,
        CertifySubcommand::Revoke(cmd) => cmd.run().await,
        CertifySubcommand::AddIssuer(cmd) => cmd.run().await,
        CertifySubcommand::Admin(cmd) => cmd.run().await,
        CertifySubcommand::IsIssuer(cmd) => cmd.run().await,
        CertifySubcommand::Role(cmd) => cmd.run().await,
        CertifySubcommand::Mirror(cmd) => cmd.run().await,
    }
}
