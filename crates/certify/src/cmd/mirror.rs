use certify_cli::{opts::MirrorOpts, utils::print_json};
use certify_mirror::{MemoryStore, MirrorServer};
use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr, eyre};
use itertools::Itertools;
use std::sync::Arc;

/// CLI subcommands for `certify mirror`.
#[derive(Clone, Debug, Subcommand)]
pub enum MirrorSubcommand {
    /// Serves an in-memory mirror until interrupted.
    Serve(ServeArgs),

    /// Lists the certificates known to a mirror.
    #[command(visible_alias = "ls")]
    List(ListArgs),
}

impl MirrorSubcommand {
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Serve(cmd) => cmd.run().await,
            Self::List(cmd) => cmd.run().await,
        }
    }
}

/// CLI arguments for `certify mirror serve`.
#[derive(Clone, Debug, Parser)]
pub struct ServeArgs {
    #[command(flatten)]
    pub mirror: MirrorOpts,
}

impl ServeArgs {
    pub async fn run(self) -> Result<()> {
        let config = self.mirror.load_config()?;
        let mut server = MirrorServer::new(config.mirror_bind, Arc::new(MemoryStore::new()));
        let addr = server
            .start()
            .await
            .wrap_err_with(|| format!("failed to bind {}", config.mirror_bind))?;
        println!("Mirror listening on http://{addr}/api/certificates");

        tokio::signal::ctrl_c().await?;
        debug!(target: "mirror", "shutting down");
        server.stop().await;
        Ok(())
    }
}

/// CLI arguments for `certify mirror list`.
#[derive(Clone, Debug, Parser)]
pub struct ListArgs {
    /// Print the records as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub mirror: MirrorOpts,
}

impl ListArgs {
    pub async fn run(self) -> Result<()> {
        let Self { json, mirror } = self;
        let config = mirror.load_config()?;
        let client = MirrorOpts::client(&config)?
            .ok_or_else(|| eyre!("no mirror configured; pass --mirror-url or set mirror_url"))?;
        let records = client.list().await?;
        if json {
            return print_json(&records);
        }
        if records.is_empty() {
            println!("No certificates");
            return Ok(());
        }
        for record in &records {
            let columns = [
                record.id.to_string(),
                record.certificate_id.clone(),
                record.student_name.clone(),
                record.course_name.clone(),
                record.issuer_address.clone(),
                record.issued_at.format("%Y-%m-%d").to_string(),
                if record.is_valid { "valid" } else { "revoked" }.to_string(),
            ];
            println!("{}", columns.iter().join("\t"));
        }
        Ok(())
    }
}
