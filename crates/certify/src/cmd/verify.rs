use certify_cli::{opts::RegistryOpts, utils::print_json};
use clap::Parser;
use eyre::Result;

/// CLI arguments for `certify verify`.
#[derive(Clone, Debug, Parser)]
pub struct VerifyArgs {
    /// The certificate ID.
    pub certificate_id: String,

    /// Print the certificate as JSON, `null` if it does not exist.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryOpts,
}

impl VerifyArgs {
    pub async fn run(self) -> Result<()> {
        let Self { certificate_id, json, registry } = self;
        let (_, client) = registry.client()?;
        let certificate = client.verify_certificate(&certificate_id).await?;
        if json {
            return print_json(&certificate);
        }
        match certificate {
            Some(certificate) => println!("{certificate}"),
            None => println!("Certificate {certificate_id:?} not found"),
        }
        Ok(())
    }
}
