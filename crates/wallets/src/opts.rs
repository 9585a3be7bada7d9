use crate::utils::create_private_key_signer;
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use eyre::{Result, WrapErr};

/// The local signer options.
///
/// The signer can either be:
/// 1. Private Key (cleartext in CLI or environment)
/// 2. Private Key (interactively via secure prompt)
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Wallet options", about = None, long_about = None)]
pub struct WalletOpts {
    /// Open an interactive prompt to enter your private key.
    #[arg(long, short)]
    pub interactive: bool,

    /// Use the provided private key.
    #[arg(long, value_name = "RAW_PRIVATE_KEY", env = "CERTIFY_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
}

impl WalletOpts {
    /// Builds the configured signer, `None` if no key was provided.
    pub fn signer(&self) -> Result<Option<PrivateKeySigner>> {
        if self.interactive {
            let private_key = rpassword::prompt_password("Enter private key: ")?;
            return Ok(Some(create_private_key_signer(&private_key)?));
        }
        self.private_key
            .as_deref()
            .map(create_private_key_signer)
            .transpose()
            .wrap_err("invalid --private-key")
    }
}
