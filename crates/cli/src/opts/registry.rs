use alloy_primitives::Address;
use certify_config::{
    Chain, Config,
    figment::{
        self, Metadata, Profile,
        value::{Dict, Map},
    },
};
use certify_registry::ContractClient;
use certify_wallets::{RpcWallet, WalletOpts, WalletSession};
use clap::Parser;
use eyre::{Result, WrapErr};
use std::sync::Arc;

/// Options for talking to the certificate registry.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Registry options")]
pub struct RegistryOpts {
    /// The RPC endpoint.
    #[arg(short, long = "rpc-url", visible_alias = "rpc", env = "ETH_RPC_URL", value_name = "URL")]
    pub rpc_url: Option<String>,

    /// The chain every call must target, by name or EIP-155 chain ID.
    #[arg(long, visible_alias = "chain-id", value_name = "CHAIN", value_parser = parse_chain)]
    pub chain: Option<Chain>,

    /// The certificate registry address.
    #[arg(long, value_name = "ADDRESS")]
    pub contract: Option<Address>,

    /// Number of confirmations to wait for.
    #[arg(long, value_name = "BLOCKS")]
    pub confirmations: Option<u64>,

    #[command(flatten)]
    pub wallet: WalletOpts,
}

fn parse_chain(s: &str) -> Result<Chain, String> {
    s.parse::<Chain>().map_err(|err| format!("invalid chain {s:?}: {err}"))
}

impl figment::Provider for RegistryOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("RegistryOpts")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Config::selected_profile(), self.dict())]))
    }
}

impl RegistryOpts {
    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(url) = &self.rpc_url {
            dict.insert("eth_rpc_url".into(), url.clone().into());
        }
        if let Some(chain) = self.chain {
            dict.insert("chain_id".into(), chain.id().into());
        }
        if let Some(contract) = self.contract {
            dict.insert("contract".into(), contract.to_string().into());
        }
        if let Some(confirmations) = self.confirmations {
            dict.insert("confirmations".into(), confirmations.into());
        }
        dict
    }

    /// Loads the config with these options applied on top.
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::try_from(Config::figment().merge(self))?)
    }

    /// Opens a wallet session.
    ///
    /// Without an RPC endpoint there is no wallet to talk to and every registry operation fails
    /// with a no-wallet error.
    pub fn session(&self, config: &Config) -> Result<WalletSession> {
        let Some(url) = config.eth_rpc_url.as_deref() else {
            return Ok(WalletSession::new(None));
        };
        let signer = self.wallet.signer()?;
        let wallet = RpcWallet::connect_http(url, signer)
            .wrap_err_with(|| format!("failed to connect to {url}"))?;
        Ok(WalletSession::with_extension(Arc::new(wallet)))
    }

    /// Loads the config and builds a registry client from it.
    pub fn client(&self) -> Result<(Config, ContractClient)> {
        let config = self.load_config()?;
        let client = self.client_for(&config)?;
        Ok((config, client))
    }

    /// Builds a registry client from an already loaded config.
    pub fn client_for(&self, config: &Config) -> Result<ContractClient> {
        let session = self.session(config)?;
        Ok(ContractClient::from_config(session, config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn parse_registry_opts() {
        let opts = RegistryOpts::parse_from([
            "certify",
            "--rpc-url",
            "http://localhost:8545",
            "--chain",
            "sepolia",
            "--contract",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        ]);
        assert_eq!(opts.chain.map(|c| c.id()), Some(11155111));
        assert_eq!(opts.contract, Some(address!("0x5FbDB2315678afecb367f032d93F642f64180aa3")));

        let opts = RegistryOpts::parse_from(["certify", "--chain-id", "31337"]);
        assert_eq!(opts.chain.map(|c| c.id()), Some(31337));
    }

    #[test]
    fn opts_override_config() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "certify.toml",
                r#"
                [default]
                chain_id = 1
                confirmations = 3
            "#,
            )?;
            jail.set_env("CERTIFY_CONTRACT", "0x5FbDB2315678afecb367f032d93F642f64180aa3");

            let opts = RegistryOpts::parse_from(["certify", "--chain", "31337"]);
            let config = opts.load_config().unwrap();
            assert_eq!(config.chain_id, 31337);
            assert_eq!(config.confirmations, 3);
            assert_eq!(
                config.contract,
                Some(address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"))
            );
            Ok(())
        });
    }

    #[test]
    fn requires_contract() {
        figment::Jail::expect_with(|jail| {
            let err = RegistryOpts::default().client().unwrap_err();
            assert!(err.to_string().contains("no registry contract configured"), "{err}");

            jail.set_env("CERTIFY_CONTRACT", "0x5FbDB2315678afecb367f032d93F642f64180aa3");
            let (_, client) = RegistryOpts::default().client().unwrap();
            assert_eq!(client.contract(), address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
            Ok(())
        });
    }

    #[test]
    fn no_rpc_no_wallet() {
        figment::Jail::expect_with(|_| {
            let opts = RegistryOpts::default();
            let config = opts.load_config().unwrap();
            let session = opts.session(&config).unwrap();
            assert!(!session.has_extension());
            Ok(())
        });
    }
}
