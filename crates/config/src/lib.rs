//! # certify-config
//!
//! Certify configuration.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, ChainId};
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

pub mod error;
pub use error::ExtractConfigError;

// reexport so cli types can implement `figment::Provider` to merge their arguments
pub use alloy_chains::{Chain, NamedChain};
pub use figment;

/// Certify configuration
///
/// # Defaults
///
/// All configuration values have a default, see [`Config::default()`]. The defaults target
/// Sepolia; the registry `contract` has to be configured.
///
/// # Provider Details
///
/// `Config` is a Figment [`Provider`]. [`Config::figment()`] layers, in ascending priority:
///
///   1. [`Config::default()`]
///   2. `certify.toml` _or_ the file named in the `CERTIFY_CONFIG` environment variable. Top-level
///      tables are profiles, e.g. `[default]`.
///   3. `CERTIFY_` prefixed environment variables
///
/// The profile selected is the value of `CERTIFY_PROFILE`, `default` if unset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The selected profile. Set when extracting from a `Figment`.
    #[serde(skip)]
    pub profile: Profile,
    /// The chain every contract call must target.
    pub chain_id: ChainId,
    /// Address of the deployed certificate registry.
    ///
    /// Unset by default: the first Sepolia deployment predates revocation and its
    /// `verifyCertificate` returns a different tuple, so there is no deployment to fall back to.
    pub contract: Option<Address>,
    /// JSON-RPC endpoint used when no browser extension is available.
    pub eth_rpc_url: Option<String>,
    /// Base url of the certificate mirror, if any.
    pub mirror_url: Option<String>,
    /// Address the mirror service binds to.
    pub mirror_bind: SocketAddr,
    /// Number of confirmations to wait for before a transaction is treated as settled.
    pub confirmations: u64,
    /// Interval between receipt polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// How long the CLI waits for a receipt before giving up, in seconds.
    pub receipt_timeout_secs: Option<u64>,
}

impl Config {
    /// The default profile: "default"
    pub const DEFAULT_PROFILE: Profile = Profile::const_new("default");

    /// File name of config toml file
    pub const FILE_NAME: &'static str = "certify.toml";

    /// Sepolia testnet.
    pub const SEPOLIA_CHAIN_ID: ChainId = 11155111;

    /// Returns the current `Config`.
    ///
    /// See [`figment`](Self::figment) for more details.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment())
    }

    /// Attempts to extract a `Config` from `provider`, returning the result.
    ///
    /// # Example
    ///
    /// ```rust
    /// use certify_config::Config;
    /// use figment::providers::{Format, Toml};
    ///
    /// // Use the default `Figment`, but allow values from `other.toml` to supersede its values.
    /// let figment = Config::figment().merge(Toml::file("other.toml").nested());
    ///
    /// let config = Config::try_from(figment);
    /// ```
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        trace!("load config with provider: {:?}", provider.metadata());
        let figment = Figment::from(provider);
        let mut config = figment.extract::<Self>().map_err(ExtractConfigError::new)?;
        config.profile = figment.profile().clone();
        Ok(config)
    }

    /// Returns the default figment.
    pub fn figment() -> Figment {
        let profile = Self::selected_profile();
        Figment::from(Self::default())
            .merge(Toml::file(Env::var_or("CERTIFY_CONFIG", Self::FILE_NAME)).nested())
            .merge(Env::prefixed("CERTIFY_").ignore(&["PROFILE", "CONFIG", "DEBUG"]).global())
            .select(profile)
    }

    /// Returns the selected profile.
    ///
    /// If the `CERTIFY_PROFILE` env variable is not set, this returns the `DEFAULT_PROFILE`.
    pub fn selected_profile() -> Profile {
        Profile::from_env_or("CERTIFY_PROFILE", Self::DEFAULT_PROFILE)
    }

    /// The configured chain.
    pub fn chain(&self) -> Chain {
        Chain::from_id(self.chain_id)
    }

    /// Interval between receipt polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// How long to wait for a receipt, if bounded.
    pub fn receipt_timeout(&self) -> Option<Duration> {
        self.receipt_timeout_secs.map(Duration::from_secs)
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("Certify Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }

    fn profile(&self) -> Option<Profile> {
        Some(self.profile.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Self::DEFAULT_PROFILE,
            chain_id: Self::SEPOLIA_CHAIN_ID,
            contract: None,
            eth_rpc_url: None,
            mirror_url: None,
            mirror_bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 5000)),
            confirmations: 1,
            poll_interval_ms: 4_000,
            receipt_timeout_secs: Some(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use similar_asserts::assert_eq;

    #[test]
    fn default_targets_sepolia() {
        let config = Config::default();
        assert_eq!(config.chain(), Chain::from_named(NamedChain::Sepolia));
        assert_eq!(config.contract, None);
        assert_eq!(config.confirmations, 1);
    }

    #[test]
    fn default_figment_round_trips() {
        figment::Jail::expect_with(|_| {
            let config = Config::load().unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn toml_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "certify.toml",
                r#"
                [default]
                chain_id = 31337
                contract = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
                eth_rpc_url = "http://localhost:8545"
                confirmations = 2
            "#,
            )?;
            let config = Config::load().unwrap();
            assert_eq!(config.chain_id, 31337);
            assert_eq!(
                config.contract,
                Some(address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"))
            );
            assert_eq!(config.eth_rpc_url.as_deref(), Some("http://localhost:8545"));
            assert_eq!(config.confirmations, 2);
            assert_eq!(config.poll_interval(), Duration::from_secs(4));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "certify.toml",
                r#"
                [default]
                confirmations = 2
                mirror_url = "http://localhost:5000"
            "#,
            )?;
            jail.set_env("CERTIFY_CONFIRMATIONS", "5");
            jail.set_env("CERTIFY_POLL_INTERVAL_MS", "100");
            let config = Config::load().unwrap();
            assert_eq!(config.confirmations, 5);
            assert_eq!(config.poll_interval(), Duration::from_millis(100));
            assert_eq!(config.mirror_url.as_deref(), Some("http://localhost:5000"));
            Ok(())
        });
    }

    #[test]
    fn selects_profile() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "certify.toml",
                r#"
                [default]
                confirmations = 2

                [local]
                chain_id = 31337
            "#,
            )?;
            jail.set_env("CERTIFY_PROFILE", "local");
            let config = Config::load().unwrap();
            assert_eq!(config.profile, Profile::new("local"));
            assert_eq!(config.chain_id, 31337);
            // falls back to the default profile for unset keys
            assert_eq!(config.confirmations, 2);
            Ok(())
        });
    }

    #[test]
    fn reports_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "certify.toml",
                r#"
                [default]
                contract = "not-an-address"
            "#,
            )?;
            let err = Config::load().unwrap_err().to_string();
            assert!(err.starts_with(error::FAILED_TO_EXTRACT_CONFIG_MSG), "{err}");
            assert!(err.contains("contract"), "{err}");
            Ok(())
        });
    }
}
