use certify_config::{
    Config,
    figment::{
        self, Metadata, Profile,
        value::{Dict, Map},
    },
};
use certify_mirror::MirrorClient;
use clap::Parser;
use eyre::{Result, WrapErr};
use std::net::SocketAddr;

/// Options for the certificate mirror.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Mirror options")]
pub struct MirrorOpts {
    /// Base URL of the mirror service.
    #[arg(long, value_name = "URL")]
    pub mirror_url: Option<String>,

    /// Address to serve the mirror on.
    #[arg(long = "bind", value_name = "ADDR")]
    pub mirror_bind: Option<SocketAddr>,
}

impl figment::Provider for MirrorOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("MirrorOpts")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Config::selected_profile(), self.dict())]))
    }
}

impl MirrorOpts {
    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(url) = &self.mirror_url {
            dict.insert("mirror_url".into(), url.clone().into());
        }
        if let Some(bind) = self.mirror_bind {
            dict.insert("mirror_bind".into(), bind.to_string().into());
        }
        dict
    }

    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::try_from(Config::figment().merge(self))?)
    }

    /// A client for the configured mirror, `None` if no mirror is configured.
    pub fn client(config: &Config) -> Result<Option<MirrorClient>> {
        let Some(url) = config.mirror_url.as_deref() else { return Ok(None) };
        let client =
            MirrorClient::new(url).wrap_err_with(|| format!("invalid mirror url {url:?}"))?;
        Ok(Some(client))
    }
}
