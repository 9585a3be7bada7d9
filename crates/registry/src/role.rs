use crate::{client::Reader, error::RegistryError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The caller's role in the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Issuer,
    User,
    /// Not resolved yet.
    #[default]
    Unknown,
}

impl Role {
    /// Whether this role may issue certificates.
    pub fn can_issue(&self) -> bool {
        matches!(self, Self::Admin | Self::Issuer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Issuer => "issuer",
            Self::User => "user",
            Self::Unknown => "unknown",
        })
    }
}

/// Resolves roles from the registry's admin and issuer list.
///
/// Roles are read fresh on every call; issuers can be added at any time.
#[derive(Debug)]
pub struct RoleResolver<'a> {
    reader: &'a Reader,
}

impl<'a> RoleResolver<'a> {
    pub fn new(reader: &'a Reader) -> Self {
        Self { reader }
    }

    /// Resolves the role of `caller`. The admin wins over an issuer grant.
    pub async fn resolve(&self, caller: Address) -> Result<Role, RegistryError> {
        let admin = self.reader.admin().await?;
        let is_issuer = self.reader.is_issuer(caller).await?;
        Ok(resolve_role(caller, admin, is_issuer))
    }
}

/// Addresses compare by value, so checksum casing never matters.
pub fn resolve_role(caller: Address, admin: Address, is_issuer: bool) -> Role {
    if caller == admin {
        Role::Admin
    } else if is_issuer {
        Role::Issuer
    } else {
        Role::User
    }
}
