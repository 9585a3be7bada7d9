use crate::error::PrivateKeyError;
use alloy_primitives::{Address, B256, hex::FromHex};
use alloy_signer_local::PrivateKeySigner;

fn ensure_pk_not_env(pk: &str) -> Result<(), PrivateKeyError> {
    if !pk.starts_with("0x") && std::env::var(pk).is_ok() {
        return Err(PrivateKeyError::ExistsAsEnvVar(pk.to_string()));
    }
    Ok(())
}

/// Validates and sanitizes user input, returning a local signer.
pub fn create_private_key_signer(
    private_key_str: &str,
) -> Result<PrivateKeySigner, PrivateKeyError> {
    let private_key = match B256::from_hex(private_key_str.trim()) {
        Ok(private_key) => private_key,
        Err(err) => {
            ensure_pk_not_env(private_key_str)?;
            return Err(err.into());
        }
    };
    PrivateKeySigner::from_bytes(&private_key).map_err(|err| {
        ensure_pk_not_env(private_key_str)
            .err()
            .unwrap_or_else(|| PrivateKeyError::InvalidKey(err.into()))
    })
}

/// Parses a well-formed account address.
///
/// Requires the `0x` prefix and 40 hex digits. Mixed-case input must carry a valid EIP-55
/// checksum; all-lowercase and all-uppercase input is accepted as is.
pub fn parse_account_address(s: &str) -> Option<Address> {
    let digits = s.strip_prefix("0x")?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let address = Address::from_hex(digits).ok()?;
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != s {
        return None;
    }
    Some(address)
}
