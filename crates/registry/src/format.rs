//! Decoding of registry records into [`Certificate`]s.

use crate::{
    abi::ICertificateRegistry::{verifyCertificateCall, verifyCertificateReturn},
    error::RegistryError,
};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A certificate as recorded on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub ipfs_hash: String,
    pub issuer_address: Address,
    pub issued_at: DateTime<Utc>,
    pub is_valid: bool,
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "certificateId  {}", self.certificate_id)?;
        writeln!(f, "studentName    {}", self.student_name)?;
        writeln!(f, "courseName     {}", self.course_name)?;
        writeln!(f, "ipfsHash       {}", self.ipfs_hash)?;
        writeln!(f, "issuerAddress  {}", self.issuer_address)?;
        writeln!(f, "issuedAt       {}", self.issued_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        write!(f, "isValid        {}", self.is_valid)
    }
}

/// Head size of the `verifyCertificate` return tuple: six words.
const RETURN_HEAD_LEN: usize = 6 * 32;

/// Decodes raw `verifyCertificate` return data.
///
/// Returns `None` for the zero-value record the contract returns for unknown ids. Data that does
/// not match the ABI is an error, never a default record.
///
/// Tail offsets are absolute, so the five-field tuple of pre-revocation deployments would decode
/// loosely as six fields with `isValid` read from a string length. The first offset pins the head
/// size and tells the two apart.
pub fn decode_certificate(
    certificate_id: &str,
    data: &[u8],
) -> Result<Option<Certificate>, RegistryError> {
    let decode_err = |message: String| RegistryError::Decode {
        function: verifyCertificateCall::SIGNATURE,
        message,
    };
    let head = data.get(..32).map(U256::from_be_slice);
    if head != Some(U256::from(RETURN_HEAD_LEN)) {
        return Err(decode_err(format!(
            "expected a {RETURN_HEAD_LEN}-byte return head, got offset {}; the contract does not \
             implement the revocable registry ABI",
            head.map_or_else(|| "<missing>".to_string(), |offset| offset.to_string())
        )));
    }
    let ret = verifyCertificateCall::abi_decode_returns_validate(data)
        .map_err(|err| decode_err(err.to_string()))?;
    into_certificate(certificate_id, ret)
}

/// Maps a decoded `verifyCertificate` tuple to a [`Certificate`].
fn into_certificate(
    certificate_id: &str,
    ret: verifyCertificateReturn,
) -> Result<Option<Certificate>, RegistryError> {
    // every issued record has a student name
    if ret.studentName.trim().is_empty() {
        return Ok(None);
    }

    let issued_at = u64::try_from(ret.issuedAt)
        .ok()
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| RegistryError::Decode {
            function: verifyCertificateCall::SIGNATURE,
            message: format!("timestamp {} is out of range", ret.issuedAt),
        })?;

    Ok(Some(Certificate {
        certificate_id: certificate_id.to_string(),
        student_name: ret.studentName,
        course_name: ret.course,
        ipfs_hash: ret.certHash,
        issuer_address: ret.issuer,
        issued_at,
        is_valid: ret.isValid,
    }))
}
