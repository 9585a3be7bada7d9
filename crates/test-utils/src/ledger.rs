//! An in-memory certificate registry.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{Revert, SolCall, SolError, SolInterface};
use certify_registry::abi::ICertificateRegistry::{
    ICertificateRegistryCalls, adminCall, authorizedIssuersCall, verifyCertificateCall,
    verifyCertificateReturn,
};
use std::collections::{HashMap, HashSet};

/// A stored certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub student_name: String,
    pub course: String,
    pub issuer: Address,
    pub issued_at: u64,
    pub cert_hash: String,
    pub is_valid: bool,
}

/// Registry state, following the rules of the deployed contract.
#[derive(Clone, Debug)]
pub struct Ledger {
    admin: Address,
    issuers: HashSet<Address>,
    certificates: HashMap<String, Record>,
}

impl Ledger {
    pub fn new(admin: Address) -> Self {
        Self { admin, issuers: HashSet::new(), certificates: HashMap::new() }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn is_issuer(&self, account: Address) -> bool {
        self.issuers.contains(&account)
    }

    pub fn certificate(&self, id: &str) -> Option<&Record> {
        self.certificates.get(id)
    }

    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    /// Grants issuer rights without a transaction.
    pub fn grant_issuer(&mut self, account: Address) {
        self.issuers.insert(account);
    }

    /// Executes abi-encoded `input` as `sender` at `timestamp`.
    ///
    /// Returns the abi-encoded output, or the reason the contract reverted with.
    pub fn execute(
        &mut self,
        sender: Address,
        input: &[u8],
        timestamp: u64,
    ) -> Result<Vec<u8>, String> {
        let call = ICertificateRegistryCalls::abi_decode(input)
            .map_err(|err| format!("unknown function: {err}"))?;
        match call {
            ICertificateRegistryCalls::admin(_) => Ok(adminCall::abi_encode_returns(&self.admin)),
            ICertificateRegistryCalls::authorizedIssuers(call) => {
                Ok(authorizedIssuersCall::abi_encode_returns(&self.is_issuer(call.issuer)))
            }
            ICertificateRegistryCalls::addIssuer(call) => {
                if sender != self.admin {
                    return Err("Only admin can add issuers".to_string());
                }
                self.issuers.insert(call.issuer);
                Ok(Vec::new())
            }
            ICertificateRegistryCalls::issueCertificate(call) => {
                self.ensure_issuer(sender)?;
                if self.certificates.contains_key(&call.certId) {
                    return Err("Certificate already exists".to_string());
                }
                let record = Record {
                    student_name: call.studentName,
                    course: call.course,
                    issuer: sender,
                    issued_at: timestamp,
                    cert_hash: call.certHash,
                    is_valid: true,
                };
                self.certificates.insert(call.certId, record);
                Ok(Vec::new())
            }
            ICertificateRegistryCalls::verifyCertificate(call) => {
                let ret = match self.certificates.get(&call.certId) {
                    Some(record) => verifyCertificateReturn {
                        studentName: record.student_name.clone(),
                        course: record.course.clone(),
                        issuer: record.issuer,
                        issuedAt: U256::from(record.issued_at),
                        certHash: record.cert_hash.clone(),
                        isValid: record.is_valid,
                    },
                    None => verifyCertificateReturn {
                        studentName: String::new(),
                        course: String::new(),
                        issuer: Address::ZERO,
                        issuedAt: U256::ZERO,
                        certHash: String::new(),
                        isValid: false,
                    },
                };
                Ok(verifyCertificateCall::abi_encode_returns(&ret))
            }
            ICertificateRegistryCalls::revokeCertificate(call) => {
                self.ensure_issuer(sender)?;
                let record = self
                    .certificates
                    .get_mut(&call.certId)
                    .ok_or_else(|| "Certificate does not exist".to_string())?;
                record.is_valid = false;
                Ok(Vec::new())
            }
        }
    }

    fn ensure_issuer(&self, sender: Address) -> Result<(), String> {
        if sender == self.admin || self.is_issuer(sender) {
            Ok(())
        } else {
            Err("Not an authorized issuer".to_string())
        }
    }
}

/// Abi-encodes `reason` the way `require(cond, reason)` does.
pub fn revert_data(reason: &str) -> Vec<u8> {
    Revert { reason: reason.to_string() }.abi_encode()
}
