use crate::error::MirrorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A certificate as stored by the mirror.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorRecord {
    /// Assigned by the store.
    pub id: u64,
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub ipfs_hash: String,
    pub issuer_address: String,
    pub issued_at: DateTime<Utc>,
    pub is_valid: bool,
    pub transaction_hash: Option<String>,
}

/// The insert shape accepted by `POST /api/certificates`.
///
/// Missing fields deserialize as empty and are reported by [`NewCertificate::validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCertificate {
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub ipfs_hash: String,
    pub issuer_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl NewCertificate {
    /// Checks the required fields, reporting the first empty one.
    pub fn validate(&self) -> Result<(), MirrorError> {
        let fields = [
            ("certificateId", "Certificate ID is required", &self.certificate_id),
            ("studentName", "Student name is required", &self.student_name),
            ("courseName", "Course name is required", &self.course_name),
            ("ipfsHash", "IPFS hash is required", &self.ipfs_hash),
            ("issuerAddress", "Issuer address is required", &self.issuer_address),
        ];
        for (field, message, value) in fields {
            if value.trim().is_empty() {
                return Err(MirrorError::Validation { field, message: message.to_string() });
            }
        }
        Ok(())
    }
}

/// Error body returned by the mirror API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
