use crate::{
    error::MirrorError,
    types::{MirrorRecord, NewCertificate},
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

/// Persistence for mirrored certificates.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// All records, oldest first.
    async fn list(&self) -> Vec<MirrorRecord>;

    /// Validates and stores `new`, returning the stored record.
    async fn insert(&self, new: NewCertificate) -> Result<MirrorRecord, MirrorError>;
}

/// A [`CertificateStore`] that keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<MirrorRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl CertificateStore for MemoryStore {
    async fn list(&self) -> Vec<MirrorRecord> {
        self.records.lock().clone()
    }

    async fn insert(&self, new: NewCertificate) -> Result<MirrorRecord, MirrorError> {
        new.validate()?;
        let mut records = self.records.lock();
        if records.iter().any(|r| r.certificate_id == new.certificate_id) {
            return Err(MirrorError::Duplicate { certificate_id: new.certificate_id });
        }
        let record = MirrorRecord {
            id: records.last().map_or(1, |r| r.id + 1),
            certificate_id: new.certificate_id,
            student_name: new.student_name,
            course_name: new.course_name,
            ipfs_hash: new.ipfs_hash,
            issuer_address: new.issuer_address,
            issued_at: Utc::now(),
            is_valid: true,
            transaction_hash: new.transaction_hash,
        };
        records.push(record.clone());
        Ok(record)
    }
}
