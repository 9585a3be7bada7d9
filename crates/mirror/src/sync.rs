//! Best-effort mirroring of confirmed issuances.
//!
//! The ledger is authoritative: a mirror failure is logged and never reported to the caller.

use crate::{
    client::MirrorClient,
    types::{MirrorRecord, NewCertificate},
};

/// Records a confirmed issuance in the mirror. Returns `None` if the mirror refused it.
pub async fn sync_issued(client: &MirrorClient, new: NewCertificate) -> Option<MirrorRecord> {
    match client.create(&new).await {
        Ok(record) => {
            debug!(
                target: "mirror",
                id = record.id,
                certificate_id = %record.certificate_id,
                "mirrored certificate"
            );
            Some(record)
        }
        Err(err) => {
            warn!(
                target: "mirror",
                certificate_id = %new.certificate_id,
                endpoint = %client.endpoint(),
                %err,
                "failed to mirror certificate"
            );
            None
        }
    }
}
