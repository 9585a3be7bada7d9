//! Registry operations over a wallet session.

use crate::{
    abi::ICertificateRegistry::{
        addIssuerCall, adminCall, authorizedIssuersCall, issueCertificateCall,
        revokeCertificateCall, verifyCertificateCall,
    },
    error::RegistryError,
    format::{Certificate, decode_certificate},
    role::{Role, RoleResolver},
};
use alloy_primitives::{Address, Bytes, TxHash, U64};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use certify_config::Config;
use certify_wallets::{
    Eip1193, ExtensionSigner, NetworkGuard, WalletSession,
    eip1193::{methods, request_typed},
    utils::parse_account_address,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Duration};

/// Default delay between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Client for the certificate registry.
///
/// Holds no bindings of its own: every operation checks the network and builds a fresh
/// [`Reader`] or [`Writer`] from the session.
#[derive(Clone, Debug)]
pub struct ContractClient {
    session: WalletSession,
    guard: NetworkGuard,
    contract: Address,
    confirmations: u64,
    poll_interval: Duration,
}

impl ContractClient {
    pub fn new(session: WalletSession, chain_id: u64, contract: Address) -> Self {
        Self {
            session,
            guard: NetworkGuard::new(chain_id),
            contract,
            confirmations: 1,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Creates a client for the chain, contract and confirmation settings in `config`.
    ///
    /// Fails with a validation error if no registry contract is configured.
    pub fn from_config(session: WalletSession, config: &Config) -> Result<Self, RegistryError> {
        let contract = config.contract.ok_or_else(|| {
            RegistryError::validation(
                "contract",
                "no registry contract configured; set `contract` in certify.toml, \
                 CERTIFY_CONTRACT or --contract",
            )
        })?;
        Ok(Self::new(session, config.chain_id, contract)
            .with_confirmations(config.confirmations)
            .with_poll_interval(config.poll_interval()))
    }

    /// Sets the number of confirmations [`PendingTx::wait`] waits for. Clamped to at least 1.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// The registry contract address.
    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn guard(&self) -> &NetworkGuard {
        &self.guard
    }

    /// Returns a read-only binding. Never prompts.
    pub async fn reader(&self) -> Result<Reader, RegistryError> {
        let extension = self.session.extension()?.clone();
        self.guard.ensure_network(&*extension).await?;
        Ok(Reader { extension, contract: self.contract })
    }

    /// Returns a signing binding, connecting the session if needed.
    pub async fn writer(&self) -> Result<Writer, RegistryError> {
        let extension = self.session.extension()?;
        self.guard.ensure_network(&**extension).await?;
        let signer = self.session.ensure_signer().await?;
        Ok(Writer {
            signer,
            contract: self.contract,
            confirmations: self.confirmations,
            poll_interval: self.poll_interval,
        })
    }

    /// Issues a certificate. Requires an issuer or the admin account.
    pub async fn issue_certificate(
        &self,
        certificate_id: &str,
        student_name: &str,
        course_name: &str,
        ipfs_hash: &str,
    ) -> Result<PendingTx, RegistryError> {
        let call = issueCertificateCall {
            certId: required("certificateId", "Certificate ID is required", certificate_id)?,
            studentName: required("studentName", "Student name is required", student_name)?,
            course: required("courseName", "Course name is required", course_name)?,
            certHash: required("ipfsHash", "IPFS hash is required", ipfs_hash)?,
        };
        let writer = self.writer().await?;
        let pending = writer.send(&call).await?;
        info!(
            target: "registry",
            certificate_id,
            tx_hash = %pending.tx_hash(),
            "issuing certificate"
        );
        Ok(pending)
    }

    /// Looks up a certificate. `None` if it was never issued.
    pub async fn verify_certificate(
        &self,
        certificate_id: &str,
    ) -> Result<Option<Certificate>, RegistryError> {
        let reader = self.reader().await?;
        let data = reader
            .call_raw(&verifyCertificateCall { certId: certificate_id.to_string() })
            .await?;
        let certificate = decode_certificate(certificate_id, &data)?;
        debug!(
            target: "registry",
            certificate_id,
            found = certificate.is_some(),
            "verified certificate"
        );
        Ok(certificate)
    }

    /// Marks a certificate as no longer valid.
    pub async fn revoke_certificate(
        &self,
        certificate_id: &str,
    ) -> Result<PendingTx, RegistryError> {
        let call = revokeCertificateCall {
            certId: required("certificateId", "Certificate ID is required", certificate_id)?,
        };
        let writer = self.writer().await?;
        let pending = writer.send(&call).await?;
        info!(
            target: "registry",
            certificate_id,
            tx_hash = %pending.tx_hash(),
            "revoking certificate"
        );
        Ok(pending)
    }

    /// Returns the registry admin.
    pub async fn check_admin(&self) -> Result<Address, RegistryError> {
        self.reader().await?.admin().await
    }

    /// Whether `account` is an authorized issuer.
    pub async fn is_issuer(&self, account: Address) -> Result<bool, RegistryError> {
        self.reader().await?.is_issuer(account).await
    }

    /// Resolves the role of the connected account, connecting first if needed.
    pub async fn check_role(&self) -> Result<Role, RegistryError> {
        let reader = self.reader().await?;
        let caller = self.session.ensure_signer().await?.address();
        let role = RoleResolver::new(&reader).resolve(caller).await?;
        debug!(target: "registry", %caller, %role, "resolved role");
        Ok(role)
    }

    /// Authorizes `issuer` to issue certificates. Only the admin may do this.
    ///
    /// The address is validated before anything is sent to the wallet.
    pub async fn add_issuer(&self, issuer: &str) -> Result<PendingTx, RegistryError> {
        let issuer = parse_account_address(issuer.trim()).ok_or_else(|| {
            let message = format!("invalid issuer address: {issuer:?}");
            RegistryError::validation("issuerAddress", message)
        })?;
        let writer = self.writer().await?;
        let pending = writer.send(&addIssuerCall { issuer }).await?;
        info!(target: "registry", %issuer, tx_hash = %pending.tx_hash(), "adding issuer");
        Ok(pending)
    }
}

fn required(field: &'static str, message: &str, value: &str) -> Result<String, RegistryError> {
    if value.trim().is_empty() {
        return Err(RegistryError::validation(field, message));
    }
    Ok(value.to_string())
}

/// A read-only registry binding.
#[derive(Clone, Debug)]
pub struct Reader {
    extension: Arc<dyn Eip1193>,
    contract: Address,
}

impl Reader {
    /// Executes `call` with `eth_call` against the latest block and decodes the result.
    ///
    /// Decoding is strict: non-canonical words are rejected instead of being read loosely.
    pub async fn call<C: SolCall>(&self, call: &C) -> Result<C::Return, RegistryError> {
        let data = self.call_raw(call).await?;
        C::abi_decode_returns_validate(&data).map_err(|err| RegistryError::Decode {
            function: C::SIGNATURE,
            message: err.to_string(),
        })
    }

    /// Executes `call` with `eth_call` against the latest block, returning the raw result.
    pub async fn call_raw<C: SolCall>(&self, call: &C) -> Result<Bytes, RegistryError> {
        let tx = TransactionRequest::default()
            .to(self.contract)
            .input(TransactionInput::both(Bytes::from(call.abi_encode())));
        let params = json!([tx, "latest"]);
        trace!(target: "registry", function = C::SIGNATURE, "eth_call");
        let data: Bytes = request_typed(&*self.extension, methods::ETH_CALL, params).await?;
        Ok(data)
    }

    pub async fn admin(&self) -> Result<Address, RegistryError> {
        self.call(&adminCall {}).await
    }

    pub async fn is_issuer(&self, account: Address) -> Result<bool, RegistryError> {
        self.call(&authorizedIssuersCall { issuer: account }).await
    }
}

/// A signing registry binding.
#[derive(Clone, Debug)]
pub struct Writer {
    signer: ExtensionSigner,
    contract: Address,
    confirmations: u64,
    poll_interval: Duration,
}

impl Writer {
    /// The account transactions are sent from.
    pub fn from(&self) -> Address {
        self.signer.address()
    }

    /// Submits `call` as a transaction. Prompts the user.
    pub async fn send<C: SolCall>(&self, call: &C) -> Result<PendingTx, RegistryError> {
        let tx_hash =
            self.signer.send_transaction(self.contract, Bytes::from(call.abi_encode())).await?;
        debug!(target: "registry", function = C::SIGNATURE, %tx_hash, "transaction submitted");
        Ok(PendingTx {
            tx_hash,
            extension: self.signer.extension().clone(),
            confirmations: self.confirmations,
            poll_interval: self.poll_interval,
        })
    }
}

/// The fields of a transaction receipt the registry needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub block_number: U64,
    /// Missing on pre-byzantium receipts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<U64>,
}

impl TxReceipt {
    pub fn block_number(&self) -> u64 {
        self.block_number.to()
    }

    pub fn succeeded(&self) -> bool {
        self.status.is_none_or(|status| status == U64::from(1))
    }
}

/// A submitted transaction.
///
/// Dropping it does not cancel the transaction, it can still be included later.
#[derive(Clone, Debug)]
#[must_use = "a pending transaction must be awaited to learn whether it succeeded"]
pub struct PendingTx {
    tx_hash: TxHash,
    extension: Arc<dyn Eip1193>,
    confirmations: u64,
    poll_interval: Duration,
}

impl PendingTx {
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Waits until the transaction has the configured number of confirmations.
    ///
    /// Fails with [`RegistryError::ContractRevert`] if the transaction was mined but reverted.
    pub async fn wait(self) -> Result<TxReceipt, RegistryError> {
        let extension = &*self.extension;
        loop {
            let receipt: Option<TxReceipt> = request_typed(
                extension,
                methods::ETH_GET_TRANSACTION_RECEIPT,
                json!([self.tx_hash]),
            )
            .await?;

            if let Some(receipt) = receipt {
                if !receipt.succeeded() {
                    warn!(target: "registry", tx_hash = %self.tx_hash, "transaction reverted");
                    return Err(RegistryError::ContractRevert { reason: None });
                }
                let depth = if self.confirmations > 1 {
                    let head: U64 =
                        request_typed(extension, methods::ETH_BLOCK_NUMBER, json!([])).await?;
                    head.to::<u64>().saturating_sub(receipt.block_number()) + 1
                } else {
                    1
                };
                if depth >= self.confirmations {
                    debug!(
                        target: "registry",
                        tx_hash = %self.tx_hash,
                        block = receipt.block_number(),
                        "transaction confirmed"
                    );
                    return Ok(receipt);
                }
                trace!(
                    target: "registry",
                    depth,
                    required = self.confirmations,
                    "awaiting confirmations"
                );
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
