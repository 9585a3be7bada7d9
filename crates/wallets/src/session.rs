//! Wallet connection lifecycle.
//!
//! A [`WalletSession`] owns the connection to one wallet extension. Its state is reconciled
//! against the extension's notifications through the pure [`transition`] function, which keeps
//! the event handling testable without a real extension.

use crate::{
    eip1193::{Eip1193, ProviderEvent, ProviderRpcError, methods, request_typed},
    error::WalletError,
};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use parking_lot::Mutex;
use serde_json::json;
use std::{fmt, sync::Arc};
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};

/// A capability to authorize state-changing calls as one account.
#[derive(Clone)]
pub struct ExtensionSigner {
    address: Address,
    extension: Arc<dyn Eip1193>,
}

impl ExtensionSigner {
    pub fn new(address: Address, extension: Arc<dyn Eip1193>) -> Self {
        Self { address, extension }
    }

    /// The account this signer acts for.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The extension that performs the signing.
    pub fn extension(&self) -> &Arc<dyn Eip1193> {
        &self.extension
    }

    /// Asks the extension to sign and broadcast a call to `to`.
    ///
    /// This prompts the user. Returns the transaction hash once the extension has broadcast it.
    pub async fn send_transaction(
        &self,
        to: Address,
        input: Bytes,
    ) -> Result<TxHash, ProviderRpcError> {
        let tx = TransactionRequest::default()
            .from(self.address)
            .to(to)
            .input(TransactionInput::both(input));
        request_typed(&*self.extension, methods::ETH_SEND_TRANSACTION, json!([tx])).await
    }
}

impl fmt::Debug for ExtensionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionSigner").field("address", &self.address).finish_non_exhaustive()
    }
}

/// What an extension notification does to a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Leave the session as it is.
    Ignore,
    /// Drop the signer and address.
    Disconnect,
    /// Keep the connection but act for a different account.
    SwitchAccount(Address),
    /// Tear the whole session down; chain specific state can not be reused.
    Reset,
}

/// Decides how a session connected as `connected` reacts to `event`.
///
/// Account changes while disconnected are ignored: only an explicit connect may establish a
/// connection.
pub fn transition(connected: Option<Address>, event: &ProviderEvent) -> Transition {
    match event {
        ProviderEvent::AccountsChanged(accounts) => match (accounts.first(), connected) {
            (None, _) => Transition::Disconnect,
            (Some(_), None) => Transition::Ignore,
            (Some(primary), Some(current)) if *primary == current => Transition::Ignore,
            (Some(primary), Some(_)) => Transition::SwitchAccount(*primary),
        },
        ProviderEvent::ChainChanged(_) => Transition::Reset,
    }
}

/// A point-in-time view of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub address: Option<Address>,
    pub is_connecting: bool,
    pub error: Option<String>,
}

type PendingConnect = Shared<BoxFuture<'static, Result<ExtensionSigner, WalletError>>>;

#[derive(Default)]
struct SessionInner {
    /// `Some` iff connected; the address lives in the signer.
    signer: Option<ExtensionSigner>,
    error: Option<String>,
    /// The in-flight account request, tagged with its attempt number.
    pending: Option<(u64, PendingConnect)>,
    attempts: u64,
    /// Bumped on every disconnect or reset; attempts started before a bump are void.
    resets: u64,
}

impl SessionInner {
    fn reset(&mut self) {
        self.signer = None;
        self.error = None;
        self.pending = None;
        self.resets += 1;
    }
}

/// The connection to a wallet extension.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct WalletSession {
    extension: Option<Arc<dyn Eip1193>>,
    inner: Arc<Mutex<SessionInner>>,
}

impl WalletSession {
    /// Creates a session over `extension`, `None` if no extension was detected.
    pub fn new(extension: Option<Arc<dyn Eip1193>>) -> Self {
        Self { extension, inner: Default::default() }
    }

    /// Creates a session over a detected extension.
    pub fn with_extension(extension: Arc<dyn Eip1193>) -> Self {
        Self::new(Some(extension))
    }

    /// Returns the extension, failing with [`WalletError::NoWallet`] if there is none.
    pub fn extension(&self) -> Result<&Arc<dyn Eip1193>, WalletError> {
        self.extension.as_ref().ok_or(WalletError::NoWallet)
    }

    pub fn has_extension(&self) -> bool {
        self.extension.is_some()
    }

    /// The connected account, if any.
    pub fn address(&self) -> Option<Address> {
        self.inner.lock().signer.as_ref().map(ExtensionSigner::address)
    }

    /// The signer for the connected account, if any.
    pub fn signer(&self) -> Option<ExtensionSigner> {
        self.inner.lock().signer.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().signer.is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    /// The message of the last failed connection attempt.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock();
        SessionSnapshot {
            address: inner.signer.as_ref().map(ExtensionSigner::address),
            is_connecting: inner.pending.is_some(),
            error: inner.error.clone(),
        }
    }

    /// Requests account access and connects the session.
    ///
    /// May prompt the user. Calls made while an attempt is in flight join that attempt instead of
    /// prompting again.
    pub async fn connect(&self) -> Result<ExtensionSigner, WalletError> {
        let extension = self.extension()?.clone();
        let (id, resets, attempt) = {
            let mut inner = self.inner.lock();
            let resets = inner.resets;
            match inner.pending.clone() {
                Some((id, attempt)) => {
                    debug!(target: "wallet", "joining in-flight connection attempt");
                    (id, resets, attempt)
                }
                None => {
                    inner.attempts += 1;
                    let id = inner.attempts;
                    let attempt = request_accounts(extension).boxed().shared();
                    inner.pending = Some((id, attempt.clone()));
                    inner.error = None;
                    (id, resets, attempt)
                }
            }
        };

        let result = attempt.await;

        let mut inner = self.inner.lock();
        if inner.resets != resets {
            debug!(target: "wallet", "connection attempt superseded by a disconnect");
            return Err(WalletError::NotConnected);
        }
        // the first waiter to finish settles the attempt
        if inner.pending.as_ref().is_some_and(|(pending, _)| *pending == id) {
            inner.pending = None;
            match &result {
                Ok(signer) => {
                    info!(target: "wallet", address = %signer.address(), "wallet connected");
                    inner.signer = Some(signer.clone());
                }
                Err(err) => {
                    warn!(target: "wallet", %err, "wallet connection failed");
                    inner.error = Some(err.to_string());
                }
            }
        }
        result
    }

    /// Returns the connected signer, connecting first if necessary.
    pub async fn ensure_signer(&self) -> Result<ExtensionSigner, WalletError> {
        match self.signer() {
            Some(signer) => Ok(signer),
            None => self.connect().await,
        }
    }

    /// Forgets the connection locally.
    ///
    /// The extension keeps its permission grant; EIP-1193 has no way to revoke it silently.
    pub fn disconnect(&self) {
        self.inner.lock().reset();
        debug!(target: "wallet", "wallet disconnected");
    }

    /// Returns the account the extension already authorized, without prompting.
    ///
    /// `None` if there is no extension, no authorized account, or the probe failed.
    pub async fn current_address(&self) -> Option<Address> {
        let extension = self.extension.as_ref()?;
        match request_typed::<Vec<Address>>(&**extension, methods::ETH_ACCOUNTS, json!([])).await {
            Ok(accounts) => accounts.first().copied(),
            Err(err) => {
                debug!(target: "wallet", %err, "account probe failed");
                None
            }
        }
    }

    /// Adopts an account the extension already authorized, without prompting.
    pub async fn restore(&self) -> Option<Address> {
        let address = self.current_address().await?;
        let extension = self.extension.clone()?;
        let mut inner = self.inner.lock();
        let signer = inner.signer.get_or_insert_with(|| {
            debug!(target: "wallet", %address, "restored authorized account");
            ExtensionSigner::new(address, extension)
        });
        Some(signer.address())
    }

    /// Applies an extension notification to the session.
    pub async fn handle_event(&self, event: ProviderEvent) {
        let outcome = {
            let mut inner = self.inner.lock();
            let connected = inner.signer.as_ref().map(ExtensionSigner::address);
            let outcome = transition(connected, &event);
            match outcome {
                Transition::Ignore => {}
                Transition::Disconnect => inner.reset(),
                Transition::SwitchAccount(address) => {
                    if let Some(signer) = inner.signer.as_mut() {
                        signer.address = address;
                    }
                }
                Transition::Reset => inner.reset(),
            }
            outcome
        };
        debug!(target: "wallet", ?event, ?outcome, "applied wallet event");

        // a chain switch tears the session down, then re-detects a prior authorization like a
        // fresh load would
        if outcome == Transition::Reset {
            self.restore().await;
        }
    }

    /// Spawns a task that applies the extension's notifications to this session.
    ///
    /// Returns `None` if there is no extension. Abort the handle to stop listening.
    pub fn listen(&self) -> Option<JoinHandle<()>> {
        let mut events = self.extension.as_ref()?.subscribe();
        let session = self.clone();
        Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => session.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "wallet", skipped, "missed wallet events, reconciling");
                        let accounts = session.current_address().await.into_iter().collect();
                        session.handle_event(ProviderEvent::AccountsChanged(accounts)).await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            trace!(target: "wallet", "wallet event stream closed");
        }))
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("has_extension", &self.has_extension())
            .field("state", &self.snapshot())
            .finish()
    }
}

async fn request_accounts(extension: Arc<dyn Eip1193>) -> Result<ExtensionSigner, WalletError> {
    let accounts: Vec<Address> =
        request_typed(&*extension, methods::ETH_REQUEST_ACCOUNTS, json!([])).await?;
    let address = accounts.first().copied().ok_or(WalletError::NotConnected)?;
    Ok(ExtensionSigner::new(address, extension))
}
