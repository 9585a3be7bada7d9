//! A wallet extension backed by a JSON-RPC node and an optional local signer.
//!
//! Lets the session and contract layers run headless, e.g. from the CLI: account requests are
//! answered with the local signer's address, transactions are filled, signed and broadcast
//! through an alloy provider, everything else is forwarded to the node.

use crate::eip1193::{Eip1193, ProviderEvent, ProviderRpcError, methods};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, ChainId};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use serde_json::{Value, json};
use std::fmt;
use tokio::sync::broadcast;
use url::Url;

/// An [`Eip1193`] implementation over an RPC endpoint.
///
/// A node can not change chains, so `wallet_switchEthereumChain` only succeeds for the chain the
/// node is already on. No notifications are ever published.
#[derive(Clone)]
pub struct RpcWallet {
    provider: DynProvider,
    account: Option<Address>,
    events: broadcast::Sender<ProviderEvent>,
}

impl RpcWallet {
    /// Connects to the node at `url`, signing with `signer` if given.
    pub fn connect_http(url: &str, signer: Option<PrivateKeySigner>) -> Result<Self> {
        let url: Url = url.parse().wrap_err_with(|| format!("invalid rpc url: {url:?}"))?;
        let account = signer.as_ref().map(Signer::address);
        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url)
                .erased(),
            None => ProviderBuilder::new().connect_http(url).erased(),
        };
        Ok(Self::new(provider, account))
    }

    /// Wraps an existing provider; `account` must be signable by it.
    pub fn new(provider: DynProvider, account: Option<Address>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { provider, account, events }
    }

    /// The account transactions are sent from.
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError> {
        self.provider.get_chain_id().await.map_err(from_transport)
    }

    async fn switch_chain(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let requested = params
            .get(0)
            .and_then(|p| p.get("chainId"))
            .and_then(Value::as_str)
            .and_then(|id| ChainId::from_str_radix(id.trim_start_matches("0x"), 16).ok())
            .ok_or_else(|| ProviderRpcError::new(-32602, "expected `[{ chainId }]` params"))?;
        if requested == self.chain_id().await? {
            Ok(Value::Null)
        } else {
            Err(ProviderRpcError::unrecognized_chain(requested))
        }
    }

    async fn send_transaction(&self, params: Value) -> Result<Value, ProviderRpcError> {
        if self.account.is_none() {
            return Err(ProviderRpcError::unauthorized(
                "no signer configured; pass a private key to send transactions",
            ));
        }
        let tx = params
            .get(0)
            .cloned()
            .ok_or_else(|| ProviderRpcError::new(-32602, "missing transaction"))?;
        let tx: TransactionRequest = serde_json::from_value(tx)
            .map_err(|err| ProviderRpcError::new(-32602, format!("invalid transaction: {err}")))?;
        let pending = self.provider.send_transaction(tx).await.map_err(from_transport)?;
        debug!(target: "wallet::rpc", tx_hash = %pending.tx_hash(), "broadcast transaction");
        Ok(json!(pending.tx_hash()))
    }
}

#[async_trait]
impl Eip1193 for RpcWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        trace!(target: "wallet::rpc", method, %params, "request");
        match method {
            methods::ETH_REQUEST_ACCOUNTS => match self.account {
                Some(account) => Ok(json!([account])),
                None => Err(ProviderRpcError::unauthorized(
                    "no signer configured; pass a private key to connect",
                )),
            },
            methods::ETH_ACCOUNTS => Ok(json!(self.account.into_iter().collect::<Vec<_>>())),
            methods::ETH_CHAIN_ID => Ok(json!(format!("{:#x}", self.chain_id().await?))),
            methods::WALLET_SWITCH_ETHEREUM_CHAIN => self.switch_chain(&params).await,
            methods::ETH_SEND_TRANSACTION => self.send_transaction(params).await,
            _ => self
                .provider
                .raw_request::<_, Value>(method.to_string().into(), params)
                .await
                .map_err(from_transport),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

impl fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcWallet").field("account", &self.account).finish_non_exhaustive()
    }
}

/// Converts a transport failure into the error shape an extension would report.
fn from_transport(err: TransportError) -> ProviderRpcError {
    match err.as_error_resp() {
        Some(payload) => ProviderRpcError {
            code: payload.code,
            message: payload.message.to_string(),
            data: payload.data.as_ref().and_then(|raw| serde_json::from_str(raw.get()).ok()),
        },
        None => ProviderRpcError::internal(err.to_string()),
    }
}
