//! A scriptable wallet extension connected to an in-memory registry.

use crate::ledger::{Ledger, revert_data};
use alloy_primitives::{Address, Bytes, ChainId, TxHash, keccak256};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use certify_wallets::{Eip1193, ProviderEvent, ProviderRpcError, eip1193::methods};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::{collections::HashMap, time::Duration};
use tokio::sync::broadcast;

/// Sepolia's chain id.
pub const SEPOLIA: ChainId = 11_155_111;

const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
const BLOCK_TIME: u64 = 12;

/// How the wallet answers `wallet_switchEthereumChain`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwitchBehavior {
    /// Switch and publish `chainChanged`.
    #[default]
    Accept,
    /// The user declines the prompt.
    Reject,
    /// The chain was never added to the wallet.
    Unsupported,
    /// Acknowledge without switching.
    Ignore,
}

#[derive(Debug)]
struct Receipt {
    block_number: u64,
    success: bool,
}

#[derive(Debug)]
struct State {
    accounts: Vec<Address>,
    authorized: bool,
    chain_id: ChainId,
    switch: SwitchBehavior,
    reject_accounts: bool,
    reject_transactions: bool,
    fail_receipts: bool,
    account_delay: Option<Duration>,
    block_number: u64,
    nonce: u64,
    receipts: HashMap<TxHash, Receipt>,
    ledger: Ledger,
    requests: Vec<String>,
}

impl State {
    fn timestamp(&self) -> u64 {
        GENESIS_TIMESTAMP + self.block_number * BLOCK_TIME
    }

    fn exposed_accounts(&self) -> Vec<Address> {
        if self.authorized { self.accounts.clone() } else { Vec::new() }
    }
}

/// A mock [`Eip1193`] extension.
///
/// Starts on Sepolia with `admin` as its only account, not yet authorized. Transactions and
/// calls are executed against a [`Ledger`] administered by `admin`; every transaction is mined in
/// its own block right away. Every request is recorded.
#[derive(Debug)]
pub struct MockWallet {
    state: Mutex<State>,
    events: broadcast::Sender<ProviderEvent>,
}

impl MockWallet {
    pub fn new(admin: Address) -> Self {
        let (events, _) = broadcast::channel(64);
        let state = State {
            accounts: vec![admin],
            authorized: false,
            chain_id: SEPOLIA,
            switch: SwitchBehavior::default(),
            reject_accounts: false,
            reject_transactions: false,
            fail_receipts: false,
            account_delay: None,
            block_number: 1,
            nonce: 0,
            receipts: HashMap::new(),
            ledger: Ledger::new(admin),
            requests: Vec::new(),
        };
        Self { state: Mutex::new(state), events }
    }

    /// Sets the accounts exposed once authorized, primary first. Publishes nothing.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().accounts = accounts;
    }

    /// Marks the accounts as already authorized, as after a previous visit.
    pub fn set_authorized(&self, authorized: bool) {
        self.state.lock().authorized = authorized;
    }

    pub fn set_chain_id(&self, chain_id: ChainId) {
        self.state.lock().chain_id = chain_id;
    }

    pub fn set_switch_behavior(&self, switch: SwitchBehavior) {
        self.state.lock().switch = switch;
    }

    pub fn reject_account_requests(&self, reject: bool) {
        self.state.lock().reject_accounts = reject;
    }

    pub fn reject_transactions(&self, reject: bool) {
        self.state.lock().reject_transactions = reject;
    }

    /// Mines subsequent transactions with a failed status, without applying them.
    pub fn fail_receipts(&self, fail: bool) {
        self.state.lock().fail_receipts = fail;
    }

    /// Holds account requests for `delay` before answering them.
    pub fn delay_account_requests(&self, delay: Duration) {
        self.state.lock().account_delay = Some(delay);
    }

    /// Mines `blocks` empty blocks.
    pub fn mine(&self, blocks: u64) {
        self.state.lock().block_number += blocks;
    }

    /// Publishes `event` to subscribers without changing any state.
    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    /// The user picks another account in the wallet.
    pub fn switch_account(&self, account: Address) {
        let accounts = {
            let mut state = self.state.lock();
            state.accounts.retain(|a| *a != account);
            state.accounts.insert(0, account);
            state.exposed_accounts()
        };
        self.emit(ProviderEvent::AccountsChanged(accounts));
    }

    /// The user disconnects the site from the wallet.
    pub fn revoke_authorization(&self) {
        self.state.lock().authorized = false;
        self.emit(ProviderEvent::AccountsChanged(Vec::new()));
    }

    /// The user switches networks in the wallet.
    pub fn change_chain(&self, chain_id: ChainId) {
        self.state.lock().chain_id = chain_id;
        self.emit(ProviderEvent::ChainChanged(chain_id));
    }

    pub fn chain_id(&self) -> ChainId {
        self.state.lock().chain_id
    }

    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    /// Runs `f` against the registry state.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.state.lock().ledger)
    }

    /// Every method requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    /// How often `method` was requested.
    pub fn request_count(&self, method: &str) -> usize {
        self.state.lock().requests.iter().filter(|m| *m == method).count()
    }

    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }

    fn handle(
        &self,
        state: &mut State,
        method: &str,
        params: Value,
    ) -> Result<Value, ProviderRpcError> {
        match method {
            methods::ETH_REQUEST_ACCOUNTS => {
                if state.reject_accounts {
                    return Err(ProviderRpcError::user_rejected("User rejected the request."));
                }
                state.authorized = true;
                Ok(json!(state.accounts))
            }
            methods::ETH_ACCOUNTS => Ok(json!(state.exposed_accounts())),
            methods::ETH_CHAIN_ID => Ok(json!(format!("{:#x}", state.chain_id))),
            methods::WALLET_SWITCH_ETHEREUM_CHAIN => {
                let requested = params
                    .get(0)
                    .and_then(|p| p.get("chainId"))
                    .and_then(Value::as_str)
                    .and_then(|id| ChainId::from_str_radix(id.trim_start_matches("0x"), 16).ok())
                    .ok_or_else(|| ProviderRpcError::new(-32602, "invalid chainId"))?;
                match state.switch {
                    SwitchBehavior::Accept => {
                        if state.chain_id != requested {
                            state.chain_id = requested;
                            self.emit(ProviderEvent::ChainChanged(requested));
                        }
                        Ok(Value::Null)
                    }
                    SwitchBehavior::Reject => {
                        Err(ProviderRpcError::user_rejected("User rejected the request."))
                    }
                    SwitchBehavior::Unsupported => {
                        Err(ProviderRpcError::unrecognized_chain(requested))
                    }
                    SwitchBehavior::Ignore => Ok(Value::Null),
                }
            }
            methods::ETH_BLOCK_NUMBER => Ok(json!(format!("{:#x}", state.block_number))),
            methods::ETH_CALL => {
                let tx: TransactionRequest = first_param(&params)?;
                let input = tx.input.input().cloned().unwrap_or_default();
                let sender = tx.from.unwrap_or_default();
                let timestamp = state.timestamp();
                // calls never change state
                let mut ledger = state.ledger.clone();
                match ledger.execute(sender, &input, timestamp) {
                    Ok(output) => Ok(json!(Bytes::from(output))),
                    Err(reason) => Err(reverted(&reason)),
                }
            }
            methods::ETH_SEND_TRANSACTION => self.send_transaction(state, &params),
            methods::ETH_GET_TRANSACTION_RECEIPT => {
                let tx_hash: TxHash = first_param(&params)?;
                Ok(match state.receipts.get(&tx_hash) {
                    Some(receipt) => json!({
                        "transactionHash": tx_hash,
                        "blockNumber": format!("{:#x}", receipt.block_number),
                        "status": if receipt.success { "0x1" } else { "0x0" },
                    }),
                    None => Value::Null,
                })
            }
            _ => Err(ProviderRpcError::unsupported_method(method)),
        }
    }

    fn send_transaction(
        &self,
        state: &mut State,
        params: &Value,
    ) -> Result<Value, ProviderRpcError> {
        let tx: TransactionRequest = first_param(params)?;
        let sender = tx
            .from
            .filter(|from| state.exposed_accounts().contains(from))
            .ok_or_else(|| ProviderRpcError::unauthorized("sender is not an authorized account"))?;
        if state.reject_transactions {
            return Err(ProviderRpcError::user_rejected(
                "MetaMask Tx Signature: User denied transaction signature.",
            ));
        }
        let input = tx.input.input().cloned().unwrap_or_default();

        // gas estimation surfaces reverts before anything is signed
        let timestamp = GENESIS_TIMESTAMP + (state.block_number + 1) * BLOCK_TIME;
        let mut next = state.ledger.clone();
        next.execute(sender, &input, timestamp).map_err(|reason| reverted(&reason))?;

        state.nonce += 1;
        state.block_number += 1;
        let mut preimage = state.nonce.to_be_bytes().to_vec();
        preimage.extend_from_slice(&input);
        let tx_hash = keccak256(preimage);
        let success = !state.fail_receipts;
        if success {
            state.ledger = next;
        }
        state.receipts.insert(tx_hash, Receipt { block_number: state.block_number, success });
        Ok(json!(tx_hash))
    }
}

#[async_trait]
impl Eip1193 for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let delay = {
            let mut state = self.state.lock();
            state.requests.push(method.to_string());
            if method == methods::ETH_REQUEST_ACCOUNTS { state.account_delay } else { None }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock();
        self.handle(&mut state, method, params)
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

fn first_param<T: DeserializeOwned>(params: &Value) -> Result<T, ProviderRpcError> {
    let param = params.get(0).cloned().unwrap_or(Value::Null);
    serde_json::from_value(param)
        .map_err(|err| ProviderRpcError::new(-32602, format!("invalid params: {err}")))
}

fn reverted(reason: &str) -> ProviderRpcError {
    ProviderRpcError::reverted(format!("execution reverted: {reason}"), &revert_data(reason))
}
