use alloy_primitives::{Address, address};
use certify_registry::{ContractClient, ErrorKind, RegistryError};
use certify_test_utils::{MockWallet, SEPOLIA, SwitchBehavior, init_tracing};
use certify_wallets::{WalletSession, eip1193::methods};
use chrono::DateTime;
use std::{sync::Arc, time::Duration};

pub const ADMIN: Address = address!("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
pub const ISSUER: Address = address!("0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB");
pub const USER: Address = address!("0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC");
const CONTRACT: Address = address!("0xBeF4EeDe07f7c40e24E523F0Ecc707F3B4621cEd");

pub fn client(wallet: &Arc<MockWallet>) -> ContractClient {
    let session = WalletSession::with_extension(wallet.clone());
    ContractClient::new(session, SEPOLIA, CONTRACT).with_poll_interval(Duration::from_millis(10))
}

fn setup() -> (Arc<MockWallet>, ContractClient) {
    init_tracing();
    let wallet = Arc::new(MockWallet::new(ADMIN));
    let client = client(&wallet);
    (wallet, client)
}

#[tokio::test]
async fn issue_then_verify() {
    let (wallet, client) = setup();

    let pending = client.issue_certificate("CERT-1", "Alice", "Rust 101", "QmHash").await.unwrap();
    let receipt = pending.wait().await.unwrap();
    assert!(receipt.succeeded());

    let cert = client.verify_certificate("CERT-1").await.unwrap().expect("certificate exists");
    let issued_at = wallet.with_ledger(|ledger| ledger.certificate("CERT-1").unwrap().issued_at);
    assert_eq!(cert.certificate_id, "CERT-1");
    assert_eq!(cert.student_name, "Alice");
    assert_eq!(cert.course_name, "Rust 101");
    assert_eq!(cert.ipfs_hash, "QmHash");
    assert_eq!(cert.issuer_address, ADMIN);
    assert_eq!(cert.issued_at, DateTime::from_timestamp(issued_at as i64, 0).unwrap());
    assert!(cert.is_valid);
}

#[tokio::test]
async fn unknown_certificate_is_absent() {
    let (wallet, client) = setup();
    assert_eq!(client.verify_certificate("never-issued").await.unwrap(), None);
    // reads never prompt
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 0);
    assert_eq!(wallet.request_count(methods::ETH_SEND_TRANSACTION), 0);
}

#[tokio::test]
async fn duplicate_issue_reverts() {
    let (wallet, client) = setup();
    client
        .issue_certificate("CERT-1", "Alice", "Rust 101", "QmHash")
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    let err =
        client.issue_certificate("CERT-1", "Mallory", "Rust 101", "QmOther").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContractRevert);
    assert_eq!(err.to_string(), "transaction reverted: Certificate already exists");

    assert_eq!(wallet.with_ledger(|ledger| ledger.certificate_count()), 1);
    let cert = client.verify_certificate("CERT-1").await.unwrap().unwrap();
    assert_eq!(cert.student_name, "Alice");
}

#[tokio::test]
async fn revoke_invalidates() {
    let (_wallet, client) = setup();
    let pending = client.issue_certificate("CERT-1", "Alice", "Rust 101", "QmHash").await.unwrap();
    pending.wait().await.unwrap();
    client.revoke_certificate("CERT-1").await.unwrap().wait().await.unwrap();

    let cert = client.verify_certificate("CERT-1").await.unwrap().unwrap();
    assert!(!cert.is_valid);
    assert_eq!(cert.student_name, "Alice");

    let err = client.revoke_certificate("CERT-2").await.unwrap_err();
    assert_eq!(err.to_string(), "transaction reverted: Certificate does not exist");
}

#[tokio::test]
async fn unauthorized_issuer_reverts() {
    let (wallet, _) = setup();
    wallet.set_accounts(vec![USER]);
    let client = client(&wallet);

    let err = client.issue_certificate("CERT-1", "Alice", "Rust 101", "QmHash").await.unwrap_err();
    assert_eq!(err.to_string(), "transaction reverted: Not an authorized issuer");
    assert_eq!(wallet.with_ledger(|ledger| ledger.certificate_count()), 0);
}

#[tokio::test]
async fn rejected_transaction() {
    let (wallet, client) = setup();
    wallet.reject_transactions(true);

    let err = client.issue_certificate("CERT-1", "Alice", "Rust 101", "QmHash").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserRejected);
    assert_eq!(wallet.with_ledger(|ledger| ledger.certificate_count()), 0);
}

#[tokio::test]
async fn failed_receipt_is_revert() {
    let (wallet, client) = setup();
    wallet.fail_receipts(true);

    let pending = client.issue_certificate("CERT-1", "Alice", "Rust 101", "QmHash").await.unwrap();
    let err = pending.wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContractRevert);
    assert_eq!(client.verify_certificate("CERT-1").await.unwrap(), None);
}

#[tokio::test]
async fn waits_for_confirmations() {
    let (wallet, client) = setup();
    let client = client.with_confirmations(3);

    let pending = client.issue_certificate("CERT-1", "Alice", "Rust 101", "QmHash").await.unwrap();
    let mined_in = wallet.block_number();
    let wait = tokio::spawn(pending.wait());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!wait.is_finished());

    wallet.mine(2);
    let receipt =
        tokio::time::timeout(Duration::from_secs(5), wait).await.unwrap().unwrap().unwrap();
    assert_eq!(receipt.block_number(), mined_in);
}

#[tokio::test]
async fn invalid_issuer_address_sends_nothing() {
    let (wallet, client) = setup();

    let err = client.add_issuer("not-an-address").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, RegistryError::Validation { field: "issuerAddress", .. }));
    assert!(wallet.requests().is_empty());
}

#[tokio::test]
async fn empty_fields_send_nothing() {
    let (wallet, client) = setup();

    let err = client.issue_certificate("CERT-1", "  ", "Rust 101", "QmHash").await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation { field: "studentName", .. }));
    assert_eq!(err.to_string(), "Student name is required");

    let err = client.issue_certificate("", "Alice", "Rust 101", "QmHash").await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation { field: "certificateId", .. }));

    let err = client.revoke_certificate("").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(wallet.requests().is_empty());
}

#[tokio::test]
async fn network_guard_is_idempotent() {
    let (wallet, client) = setup();
    client.verify_certificate("CERT-1").await.unwrap();
    client.check_admin().await.unwrap();
    assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 0);
    assert_eq!(wallet.request_count(methods::ETH_CHAIN_ID), 2);
}

#[tokio::test]
async fn switches_network_before_calling() {
    let (wallet, client) = setup();
    wallet.set_chain_id(1);

    client.verify_certificate("CERT-1").await.unwrap();
    assert_eq!(wallet.chain_id(), SEPOLIA);
    assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 1);

    let requests = wallet.requests();
    let switch = requests.iter().position(|m| m == methods::WALLET_SWITCH_ETHEREUM_CHAIN).unwrap();
    let call = requests.iter().position(|m| m == methods::ETH_CALL).unwrap();
    assert!(switch < call);
}

#[tokio::test]
async fn declined_switch_blocks_calls() {
    for behavior in [SwitchBehavior::Reject, SwitchBehavior::Unsupported, SwitchBehavior::Ignore] {
        let (wallet, client) = setup();
        wallet.set_chain_id(1);
        wallet.set_switch_behavior(behavior);

        let err = client.verify_certificate("CERT-1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkMismatch, "{behavior:?}");
        assert!(err.to_string().contains("switch to sepolia manually"), "{err}");
        assert_eq!(wallet.request_count(methods::ETH_CALL), 0);

        let err =
            client.issue_certificate("CERT-1", "Alice", "Rust 101", "QmHash").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkMismatch);
        assert_eq!(wallet.request_count(methods::ETH_SEND_TRANSACTION), 0);
    }
}

#[tokio::test]
async fn no_wallet() {
    let client = ContractClient::new(WalletSession::new(None), SEPOLIA, CONTRACT);
    let err = client.verify_certificate("CERT-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoWallet);
    let err = client.check_role().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoWallet);
}

#[tokio::test]
async fn check_admin_does_not_prompt() {
    let (wallet, client) = setup();
    assert_eq!(client.check_admin().await.unwrap(), ADMIN);
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 0);
}
