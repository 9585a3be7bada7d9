use alloy_primitives::{Address, address};
use certify_test_utils::{MockWallet, init_tracing};
use certify_wallets::{ProviderEvent, SessionSnapshot, WalletError, WalletSession, eip1193::methods};
use std::{sync::Arc, time::Duration};

const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

fn setup() -> (Arc<MockWallet>, WalletSession) {
    init_tracing();
    let wallet = Arc::new(MockWallet::new(ALICE));
    wallet.set_accounts(vec![ALICE, BOB]);
    let session = WalletSession::with_extension(wallet.clone());
    (wallet, session)
}

/// Polls `f` until it holds or a second has passed.
async fn eventually(mut f: impl FnMut() -> bool) {
    for _ in 0..100 {
        if f() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn connects() {
    let (wallet, session) = setup();
    assert!(!session.is_connected());

    let signer = session.connect().await.unwrap();
    assert_eq!(signer.address(), ALICE);
    assert_eq!(session.address(), Some(ALICE));
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 1);

    // already connected
    session.ensure_signer().await.unwrap();
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 1);
}

#[tokio::test]
async fn concurrent_connects_share_one_prompt() {
    let (wallet, session) = setup();
    wallet.delay_account_requests(Duration::from_millis(50));

    let (a, b, c) = tokio::join!(session.connect(), session.connect(), session.connect());
    assert_eq!(a.unwrap().address(), ALICE);
    assert_eq!(b.unwrap().address(), ALICE);
    assert_eq!(c.unwrap().address(), ALICE);
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 1);
    assert!(!session.is_connecting());
}

#[tokio::test]
async fn reports_connecting() {
    let (wallet, session) = setup();
    wallet.delay_account_requests(Duration::from_millis(100));

    let connecting = tokio::spawn({
        let session = session.clone();
        async move { session.connect().await }
    });
    eventually(|| session.is_connecting()).await;
    connecting.await.unwrap().unwrap();
    assert!(!session.is_connecting());
    assert!(session.is_connected());
}

#[tokio::test]
async fn disconnect_voids_in_flight_connect() {
    let (wallet, session) = setup();
    wallet.delay_account_requests(Duration::from_millis(100));

    let connecting = tokio::spawn({
        let session = session.clone();
        async move { session.ensure_signer().await }
    });
    eventually(|| session.is_connecting()).await;
    session.disconnect();

    let err = connecting.await.unwrap().unwrap_err();
    assert!(matches!(err, WalletError::NotConnected), "{err:?}");
    assert!(!session.is_connected());
    assert!(!session.is_connecting());

    // the next attempt starts over
    wallet.delay_account_requests(Duration::ZERO);
    assert_eq!(session.connect().await.unwrap().address(), ALICE);
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 2);
}

#[tokio::test]
async fn rejected_connect() {
    let (wallet, session) = setup();
    wallet.reject_account_requests(true);

    let err = session.connect().await.unwrap_err();
    assert!(matches!(err, WalletError::UserRejected(_)), "{err:?}");
    let snapshot = session.snapshot();
    assert_eq!(snapshot.address, None);
    assert!(!snapshot.is_connecting);
    assert!(snapshot.error.is_some());

    // a later attempt prompts again
    wallet.reject_account_requests(false);
    session.connect().await.unwrap();
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 2);
    assert_eq!(session.last_error(), None);
}

#[tokio::test]
async fn no_accounts_is_not_connected() {
    let (wallet, session) = setup();
    wallet.set_accounts(vec![]);
    assert!(matches!(session.connect().await, Err(WalletError::NotConnected)));
    assert!(!session.is_connected());
}

#[tokio::test]
async fn disconnect_is_local() {
    let (_wallet, session) = setup();
    session.connect().await.unwrap();

    session.disconnect();
    assert_eq!(session.snapshot(), SessionSnapshot::default());
    // the wallet still remembers the grant
    assert_eq!(session.current_address().await, Some(ALICE));
}

#[tokio::test]
async fn empty_accounts_disconnects() {
    let (_wallet, session) = setup();
    session.connect().await.unwrap();

    session.handle_event(ProviderEvent::AccountsChanged(vec![])).await;
    assert_eq!(session.address(), None);
    assert!(session.signer().is_none());
}

#[tokio::test]
async fn accounts_while_disconnected_are_ignored() {
    let (_wallet, session) = setup();
    session.handle_event(ProviderEvent::AccountsChanged(vec![BOB])).await;
    assert_eq!(session.address(), None);
}

#[tokio::test]
async fn adopts_switched_account() {
    let (_wallet, session) = setup();
    session.connect().await.unwrap();

    session.handle_event(ProviderEvent::AccountsChanged(vec![BOB, ALICE])).await;
    assert_eq!(session.address(), Some(BOB));
    assert_eq!(session.signer().unwrap().address(), BOB);
}

#[tokio::test]
async fn chain_change_resets_and_restores() {
    let (wallet, session) = setup();
    session.connect().await.unwrap();

    wallet.set_chain_id(1);
    session.handle_event(ProviderEvent::ChainChanged(1)).await;
    // the grant survives the reset, so the account is adopted again
    assert_eq!(session.address(), Some(ALICE));

    wallet.set_authorized(false);
    session.handle_event(ProviderEvent::ChainChanged(5)).await;
    assert_eq!(session.address(), None);
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 1);
}

#[tokio::test]
async fn restores_prior_authorization_silently() {
    let (wallet, session) = setup();
    assert_eq!(session.restore().await, None);

    wallet.set_authorized(true);
    assert_eq!(session.current_address().await, Some(ALICE));
    assert_eq!(session.restore().await, Some(ALICE));
    assert!(session.is_connected());
    assert_eq!(wallet.request_count(methods::ETH_REQUEST_ACCOUNTS), 0);
}

#[tokio::test]
async fn listens_for_wallet_events() {
    let (wallet, session) = setup();
    let listener = session.listen().unwrap();
    session.connect().await.unwrap();

    wallet.switch_account(BOB);
    eventually(|| session.address() == Some(BOB)).await;

    wallet.revoke_authorization();
    eventually(|| !session.is_connected()).await;

    // not reconnected by account changes alone
    wallet.emit(ProviderEvent::AccountsChanged(vec![ALICE]));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!session.is_connected());

    listener.abort();
}
