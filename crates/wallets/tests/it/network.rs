use alloy_primitives::address;
use certify_test_utils::{MockWallet, SEPOLIA, SwitchBehavior};
use certify_wallets::{NetworkGuard, WalletError, eip1193::methods};

fn wallet() -> MockWallet {
    MockWallet::new(address!("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"))
}

#[tokio::test]
async fn no_switch_on_required_chain() {
    let wallet = wallet();
    let guard = NetworkGuard::new(SEPOLIA);

    guard.ensure_network(&wallet).await.unwrap();
    guard.ensure_network(&wallet).await.unwrap();
    assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 0);
}

#[tokio::test]
async fn switches_to_required_chain() {
    let wallet = wallet();
    wallet.set_chain_id(1);
    let guard = NetworkGuard::new(SEPOLIA);

    guard.ensure_network(&wallet).await.unwrap();
    assert_eq!(wallet.chain_id(), SEPOLIA);
    assert_eq!(NetworkGuard::current_chain(&wallet).await.unwrap(), SEPOLIA);

    // now a no-op
    guard.ensure_network(&wallet).await.unwrap();
    assert_eq!(wallet.request_count(methods::WALLET_SWITCH_ETHEREUM_CHAIN), 1);
}

#[tokio::test]
async fn failed_switch_is_mismatch() {
    for behavior in [SwitchBehavior::Reject, SwitchBehavior::Unsupported, SwitchBehavior::Ignore] {
        let wallet = wallet();
        wallet.set_chain_id(1);
        wallet.set_switch_behavior(behavior);

        let err = NetworkGuard::new(SEPOLIA).ensure_network(&wallet).await.unwrap_err();
        match err {
            WalletError::NetworkMismatch { expected, actual, ref name } => {
                assert_eq!(expected, SEPOLIA);
                assert_eq!(actual, 1);
                assert_eq!(name, "sepolia");
            }
            _ => panic!("unexpected error for {behavior:?}: {err:?}"),
        }
        assert_eq!(wallet.chain_id(), 1);
    }
}
