use crate::client::{ADMIN, ISSUER, USER, client};
use certify_registry::{ErrorKind, Role};
use certify_test_utils::{MockWallet, init_tracing};
use std::sync::Arc;

async fn role_of(wallet: &Arc<MockWallet>, account: alloy_primitives::Address) -> Role {
    wallet.set_accounts(vec![account]);
    client(wallet).check_role().await.unwrap()
}

#[tokio::test]
async fn resolves_roles() {
    init_tracing();
    let wallet = Arc::new(MockWallet::new(ADMIN));

    let admin = client(&wallet);
    admin.add_issuer(&ISSUER.to_string()).await.unwrap().wait().await.unwrap();
    assert!(admin.is_issuer(ISSUER).await.unwrap());
    assert!(!admin.is_issuer(USER).await.unwrap());

    assert_eq!(role_of(&wallet, ADMIN).await, Role::Admin);
    assert_eq!(role_of(&wallet, ISSUER).await, Role::Issuer);
    assert_eq!(role_of(&wallet, USER).await, Role::User);
}

#[tokio::test]
async fn admin_wins_over_issuer_grant() {
    let wallet = Arc::new(MockWallet::new(ADMIN));
    wallet.with_ledger(|ledger| ledger.grant_issuer(ADMIN));
    assert_eq!(role_of(&wallet, ADMIN).await, Role::Admin);
}

#[tokio::test]
async fn lowercase_issuer_address_is_accepted() {
    let wallet = Arc::new(MockWallet::new(ADMIN));
    let admin = client(&wallet);
    let lower = format!("{ISSUER:#x}");
    admin.add_issuer(&lower).await.unwrap().wait().await.unwrap();
    assert_eq!(role_of(&wallet, ISSUER).await, Role::Issuer);
}

#[tokio::test]
async fn only_admin_adds_issuers() {
    let wallet = Arc::new(MockWallet::new(ADMIN));
    wallet.set_accounts(vec![USER]);

    let err = client(&wallet).add_issuer(&ISSUER.to_string()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContractRevert);
    assert!(!wallet.with_ledger(|ledger| ledger.is_issuer(ISSUER)));
}

#[tokio::test]
async fn role_requires_connection() {
    let wallet = Arc::new(MockWallet::new(ADMIN));
    wallet.reject_account_requests(true);

    let err = client(&wallet).check_role().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserRejected);
}
