//! Integration tests for the authentication lifecycle.

use bazaar_core::Role;
use bazaar_integration_tests::{PASSWORD, TestMarket, password};
use bazaar_storefront::AuthError;
use secrecy::SecretString;

#[tokio::test]
async fn test_check_auth_without_session() {
    let market = TestMarket::new();
    let auth = market.storefront.auth();
    assert!(auth.is_loading());

    auth.check_auth().await;

    assert!(auth.identity().is_none());
    assert!(!auth.is_loading());
}

#[tokio::test]
async fn test_sign_in_then_check_auth_restores_identity() {
    let market = TestMarket::new();
    let identity = market.signed_in("ada@example.com", Role::Seller).await;

    // A second storefront sharing the backend picks the session up.
    let other = bazaar_storefront::Storefront::new(std::sync::Arc::new(market.backend.clone()));
    other.auth().check_auth().await;

    assert_eq!(other.auth().identity(), Some(identity));
    assert_eq!(other.auth().role(), Some(Role::Seller));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let market = TestMarket::new();
    market.user("ada@example.com", Role::Customer);

    let err = market
        .storefront
        .auth()
        .sign_in("ada@example.com", &SecretString::from("nope-nope"))
        .await
        .expect_err("wrong password must fail");

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(market.storefront.auth().identity().is_none());
}

#[tokio::test]
async fn test_sign_up_then_sign_in() {
    let market = TestMarket::new();
    let auth = market.storefront.auth();

    let created = auth
        .sign_up("new@example.com", &password(), "New Seller", Role::Seller)
        .await
        .expect("sign-up should succeed");
    assert_eq!(created.role, Role::Seller);

    market.storefront.sign_out().await;
    assert!(auth.identity().is_none());

    let signed_in = auth
        .sign_in("new@example.com", &password())
        .await
        .expect("new account should sign in");
    assert_eq!(signed_in.id, created.id);
}

#[tokio::test]
async fn test_sign_up_twice_is_rejected() {
    let market = TestMarket::new();
    market.user("taken@example.com", Role::Customer);

    let err = market
        .storefront
        .auth()
        .sign_up("taken@example.com", &password(), "Again", Role::Customer)
        .await
        .expect_err("duplicate sign-up must fail");
    assert!(matches!(err, AuthError::UserAlreadyExists));
}

#[tokio::test]
async fn test_admin_cannot_self_register() {
    let market = TestMarket::new();
    let err = market
        .storefront
        .auth()
        .sign_up("boss@example.com", &SecretString::from(PASSWORD), "Boss", Role::Admin)
        .await
        .expect_err("admin sign-up must fail");
    assert!(matches!(err, AuthError::RoleNotSelfService(Role::Admin)));
}
