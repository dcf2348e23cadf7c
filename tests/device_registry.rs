mod common;

use noemovibe_server::entities::User;
use noemovibe_server::sea_orm::{EntityTrait, PaginatorTrait};
use noemovibe_server::Error;

use common::setup_store;

#[tokio::test]
async fn registering_twice_reuses_the_same_user() {
    let store = setup_store().await;

    let first = store.register_device("device-a").await.unwrap();
    let second = store.register_device("device-a").await.unwrap();

    assert!(first.created);
    assert_eq!(first.message(), "Device registered successfully");
    assert!(!second.created);
    assert_eq!(second.message(), "Device already exists");
    assert_eq!(first.user.user_id, second.user.user_id);
    assert_eq!(second.user.device_id, "device-a");

    let users = User::find().count(store.connection()).await.unwrap();
    assert_eq!(users, 1);
}

#[tokio::test]
async fn distinct_devices_get_distinct_users() {
    let store = setup_store().await;

    let a = store.register_device("device-a").await.unwrap();
    let b = store.register_device("device-b").await.unwrap();

    assert!(a.created && b.created);
    assert_ne!(a.user.user_id, b.user.user_id);
}

#[tokio::test]
async fn blank_device_id_is_an_invalid_request() {
    let store = setup_store().await;

    let err = store.register_device("  ").await.unwrap_err();

    assert!(matches!(err, Error::InvalidRequest(_)));
    let users = User::find().count(store.connection()).await.unwrap();
    assert_eq!(users, 0);
}
