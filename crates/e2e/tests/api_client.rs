//! Request helper against the mock backend

mod common;

use std::time::Duration;

use chargepoint_e2e::{ApiClient, E2eError};
use common::MockBackend;
use url::Url;

#[tokio::test]
async fn add_returns_created_charge_point() {
    let backend = MockBackend::spawn().await;
    let api = backend.client();

    let response = api.add_charge_point("SN-AB12CD34").await.unwrap();
    assert_eq!(response.status(), 201);

    let created: chargepoint_common::ChargePoint = response.json().unwrap();
    assert_eq!(created.serial_number, "SN-AB12CD34");
    assert!(!created.id.as_str().is_empty());
    assert_eq!(backend.serials(), vec!["SN-AB12CD34".to_string()]);
}

#[tokio::test]
async fn missing_content_type_is_rejected() {
    let backend = MockBackend::spawn().await;
    let api = backend.client();

    let response = api.add_charge_point_without_headers("SN-AB12CD34").await.unwrap();
    assert_eq!(response.status(), 400);
    assert!(backend.serials().is_empty());
}

#[tokio::test]
async fn missing_serial_field_is_rejected() {
    let backend = MockBackend::spawn().await;
    let response = backend.client().add_charge_point_without_body().await.unwrap();
    assert_eq!(response.status(), 400);
    assert!(response.body().contains("serialNumber"));
}

#[tokio::test]
async fn delete_statuses() {
    let backend = MockBackend::spawn().await;
    let api = backend.client();

    assert_eq!(api.delete_charge_point("").await.unwrap().status(), 404);
    assert_eq!(api.delete_charge_point("invalid-serial-number").await.unwrap().status(), 400);

    let created: chargepoint_common::ChargePoint =
        api.add_charge_point("SN-00000001").await.unwrap().json().unwrap();
    assert_eq!(api.delete_charge_point(created.id.as_str()).await.unwrap().status(), 204);
    assert_eq!(api.delete_charge_point(created.id.as_str()).await.unwrap().status(), 404);
}

#[tokio::test]
async fn list_decodes_charge_points() {
    let backend = MockBackend::spawn().await;
    let api = backend.client();

    api.add_charge_point("SN-00000001").await.unwrap();
    api.add_charge_point("SN-00000002").await.unwrap();

    let listed = api.list_charge_points().await.unwrap();
    let serials: Vec<_> = listed.iter().map(|cp| cp.serial_number.as_str()).collect();
    assert_eq!(serials, ["SN-00000001", "SN-00000002"]);
}

#[tokio::test]
async fn unexpected_status_carries_the_body() {
    let backend = MockBackend::spawn().await;
    let api = backend.client();

    api.add_charge_point("SN-00000001").await.unwrap();
    let duplicate = api.add_charge_point("SN-00000001").await.unwrap();

    match duplicate.expect_status("duplicate add", 201) {
        Err(E2eError::UnexpectedStatus { actual, body, .. }) => {
            assert_eq!(actual, 400);
            assert!(body.contains("already exists"));
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn wait_until_reachable_succeeds_when_up() {
    let backend = MockBackend::spawn().await;
    backend
        .client()
        .wait_until_reachable(Duration::from_secs(2))
        .await
        .unwrap();
}

#[tokio::test]
async fn wait_until_reachable_times_out_when_down() {
    // Grab a free port, then release it so nothing listens there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiClient::new(
        &Url::parse(&format!("http://{}", addr)).unwrap(),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = api
        .wait_until_reachable(Duration::from_millis(500))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::Timeout { .. }), "got {:?}", err);
}
