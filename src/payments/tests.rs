use httpmock::Method::GET;
use httpmock::MockServer;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde_json::json;

use super::models::{GatewayPayment, GatewayStatus};
use super::{PaymentApiClient, PaymentApiError};

fn test_client(base_url: &str) -> PaymentApiClient {
    let client = ClientBuilder::new(Client::new()).build();
    PaymentApiClient::new_with_client(client, base_url).unwrap()
}

#[tokio::test]
async fn keeps_only_donation_payments() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/donations")
            .query_param("parishId", "P1");
        then.status(200).json_body(json!({
            "total": 3,
            "payments": [
                { "id": 41, "planId": "BOOK_PART_2", "amount": 15000, "status": "PAID" },
                { "id": 42, "planId": "DONATION_QUETE_500", "amount": 500, "status": "PAID", "uid": "u42" },
                { "paymentId": "p-43", "type": "donation", "amount": 2500, "status": "PENDING", "created_at": "2024-01-11T09:30:00Z" }
            ]
        }));
    });

    let api = test_client(&server.base_url());
    let payments = api.donation_payments("P1").await.unwrap();

    mock.assert();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0].payment_ref(), "42");
    assert_eq!(payments[0].donor_ref(), Some("u42"));
    // the snake_case column alias must land in createdAt
    assert_eq!(payments[1].payment_ref(), "p-43");
    assert_eq!(payments[1].created_at.as_deref(), Some("2024-01-11T09:30:00Z"));
}

#[tokio::test]
async fn missing_payments_array_is_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/donations");
        then.status(200).json_body(json!({}));
    });

    let api = test_client(&server.base_url());
    let payments = api.donation_payments("P1").await.unwrap();
    assert!(payments.is_empty());
}

#[tokio::test]
async fn error_body_is_surfaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/donations");
        then.status(401).json_body(json!({ "error": "Non authentifié" }));
    });

    let api = test_client(&server.base_url());
    let err = api
        .donation_payments("P1")
        .await
        .expect_err("401 should surface");

    match err {
        PaymentApiError::ApiError(msg) => assert!(msg.contains("Non authentifié")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn gateway_status_mapping_is_total() {
    assert_eq!(GatewayStatus::from_raw(Some("PAID")), GatewayStatus::Completed);
    assert_eq!(GatewayStatus::from_raw(Some("completed")), GatewayStatus::Completed);
    assert_eq!(GatewayStatus::from_raw(Some("Pending")), GatewayStatus::Pending);
    assert_eq!(GatewayStatus::from_raw(Some("CANCELED")), GatewayStatus::Failed);
    assert_eq!(GatewayStatus::from_raw(Some("CANCELLED")), GatewayStatus::Failed);
    assert_eq!(GatewayStatus::from_raw(Some("FAILED")), GatewayStatus::Failed);
    assert_eq!(GatewayStatus::from_raw(Some("EXPIRED")), GatewayStatus::Failed);
    assert_eq!(GatewayStatus::from_raw(Some("garbage")), GatewayStatus::Pending);
    assert_eq!(GatewayStatus::from_raw(None), GatewayStatus::Pending);
}

#[test]
fn plan_donation_type_extraction() {
    let donation: GatewayPayment =
        serde_json::from_value(json!({ "planId": "DONATION_QUETE_500" })).unwrap();
    assert_eq!(donation.plan_donation_type().as_deref(), Some("quete"));

    let book: GatewayPayment =
        serde_json::from_value(json!({ "planId": "BOOK_PART_2" })).unwrap();
    assert_eq!(book.plan_donation_type(), None);
    assert!(!book.is_donation());

    let bare: GatewayPayment = serde_json::from_value(json!({ "planId": "DONATION_" })).unwrap();
    assert_eq!(bare.plan_donation_type(), None);
    // still a donation by prefix, just with an unknown type
    assert!(bare.is_donation());
}
