use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use super::export::write_csv;
use super::record::{
    coerce_amount, coerce_date, type_label, DonationRecord, DonationStatus, ANONYMOUS_DONOR,
};
use super::sources::{
    map_gateway_payment, map_mobile_doc, map_register_doc, DonationSource, SourceError,
};
use super::stats::DonationStats;
use super::{DonationAggregator, DonationError};
use crate::firestore::FirestoreError;
use crate::payments::models::GatewayPayment;

fn record(id: &str, amount: f64, date: &str, status: DonationStatus) -> DonationRecord {
    DonationRecord {
        id: id.to_string(),
        fullname: "Marie Faye".to_string(),
        amount,
        date: date.to_string(),
        donation_type: "Quête dominicale".to_string(),
        status,
        description: None,
        provider: None,
        parish_id: "P1".to_string(),
    }
}

struct FixedSource {
    name: &'static str,
    records: Vec<DonationRecord>,
}

#[async_trait]
impl DonationSource for FixedSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _parish_id: &str) -> Result<Vec<DonationRecord>, SourceError> {
        Ok(self.records.clone())
    }
}

struct FailingSource {
    name: &'static str,
}

#[async_trait]
impl DonationSource for FailingSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _parish_id: &str) -> Result<Vec<DonationRecord>, SourceError> {
        Err(SourceError::Firestore(FirestoreError::ApiError(
            "unavailable".to_string(),
        )))
    }
}

fn aggregator(
    register: Vec<DonationRecord>,
    mobile: Vec<DonationRecord>,
    gateway: Vec<DonationRecord>,
) -> DonationAggregator {
    DonationAggregator::from_sources(
        Box::new(FixedSource {
            name: "register",
            records: register,
        }),
        Box::new(FixedSource {
            name: "mobile",
            records: mobile,
        }),
        Box::new(FixedSource {
            name: "gateway",
            records: gateway,
        }),
    )
}

fn scenario() -> DonationAggregator {
    aggregator(
        vec![record("a1", 1000.0, "2024-01-10T08:00:00Z", DonationStatus::Pending)],
        vec![record("b1", 2500.0, "2024-01-11T00:00:00Z", DonationStatus::Confirmed)],
        vec![record("c1", 500.0, "2024-01-09", DonationStatus::Cancelled)],
    )
}

#[tokio::test]
async fn merges_all_sources_newest_first() {
    let records = scenario().list("P1").await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["b1", "a1", "c1"]);

    // descending over adjacent pairs, date-only strings included
    for pair in records.windows(2) {
        assert!(pair[0].date >= pair[1].date);
    }
    assert!(records.iter().all(|r| r.parish_id == "P1"));
}

#[tokio::test]
async fn equal_dates_keep_source_order() {
    let day = "2024-02-01";
    let records = aggregator(
        vec![record("a1", 100.0, day, DonationStatus::Pending)],
        vec![record("b1", 200.0, day, DonationStatus::Pending)],
        vec![record("c1", 300.0, day, DonationStatus::Pending)],
    )
    .list("P1")
    .await
    .unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a1", "b1", "c1"]);
}

#[tokio::test]
async fn mobile_failure_degrades_to_partial_result() {
    let agg = DonationAggregator::from_sources(
        Box::new(FixedSource {
            name: "register",
            records: vec![record("a1", 1000.0, "2024-01-10", DonationStatus::Pending)],
        }),
        Box::new(FailingSource { name: "mobile" }),
        Box::new(FixedSource {
            name: "gateway",
            records: vec![record("c1", 500.0, "2024-01-09", DonationStatus::Confirmed)],
        }),
    );

    let records = agg.list("P1").await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a1", "c1"]);
}

#[tokio::test]
async fn gateway_failure_degrades_to_partial_result() {
    let agg = DonationAggregator::from_sources(
        Box::new(FixedSource {
            name: "register",
            records: vec![record("a1", 1000.0, "2024-01-10", DonationStatus::Pending)],
        }),
        Box::new(FixedSource {
            name: "mobile",
            records: vec![],
        }),
        Box::new(FailingSource { name: "gateway" }),
    );

    let records = agg.list("P1").await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn register_failure_is_fatal() {
    let agg = DonationAggregator::from_sources(
        Box::new(FailingSource { name: "register" }),
        Box::new(FixedSource {
            name: "mobile",
            records: vec![record("b1", 2500.0, "2024-01-11", DonationStatus::Confirmed)],
        }),
        Box::new(FixedSource {
            name: "gateway",
            records: vec![],
        }),
    );

    let err = agg.list("P1").await.expect_err("register down must fail");
    assert!(matches!(err, DonationError::Io(_)));
}

#[tokio::test]
async fn stats_match_ledger() {
    let agg = scenario();
    let records = agg.list("P1").await.unwrap();
    let stats = agg.stats("P1").await.unwrap();

    assert_eq!(stats.total_count, records.len());
    // cancelled amounts stay in the grand total
    assert_eq!(stats.total_amount, 4000.0);
    assert_eq!(stats.confirmed_amount, 2500.0);
    assert_eq!(stats.pending_amount, 1000.0);
    assert!(stats.confirmed_amount + stats.pending_amount <= stats.total_amount);
}

#[test]
fn stats_today_counts_by_date_prefix() {
    let records = vec![
        record("a1", 100.0, "2024-01-10T08:00:00Z", DonationStatus::Pending),
        record("a2", 100.0, "2024-01-10", DonationStatus::Confirmed),
        record("b1", 100.0, "2024-01-11T01:00:00Z", DonationStatus::Pending),
    ];

    let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let stats = DonationStats::from_records_at(&records, today);
    assert_eq!(stats.donations_today, 2);
}

#[test]
fn stats_by_type_partitions_the_count() {
    let mut records = vec![
        record("a1", 100.0, "2024-01-10", DonationStatus::Pending),
        record("a2", 300.0, "2024-01-10", DonationStatus::Pending),
    ];
    records[1].donation_type = "Denier du culte".to_string();

    let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let stats = DonationStats::from_records_at(&records, today);

    let counted: usize = stats.by_type.values().map(|t| t.count).sum();
    assert_eq!(counted, stats.total_count);
    assert_eq!(stats.by_type["Quête dominicale"].amount, 100.0);
    assert_eq!(stats.by_type["Denier du culte"].amount, 300.0);
}

#[test]
fn register_doc_defaults_never_drop_a_record() {
    let rec = map_register_doc("d1".to_string(), "P1", &json!({}));

    assert_eq!(rec.fullname, ANONYMOUS_DONOR);
    assert_eq!(rec.amount, 0.0);
    assert_eq!(rec.status, DonationStatus::Pending);
    assert_eq!(rec.donation_type, "Autre");
    assert_eq!(rec.parish_id, "P1");
    // timestamp fallback is "now", which parses as RFC 3339
    assert!(chrono::DateTime::parse_from_rfc3339(&rec.date).is_ok());
}

#[test]
fn register_doc_coerces_formatted_amounts() {
    let rec = map_register_doc(
        "d1".to_string(),
        "P1",
        &json!({
            "fullname": "Abdou Sow",
            "amount": "2 500",
            "date": "2024-01-10",
            "type": "quete",
            "status": "confirmed"
        }),
    );

    assert_eq!(rec.amount, 2500.0);
    assert_eq!(rec.donation_type, "Quête dominicale");
    assert_eq!(rec.status, DonationStatus::Confirmed);
}

#[test]
fn amount_coercion_is_non_negative() {
    assert_eq!(coerce_amount(Some(&json!(1000))), 1000.0);
    assert_eq!(coerce_amount(Some(&json!("2 500"))), 2500.0);
    assert_eq!(coerce_amount(Some(&json!(""))), 0.0);
    assert_eq!(coerce_amount(Some(&json!("n/a"))), 0.0);
    assert_eq!(coerce_amount(Some(&json!(-50))), 0.0);
    assert_eq!(coerce_amount(None), 0.0);
}

#[test]
fn date_coercion_handles_timestamp_maps() {
    // 2024-01-11T00:00:00Z
    let rest = coerce_date(Some(&json!({ "seconds": 1704931200, "nanos": 0 })));
    assert_eq!(rest, "2024-01-11T00:00:00Z");

    let sdk = coerce_date(Some(&json!({ "_seconds": 1704931200, "_nanoseconds": 0 })));
    assert_eq!(sdk, "2024-01-11T00:00:00Z");

    let passthrough = coerce_date(Some(&json!("2024-01-09")));
    assert_eq!(passthrough, "2024-01-09");

    let fallback = coerce_date(None);
    assert!(chrono::DateTime::parse_from_rfc3339(&fallback).is_ok());
}

#[test]
fn mobile_doc_uses_user_id_and_message() {
    let rec = map_mobile_doc(
        "m1".to_string(),
        "P1",
        &json!({
            "userId": "user-77",
            "amount": 2500,
            "type": "denier",
            "status": "completed",
            "message": "Pour ma famille",
            "createdAt": { "seconds": 1704931200, "nanos": 0 }
        }),
    );

    assert_eq!(rec.fullname, "user-77");
    assert_eq!(rec.description.as_deref(), Some("Pour ma famille"));
    assert_eq!(rec.status, DonationStatus::Confirmed);
    assert_eq!(rec.donation_type, "Denier du culte");
    assert_eq!(rec.date, "2024-01-11T00:00:00Z");
}

#[test]
fn gateway_payment_mapping() {
    let payment: GatewayPayment = serde_json::from_value(json!({
        "id": 7,
        "planId": "DONATION_CIERGE_1000",
        "amount": 1000,
        "status": "PAID",
        "uid": "u1",
        "createdAt": "2024-01-05T10:00:00Z",
        "provider": "wave"
    }))
    .unwrap();

    let rec = map_gateway_payment("P1", payment);
    assert_eq!(rec.id, "7");
    assert_eq!(rec.fullname, "u1");
    assert_eq!(rec.donation_type, "Cierge pascal");
    assert_eq!(rec.status, DonationStatus::Confirmed);
    assert_eq!(rec.provider.as_deref(), Some("wave"));
    assert_eq!(rec.date, "2024-01-05T10:00:00Z");
    assert_eq!(rec.parish_id, "P1");
}

#[test]
fn gateway_payment_defaults() {
    let payment: GatewayPayment = serde_json::from_value(json!({
        "planId": "DONATION_QUETE_500",
        "status": "FAILED"
    }))
    .unwrap();

    let rec = map_gateway_payment("P1", payment);
    assert_eq!(rec.fullname, ANONYMOUS_DONOR);
    assert_eq!(rec.status, DonationStatus::Cancelled);
    assert_eq!(rec.provider.as_deref(), Some("paydunya"));
    assert_eq!(rec.amount, 0.0);
}

#[test]
fn status_mapping_is_total() {
    let inputs = [
        Some("confirmed"),
        Some("completed"),
        Some("COMPLETED"),
        Some("pending"),
        Some("cancelled"),
        Some("canceled"),
        Some("failed"),
        Some("weird"),
        Some(""),
        None,
    ];
    for raw in inputs {
        let status = DonationStatus::from_raw(raw);
        assert!(matches!(
            status,
            DonationStatus::Confirmed | DonationStatus::Pending | DonationStatus::Cancelled
        ));
    }

    assert_eq!(DonationStatus::from_raw(Some("completed")), DonationStatus::Confirmed);
    assert_eq!(DonationStatus::from_raw(Some("failed")), DonationStatus::Cancelled);
    assert_eq!(DonationStatus::from_raw(None), DonationStatus::Pending);
}

#[test]
fn type_labels_cover_the_known_codes() {
    assert_eq!(type_label("quete"), "Quête dominicale");
    assert_eq!(type_label("denier"), "Denier du culte");
    assert_eq!(type_label("cierge"), "Cierge pascal");
    assert_eq!(type_label("messe"), "Messe d'intention");
    assert_eq!(type_label("prière"), "Prière");
    // already-formatted labels pass through
    assert_eq!(type_label("Collecte spéciale"), "Collecte spéciale");
}

#[test]
fn csv_export_writes_french_headers() {
    let mut rec = record("a1", 2500.0, "2024-01-10", DonationStatus::Confirmed);
    rec.provider = Some("wave".to_string());

    let mut out = Vec::new();
    write_csv(&mut out, &[rec]).unwrap();
    let text = String::from_utf8(out).unwrap();

    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("ID Don,Donateur,Montant (FCFA),Type,Statut,Méthode de paiement,Paroisse,Date")
    );
    let row = lines.next().unwrap();
    assert!(row.contains("a1"));
    assert!(row.contains("Confirmé"));
    assert!(row.contains("wave"));

    let mut empty = Vec::new();
    write_csv(&mut empty, &[]).unwrap();
    assert!(empty.is_empty());
}
