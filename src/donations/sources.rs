use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::record::{
    coerce_amount, coerce_date, now_iso, string_field, type_label, DonationRecord,
    DonationStatus, ANONYMOUS_DONOR,
};
use crate::firestore::{FirestoreClient, FirestoreError};
use crate::payments::models::GatewayPayment;
use crate::payments::{PaymentApiClient, PaymentApiError};

/// Firestore collection the admin console writes manual entries to.
const REGISTER_COLLECTION: &str = "parish_donations";
/// Firestore collection the mobile app writes in-app donations to.
const MOBILE_COLLECTION: &str = "donations";

/// Failure of a single upstream source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Firestore(#[from] FirestoreError),
    #[error(transparent)]
    PaymentApi(#[from] PaymentApiError),
}

/// One upstream store of donation records for a parish.
#[async_trait]
pub trait DonationSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// All records for `parish_id`, already normalized.
    async fn fetch(&self, parish_id: &str) -> Result<Vec<DonationRecord>, SourceError>;
}

/// Source A: donations entered by hand in the admin console.
pub struct ParishRegisterSource {
    firestore: FirestoreClient,
}

impl ParishRegisterSource {
    pub fn new(firestore: FirestoreClient) -> Self {
        Self { firestore }
    }
}

#[async_trait]
impl DonationSource for ParishRegisterSource {
    fn name(&self) -> &'static str {
        "parish-register"
    }

    async fn fetch(&self, parish_id: &str) -> Result<Vec<DonationRecord>, SourceError> {
        let snapshot = self
            .firestore
            .collection(REGISTER_COLLECTION)
            .where_eq("parishId", parish_id)?
            .get()
            .await?;

        Ok(snapshot
            .iter()
            .map(|doc| {
                let data = doc.data::<JsonValue>().unwrap_or(JsonValue::Null);
                map_register_doc(doc.id().to_string(), parish_id, &data)
            })
            .collect())
    }
}

pub(crate) fn map_register_doc(id: String, parish_id: &str, data: &JsonValue) -> DonationRecord {
    DonationRecord {
        id,
        fullname: string_field(data, "fullname").unwrap_or_else(|| ANONYMOUS_DONOR.to_string()),
        amount: coerce_amount(data.get("amount")),
        date: coerce_date(data.get("date")),
        donation_type: type_label(string_field(data, "type").as_deref().unwrap_or("Autre")),
        status: DonationStatus::from_raw(string_field(data, "status").as_deref()),
        description: string_field(data, "description"),
        provider: None,
        parish_id: parish_id.to_string(),
    }
}

/// Source B: in-app donations recorded by the mobile app.
pub struct MobileAppSource {
    firestore: FirestoreClient,
}

impl MobileAppSource {
    pub fn new(firestore: FirestoreClient) -> Self {
        Self { firestore }
    }
}

#[async_trait]
impl DonationSource for MobileAppSource {
    fn name(&self) -> &'static str {
        "mobile-app"
    }

    async fn fetch(&self, parish_id: &str) -> Result<Vec<DonationRecord>, SourceError> {
        let snapshot = self
            .firestore
            .collection(MOBILE_COLLECTION)
            .where_eq("parishId", parish_id)?
            .get()
            .await?;

        Ok(snapshot
            .iter()
            .map(|doc| {
                let data = doc.data::<JsonValue>().unwrap_or(JsonValue::Null);
                map_mobile_doc(doc.id().to_string(), parish_id, &data)
            })
            .collect())
    }
}

pub(crate) fn map_mobile_doc(id: String, parish_id: &str, data: &JsonValue) -> DonationRecord {
    // The app stores no display name; the user id is the best label available.
    let fullname = string_field(data, "fullname")
        .or_else(|| string_field(data, "userId"))
        .unwrap_or_else(|| ANONYMOUS_DONOR.to_string());

    DonationRecord {
        id,
        fullname,
        amount: coerce_amount(data.get("amount")),
        date: coerce_date(data.get("createdAt")),
        donation_type: type_label(string_field(data, "type").as_deref().unwrap_or("Autre")),
        status: DonationStatus::from_raw(string_field(data, "status").as_deref()),
        description: string_field(data, "message"),
        provider: None,
        parish_id: parish_id.to_string(),
    }
}

/// Source C: donations synced from the payment gateway.
pub struct PaymentGatewaySource {
    api: PaymentApiClient,
}

impl PaymentGatewaySource {
    pub fn new(api: PaymentApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DonationSource for PaymentGatewaySource {
    fn name(&self) -> &'static str {
        "payment-gateway"
    }

    async fn fetch(&self, parish_id: &str) -> Result<Vec<DonationRecord>, SourceError> {
        let payments = self.api.donation_payments(parish_id).await?;
        Ok(payments
            .into_iter()
            .map(|p| map_gateway_payment(parish_id, p))
            .collect())
    }
}

pub(crate) fn map_gateway_payment(parish_id: &str, payment: GatewayPayment) -> DonationRecord {
    let donation_type = payment
        .plan_donation_type()
        .map(|ty| type_label(&ty))
        .unwrap_or_else(|| "Autre".to_string());

    DonationRecord {
        id: payment.payment_ref(),
        fullname: payment
            .donor_ref()
            .map(str::to_string)
            .unwrap_or_else(|| ANONYMOUS_DONOR.to_string()),
        amount: coerce_amount(payment.amount.as_ref()),
        date: payment
            .created_at
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(now_iso),
        donation_type,
        status: DonationStatus::from_raw(Some(payment.normalized_status().as_str())),
        description: None,
        provider: payment
            .provider
            .clone()
            .or_else(|| payment.payment_method.clone())
            .or_else(|| Some("paydunya".to_string())),
        // payments rows predate parish scoping and carry no usable
        // parishId of their own; the query parameter is authoritative
        parish_id: parish_id.to_string(),
    }
}
