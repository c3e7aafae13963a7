//! The donation ledger: one chronological view of everything given to a
//! parish, whichever system recorded it.
//!
//! Donations reach the backend through three doors: the admin console's
//! manual register, the mobile app's in-app flow, and the payment
//! webhook sync behind the payment API. Each source has its own schema
//! and status vocabulary; this module normalizes all three into
//! [`record::DonationRecord`] and merges them newest-first.

pub mod export;
pub mod record;
pub mod sources;
pub mod stats;

#[cfg(test)]
mod tests;

use thiserror::Error;
use tracing::warn;

use self::record::DonationRecord;
use self::sources::{
    DonationSource, MobileAppSource, ParishRegisterSource, PaymentGatewaySource, SourceError,
};
use self::stats::DonationStats;
use crate::firestore::FirestoreClient;
use crate::payments::PaymentApiClient;

/// Errors surfaced by the aggregator.
///
/// Only the parish register is load-bearing; the other sources degrade
/// to empty results.
#[derive(Error, Debug)]
pub enum DonationError {
    /// The mandatory source (the parish register) could not be read.
    #[error("I/O error reading the parish donation register: {0}")]
    Io(#[from] SourceError),
}

/// Merges the three donation sources into one parish-scoped ledger.
///
/// Holds no state across calls; every call re-fetches all sources.
pub struct DonationAggregator {
    register: Box<dyn DonationSource>,
    mobile: Box<dyn DonationSource>,
    gateway: Box<dyn DonationSource>,
}

impl DonationAggregator {
    /// Wires the production sources from the two upstream clients.
    pub fn new(firestore: FirestoreClient, payments: PaymentApiClient) -> Self {
        Self {
            register: Box::new(ParishRegisterSource::new(firestore.clone())),
            mobile: Box::new(MobileAppSource::new(firestore)),
            gateway: Box::new(PaymentGatewaySource::new(payments)),
        }
    }

    /// Builds an aggregator over arbitrary sources.
    ///
    /// `register` is the mandatory source; `mobile` and `gateway` are
    /// optional and absorb their own failures.
    pub fn from_sources(
        register: Box<dyn DonationSource>,
        mobile: Box<dyn DonationSource>,
        gateway: Box<dyn DonationSource>,
    ) -> Self {
        Self {
            register,
            mobile,
            gateway,
        }
    }

    /// Every donation recorded for `parish_id`, newest first.
    ///
    /// The three sources are fetched concurrently, each exactly once per
    /// call. A register failure aborts the call; a mobile or gateway
    /// failure is logged and contributes no records. Records sharing a
    /// timestamp keep register → mobile → gateway order.
    pub async fn list(&self, parish_id: &str) -> Result<Vec<DonationRecord>, DonationError> {
        let (register, mobile, gateway) = futures::join!(
            self.register.fetch(parish_id),
            self.mobile.fetch(parish_id),
            self.gateway.fetch(parish_id),
        );

        let mut records = register?;
        records.extend(absorb(self.mobile.name(), mobile));
        records.extend(absorb(self.gateway.name(), gateway));

        // Stable sort: equal dates keep the concatenation order above.
        // ISO-8601 strings compare lexicographically in chronological order.
        records.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(records)
    }

    /// Summary statistics over [`list`](Self::list) for `parish_id`.
    pub async fn stats(&self, parish_id: &str) -> Result<DonationStats, DonationError> {
        let records = self.list(parish_id).await?;
        Ok(DonationStats::from_records(&records))
    }
}

fn absorb(
    source: &'static str,
    result: Result<Vec<DonationRecord>, SourceError>,
) -> Vec<DonationRecord> {
    match result {
        Ok(records) => records,
        Err(error) => {
            warn!(source, %error, "donation source unavailable, continuing without it");
            Vec::new()
        }
    }
}
