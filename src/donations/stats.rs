use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::record::{DonationRecord, DonationStatus};

/// Per-type slice of the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeStats {
    pub count: usize,
    pub amount: f64,
}

/// Summary figures for one parish's ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    /// Sum over every record regardless of status. Cancelled rows stay
    /// in the grand total; only the confirmed/pending splits exclude
    /// them.
    pub total_amount: f64,
    pub total_count: usize,
    pub confirmed_amount: f64,
    pub pending_amount: f64,
    /// Records dated on the local calendar day.
    pub donations_today: usize,
    /// Breakdown by canonical type label.
    pub by_type: BTreeMap<String, TypeStats>,
}

impl DonationStats {
    /// Reduces a record list. Pure; performs no I/O.
    pub fn from_records(records: &[DonationRecord]) -> Self {
        Self::from_records_at(records, Local::now().date_naive())
    }

    pub(crate) fn from_records_at(records: &[DonationRecord], today: NaiveDate) -> Self {
        let today_prefix = today.format("%Y-%m-%d").to_string();

        let mut stats = DonationStats {
            total_amount: 0.0,
            total_count: records.len(),
            confirmed_amount: 0.0,
            pending_amount: 0.0,
            donations_today: 0,
            by_type: BTreeMap::new(),
        };

        for record in records {
            stats.total_amount += record.amount;
            match record.status {
                DonationStatus::Confirmed => stats.confirmed_amount += record.amount,
                DonationStatus::Pending => stats.pending_amount += record.amount,
                DonationStatus::Cancelled => {}
            }
            if record.date.starts_with(&today_prefix) {
                stats.donations_today += 1;
            }
            let entry = stats.by_type.entry(record.donation_type.clone()).or_default();
            entry.count += 1;
            entry.amount += record.amount;
        }

        stats
    }
}
