//! CSV export of the aggregated ledger, as served by the admin console
//! download endpoint.

use std::io::Write;

use chrono::Local;
use serde::Serialize;

use super::record::DonationRecord;

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "ID Don")]
    id: &'a str,
    #[serde(rename = "Donateur")]
    fullname: &'a str,
    #[serde(rename = "Montant (FCFA)")]
    amount: f64,
    #[serde(rename = "Type")]
    donation_type: &'a str,
    #[serde(rename = "Statut")]
    status: &'a str,
    #[serde(rename = "Méthode de paiement")]
    provider: &'a str,
    #[serde(rename = "Paroisse")]
    parish_id: &'a str,
    #[serde(rename = "Date")]
    date: &'a str,
}

/// Writes the records as CSV with the console's French headers.
/// An empty record list writes nothing, headers included.
pub fn write_csv<W: Write>(writer: W, records: &[DonationRecord]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    for record in records {
        wtr.serialize(ExportRow {
            id: &record.id,
            fullname: &record.fullname,
            amount: record.amount,
            donation_type: &record.donation_type,
            status: record.status.label_fr(),
            provider: record.provider.as_deref().unwrap_or("Non spécifié"),
            parish_id: &record.parish_id,
            date: &record.date,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Download filename used by the console: `dons_<YYYY-MM-DD>.csv`.
pub fn export_filename() -> String {
    format!("dons_{}.csv", Local::now().format("%Y-%m-%d"))
}
