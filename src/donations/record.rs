use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Display name used when a source has nothing better to offer.
pub const ANONYMOUS_DONOR: &str = "Donateur anonyme";

/// Canonical donation status. Every source vocabulary maps into this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl DonationStatus {
    /// Total mapping from any source's native status string.
    ///
    /// `confirmed`/`completed` count as confirmed, `cancelled`/
    /// `canceled`/`failed` as cancelled, everything else (including
    /// absent) as pending. Case-insensitive.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.unwrap_or_default().to_lowercase().as_str() {
            "confirmed" | "completed" => DonationStatus::Confirmed,
            "cancelled" | "canceled" | "failed" => DonationStatus::Cancelled,
            _ => DonationStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Confirmed => "confirmed",
            DonationStatus::Pending => "pending",
            DonationStatus::Cancelled => "cancelled",
        }
    }

    /// French label, as displayed in the admin console and exports.
    pub fn label_fr(&self) -> &'static str {
        match self {
            DonationStatus::Confirmed => "Confirmé",
            DonationStatus::Pending => "En attente",
            DonationStatus::Cancelled => "Annulé",
        }
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A donation in the normalized shape shared by all three sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    /// Document or payment id, unique within its source.
    pub id: String,
    pub fullname: String,
    /// Non-negative, in FCFA.
    pub amount: f64,
    /// ISO-8601; date-only strings are kept as-is.
    pub date: String,
    #[serde(rename = "type")]
    pub donation_type: String,
    pub status: DonationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Payment channel, when the record came through a gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub parish_id: String,
}

/// Maps the short donation-type codes to their display labels.
/// Already-formatted labels pass through untouched.
pub fn type_label(raw: &str) -> String {
    match raw {
        "quete" => "Quête dominicale".to_string(),
        "denier" => "Denier du culte".to_string(),
        "cierge" => "Cierge pascal".to_string(),
        "messe" => "Messe d'intention".to_string(),
        "priere" | "prière" => "Prière".to_string(),
        other => other.to_string(),
    }
}

// Field coercion helpers. Source documents come in as loose JSON; a
// malformed field defaults instead of dropping the record.

pub(crate) fn string_field(data: &JsonValue, key: &str) -> Option<String> {
    match data.get(key) {
        Some(JsonValue::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Amount as a non-negative number. Accepts plain numbers and
/// thousands-formatted strings ("2 500"); anything else is 0.
pub(crate) fn coerce_amount(raw: Option<&JsonValue>) -> f64 {
    let amount = match raw {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(JsonValue::String(s)) => {
            // covers ASCII spaces and the non-breaking variants
            let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    };
    amount.max(0.0)
}

/// Timestamp as an ISO-8601 string.
///
/// Strings pass through, `{seconds,nanos}` maps (both the REST and the
/// client-SDK field spellings) convert to RFC 3339 UTC, anything else
/// falls back to the current instant.
pub(crate) fn coerce_date(raw: Option<&JsonValue>) -> String {
    match raw {
        Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
        Some(JsonValue::Object(map)) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(JsonValue::as_i64);
            let nanos = map
                .get("nanos")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(JsonValue::as_u64)
                .unwrap_or(0) as u32;
            match seconds.and_then(|s| DateTime::<Utc>::from_timestamp(s, nanos)) {
                Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
                None => now_iso(),
            }
        }
        _ => now_iso(),
    }
}

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
