use serde::Deserialize;
use serde_json::Value as JsonValue;

/// One row from the payment service's payments table.
///
/// The table has been written by several webhook generations, so most
/// fields are optional and a few exist under two names.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPayment {
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(default)]
    pub payment_id: Option<JsonValue>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub amount: Option<JsonValue>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub parish_id: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub anonymous_uid: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

impl GatewayPayment {
    /// A payments row is a donation when its plan id follows the
    /// `DONATION_` convention or the row is explicitly typed as one.
    /// The table also holds book-purchase checkouts.
    pub fn is_donation(&self) -> bool {
        if self.kind.as_deref() == Some("donation") {
            return true;
        }
        match self.plan_id.as_deref() {
            Some(plan) => {
                plan.starts_with("DONATION_") || plan.to_lowercase().contains("donation")
            }
            None => false,
        }
    }

    /// The payment identifier, whichever column carries it.
    pub fn payment_ref(&self) -> String {
        json_to_string(self.id.as_ref())
            .or_else(|| json_to_string(self.payment_id.as_ref()))
            .unwrap_or_default()
    }

    /// The donor identifier, across the uid column generations.
    pub fn donor_ref(&self) -> Option<&str> {
        self.uid
            .as_deref()
            .or(self.user_id.as_deref())
            .or(self.anonymous_uid.as_deref())
    }

    /// Gateway status collapsed to the 3-state payment vocabulary.
    pub fn normalized_status(&self) -> GatewayStatus {
        GatewayStatus::from_raw(self.status.as_deref())
    }

    /// The donation type encoded in a `DONATION_<TYPE>_...` plan id.
    pub fn plan_donation_type(&self) -> Option<String> {
        let plan = self.plan_id.as_deref()?;
        let rest = plan.strip_prefix("DONATION_")?;
        let ty = rest.split('_').next()?;
        if ty.is_empty() {
            None
        } else {
            Some(ty.to_lowercase())
        }
    }
}

fn json_to_string(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Payment status after the gateway's vocabulary is collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Completed,
    Pending,
    Failed,
}

impl GatewayStatus {
    /// Total, case-insensitive mapping from whatever the gateway sent.
    /// Unknown and absent statuses count as pending.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.unwrap_or_default().to_uppercase().as_str() {
            "PAID" | "COMPLETED" => GatewayStatus::Completed,
            "CANCELED" | "CANCELLED" | "FAILED" | "EXPIRED" => GatewayStatus::Failed,
            _ => GatewayStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayStatus::Completed => "completed",
            GatewayStatus::Pending => "pending",
            GatewayStatus::Failed => "failed",
        }
    }
}

/// Envelope returned by `GET /donations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsResponse {
    #[serde(default)]
    pub payments: Vec<GatewayPayment>,
    #[serde(default)]
    pub total: Option<u64>,
}
