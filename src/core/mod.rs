pub mod middleware;

use serde::Deserialize;

/// Structured error body returned by Google/Firebase endpoints.
#[derive(Debug, Deserialize)]
pub struct FirebaseErrorResponse {
    pub error: FirebaseErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorDetails {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
}

impl FirebaseErrorResponse {
    pub fn display_message(&self) -> String {
        format!("{} (code: {})", self.error.message, self.error.code)
    }
}

/// Flat error body returned by the payment API proxy.
#[derive(Debug, Deserialize)]
struct FlatErrorResponse {
    error: String,
}

/// Reduces an error response body to a displayable message.
///
/// Handles both upstream shapes: Firebase-style
/// `{"error":{"code":..,"message":..}}` and the payment API's flat
/// `{"error":"..."}`. Bodies matching neither fall back to the HTTP
/// status line.
pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(resp) = serde_json::from_str::<FirebaseErrorResponse>(&body) {
        return resp.display_message();
    }
    if let Ok(resp) = serde_json::from_str::<FlatErrorResponse>(&body) {
        return resp.error;
    }
    format!("{}: {}", default_msg, status)
}
