//! Client for the payment API (the PayDunya intermediary).
//!
//! The payment service records every checkout it processes, donations
//! and book purchases alike; donation checkouts are tagged through their
//! plan id. This client pulls the payment rows for one parish and keeps
//! only the donation ones.

pub mod models;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;
use url::Url;

use self::models::{GatewayPayment, PaymentsResponse};
use crate::core::middleware::AuthMiddleware;
use crate::core::parse_error_response;

/// Errors that can occur while talking to the payment API.
#[derive(Error, Debug)]
pub enum PaymentApiError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the payment API.
    #[error("API error: {0}")]
    ApiError(String),
    /// The configured base URL does not parse.
    #[error("Invalid payment API URL: {0}")]
    UrlError(#[from] url::ParseError),
}

/// Client for the donation endpoint of the payment API.
#[derive(Clone)]
pub struct PaymentApiClient {
    client: ClientWithMiddleware,
    base_url: Url,
}

impl PaymentApiClient {
    /// Creates a client for the payment service at `base_url`.
    ///
    /// The service-account identity used for Firestore is accepted by
    /// the payment API proxy as well.
    pub fn new(middleware: Arc<AuthMiddleware>, base_url: &str) -> Result<Self, PaymentApiError> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with_arc(middleware)
            .build();

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn new_with_client(
        client: ClientWithMiddleware,
        base_url: &str,
    ) -> Result<Self, PaymentApiError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Fetches the donation payments recorded for `parish_id`.
    ///
    /// The endpoint scopes by parish on its side; the plan-id filter is
    /// applied again here because the payments table also holds
    /// non-donation checkouts.
    pub async fn donation_payments(
        &self,
        parish_id: &str,
    ) -> Result<Vec<GatewayPayment>, PaymentApiError> {
        let mut url = self.base_url.join("donations")?;
        url.query_pairs_mut().append_pair("parishId", parish_id);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(PaymentApiError::ApiError(
                parse_error_response(response, "Fetch donations failed").await,
            ));
        }

        let body: PaymentsResponse = response.json().await?;
        Ok(body
            .payments
            .into_iter()
            .filter(GatewayPayment::is_donation)
            .collect())
    }
}
