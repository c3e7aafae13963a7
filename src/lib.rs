pub mod core;
pub mod donations;
pub mod firestore;
pub mod payments;

pub use yup_oauth2;

use std::sync::Arc;

use yup_oauth2::ServiceAccountKey;

use crate::core::middleware::AuthMiddleware;
use crate::donations::DonationAggregator;
use crate::firestore::FirestoreClient;
use crate::payments::{PaymentApiClient, PaymentApiError};

/// Entry point: holds the service-account identity and hands out
/// per-service clients.
pub struct SamaQueteApp {
    middleware: Arc<AuthMiddleware>,
    payment_api_url: String,
}

impl SamaQueteApp {
    pub fn new(service_account_key: ServiceAccountKey, payment_api_url: impl Into<String>) -> Self {
        Self {
            middleware: Arc::new(AuthMiddleware::new(service_account_key)),
            payment_api_url: payment_api_url.into(),
        }
    }

    pub fn firestore(&self) -> FirestoreClient {
        FirestoreClient::new(self.middleware.clone())
    }

    pub fn payments(&self) -> Result<PaymentApiClient, PaymentApiError> {
        PaymentApiClient::new(self.middleware.clone(), &self.payment_api_url)
    }

    /// The donation ledger for this deployment.
    pub fn donations(&self) -> Result<DonationAggregator, PaymentApiError> {
        Ok(DonationAggregator::new(self.firestore(), self.payments()?))
    }
}
