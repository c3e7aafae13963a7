//! Read-only Cloud Firestore client.
//!
//! Covers the slice of the Firestore v1 REST API the donation ledger
//! needs: structured queries against a single collection, executed via
//! `runQuery` and decoded into owned snapshots. Writes, transactions and
//! real-time listeners are out of scope: donation records are produced
//! by the admin console, the mobile app and the payment webhook, never
//! by this crate.
//!
//! Queries deliberately carry no `orderBy`: ordering happens client-side
//! so no composite index is required on the donation collections.

pub mod models;
pub mod query;
pub mod snapshot;


use std::sync::Arc;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;

use self::query::{ExecutableQuery, Query};
use crate::core::middleware::AuthMiddleware;

const FIRESTORE_V1_API: &str =
    "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents";

/// Errors that can occur during Firestore operations.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the Firestore API.
    #[error("API error: {0}")]
    ApiError(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Client for running read-only queries against Cloud Firestore.
#[derive(Clone)]
pub struct FirestoreClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirestoreClient {
    /// Creates a client for the project named in the service-account key.
    pub fn new(middleware: Arc<AuthMiddleware>) -> Self {
        let project_id = middleware.key.project_id.clone().unwrap_or_default();
        let base_url = FIRESTORE_V1_API.replace("{project_id}", &project_id);
        Self::new_with_url(middleware, base_url)
    }

    /// Creates a client against a custom base URL (useful for testing).
    pub fn new_with_url(middleware: Arc<AuthMiddleware>, base_url: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with_arc(middleware)
            .build();

        Self { client, base_url }
    }

    #[cfg(test)]
    pub(crate) fn new_with_client(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Starts a query over the collection with the given ID.
    pub fn collection(&self, collection_id: &str) -> ExecutableQuery<'_> {
        self.query(Query::new(collection_id))
    }

    /// Binds a query definition to this client.
    pub fn query(&self, query: Query) -> ExecutableQuery<'_> {
        ExecutableQuery {
            client: &self.client,
            parent_path: self.base_url.clone(),
            query,
        }
    }
}
