use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;

use super::models::{
    json_to_value, CollectionSelector, CompositeFilter, CompositeOperator, FieldFilter,
    FieldOperator, FieldReference, QueryFilter, RunQueryRequest, RunQueryResponse,
    StructuredQuery,
};
use super::snapshot::{DocumentSnapshot, QuerySnapshot};
use super::FirestoreError;
use crate::core::parse_error_response;

/// A query over a single collection, built independently of any client.
#[derive(Clone, Debug)]
pub struct Query {
    collection_id: String,
    filters: Vec<QueryFilter>,
}

impl Query {
    /// Creates a new `Query` targeting the specified collection.
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            filters: Vec::new(),
        }
    }

    /// Adds an equality filter on a top-level field.
    pub fn where_eq<T: Serialize>(self, field: &str, value: T) -> Result<Self, FirestoreError> {
        self.where_filter(field, FieldOperator::Equal, value)
    }

    /// Adds a filter on a top-level field. Multiple filters combine with AND.
    pub fn where_filter<T: Serialize>(
        mut self,
        field: &str,
        op: FieldOperator,
        value: T,
    ) -> Result<Self, FirestoreError> {
        let value = json_to_value(serde_json::to_value(value)?);
        self.filters.push(QueryFilter::FieldFilter(FieldFilter {
            field: FieldReference {
                field_path: field.to_string(),
            },
            op,
            value,
        }));
        Ok(self)
    }

    pub(crate) fn structured(&self) -> StructuredQuery {
        let where_clause = match self.filters.len() {
            0 => None,
            1 => Some(self.filters[0].clone()),
            _ => Some(QueryFilter::CompositeFilter(CompositeFilter {
                op: CompositeOperator::And,
                filters: self.filters.clone(),
            })),
        };
        StructuredQuery {
            from: Some(vec![CollectionSelector {
                collection_id: self.collection_id.clone(),
                all_descendants: None,
            }]),
            where_clause,
        }
    }
}

/// A `Query` bound to a Firestore client, ready for execution.
#[derive(Clone)]
pub struct ExecutableQuery<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) parent_path: String,
    pub(crate) query: Query,
}

impl<'a> ExecutableQuery<'a> {
    /// Adds an equality filter on a top-level field.
    pub fn where_eq<T: Serialize>(self, field: &str, value: T) -> Result<Self, FirestoreError> {
        Ok(Self {
            query: self.query.where_eq(field, value)?,
            ..self
        })
    }

    /// Adds a filter on a top-level field.
    pub fn where_filter<T: Serialize>(
        self,
        field: &str,
        op: FieldOperator,
        value: T,
    ) -> Result<Self, FirestoreError> {
        Ok(Self {
            query: self.query.where_filter(field, op, value)?,
            ..self
        })
    }

    /// Executes the query and returns the results as a `QuerySnapshot`.
    pub async fn get(&self) -> Result<QuerySnapshot, FirestoreError> {
        let url = format!("{}:runQuery", self.parent_path);
        let request = RunQueryRequest {
            structured_query: self.query.structured(),
        };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Run query failed").await,
            ));
        }

        let responses: Vec<RunQueryResponse> = response.json().await?;

        let mut documents = Vec::new();
        let mut read_time = None;
        for entry in responses {
            if entry.read_time.is_some() {
                read_time = entry.read_time;
            }
            // trailing entries may carry a read time and no document
            if let Some(doc) = entry.document {
                documents.push(DocumentSnapshot::new(doc));
            }
        }

        Ok(QuerySnapshot {
            documents,
            read_time,
        })
    }
}
