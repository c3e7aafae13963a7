use serde::de::DeserializeOwned;

use super::models::{fields_to_json, Document};
use super::FirestoreError;

/// A snapshot of one document returned by a query. Owns its data.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    id: String,
    document: Document,
}

impl DocumentSnapshot {
    pub(crate) fn new(document: Document) -> Self {
        let id = document
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self { id, document }
    }

    /// The ID of the document (the last path segment of its name).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The time the document was created.
    pub fn create_time(&self) -> Option<&str> {
        self.document.create_time.as_deref()
    }

    /// The time the document was last updated.
    pub fn update_time(&self) -> Option<&str> {
        self.document.update_time.as_deref()
    }

    /// Decodes the document fields into `T`.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, FirestoreError> {
        let json = fields_to_json(self.document.fields.clone());
        Ok(serde_json::from_value(json)?)
    }
}

/// A `QuerySnapshot` contains zero or more `DocumentSnapshot` objects.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub(crate) documents: Vec<DocumentSnapshot>,
    pub(crate) read_time: Option<String>,
}

impl QuerySnapshot {
    /// The documents in this snapshot.
    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    /// Returns `true` if there are no documents in the snapshot.
    pub fn empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The number of documents in the snapshot.
    pub fn size(&self) -> usize {
        self.documents.len()
    }

    /// The time this snapshot was read.
    pub fn read_time(&self) -> Option<&str> {
        self.read_time.as_deref()
    }

    /// Iterates over the document snapshots.
    pub fn iter(&self) -> std::slice::Iter<'_, DocumentSnapshot> {
        self.documents.iter()
    }
}

impl<'a> IntoIterator for &'a QuerySnapshot {
    type Item = &'a DocumentSnapshot;
    type IntoIter = std::slice::Iter<'a, DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
