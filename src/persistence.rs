//! Submitting signed documents to a backing store
//!
//! The engine never talks to a network itself. A [`PersistenceClient`]
//! receives one [`SubmissionBundle`] per document; two implementations ship
//! here, an in-memory recorder and a directory of JSON files.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::defaults::MAX_BUNDLE_BYTES;
use crate::encoder::SignatureImage;
use crate::errors::PersistenceError;
use crate::field::{DocumentId, FieldId, SignatureField};
use crate::log::{debug, warn};
use crate::store::DocumentFieldStore;

/// One field as the backing store sees it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub id: FieldId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub owner_label: String,
    pub signed: bool,
}

impl From<&SignatureField> for FieldRecord {
    fn from(field: &SignatureField) -> Self {
        let rect = field.rect();
        Self {
            id: field.id(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            owner_label: field.owner_label().to_string(),
            signed: field.signed(),
        }
    }
}

/// Everything needed to persist one document's fields and signature
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBundle {
    pub document_id: DocumentId,
    pub image_ref: String,
    pub fields: Vec<FieldRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_image: Option<SignatureImage>,
}

impl SubmissionBundle {
    /// Snapshot a store. The signature image is the one bound to the first
    /// signed field, if any.
    pub fn from_store(store: &DocumentFieldStore) -> Self {
        let document = store.document();
        Self {
            document_id: document.id.clone(),
            image_ref: document.image_ref.clone(),
            fields: store.fields().iter().map(FieldRecord::from).collect(),
            signature_image: store
                .fields()
                .iter()
                .find_map(|f| f.signature())
                .map(|image| image.as_ref().clone()),
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Acknowledgement of a stored bundle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub document_id: DocumentId,
    /// Where the store put it (a path, key or URL)
    pub location: String,
    pub bytes: usize,
}

#[async_trait]
pub trait PersistenceClient: Send + Sync {
    async fn submit(&self, bundle: &SubmissionBundle) -> Result<Receipt, PersistenceError>;
}

/// Records bundles in memory. Can be told to fail upcoming submissions.
#[derive(Debug, Default)]
pub struct MemoryClient {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    bundles: Vec<SubmissionBundle>,
    reject: usize,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `n` submissions with a 503
    pub fn reject_next(&self, n: usize) {
        self.state().reject = n;
    }

    /// Bundles accepted so far, oldest first
    pub fn submissions(&self) -> Vec<SubmissionBundle> {
        self.state().bundles.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // a panic elsewhere leaves the recorded bundles intact
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PersistenceClient for MemoryClient {
    async fn submit(&self, bundle: &SubmissionBundle) -> Result<Receipt, PersistenceError> {
        let bytes = serde_json::to_vec(bundle)?.len();
        let mut state = self.state();
        if state.reject > 0 {
            state.reject -= 1;
            warn!(document = %bundle.document_id, "memory store rejecting submission");
            return Err(PersistenceError::Rejected {
                document: bundle.document_id.clone(),
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        state.bundles.push(bundle.clone());
        Ok(Receipt {
            document_id: bundle.document_id.clone(),
            location: format!("memory:{}", state.bundles.len() - 1),
            bytes,
        })
    }
}

/// Writes each bundle to `<root>/<documentId>.json`, replacing earlier
/// submissions of the same document.
#[derive(Clone, Debug)]
pub struct DirectoryClient {
    root: Utf8PathBuf,
    max_bytes: usize,
}

impl DirectoryClient {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into(), max_bytes: MAX_BUNDLE_BYTES }
    }

    pub fn with_limit(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// File a document's bundle lands in
    pub fn bundle_path(&self, document: &DocumentId) -> Result<Utf8PathBuf, PersistenceError> {
        if !document.is_file_safe() {
            return Err(PersistenceError::InvalidDocumentId(document.as_str().to_string()));
        }
        Ok(self.root.join(format!("{document}.json")))
    }
}

#[async_trait]
impl PersistenceClient for DirectoryClient {
    async fn submit(&self, bundle: &SubmissionBundle) -> Result<Receipt, PersistenceError> {
        let path = self.bundle_path(&bundle.document_id)?;
        let body = serde_json::to_vec_pretty(bundle)?;
        if body.len() > self.max_bytes {
            return Err(PersistenceError::PayloadTooLarge { size: body.len(), limit: self.max_bytes });
        }
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, &body).await?;
        debug!(%path, bytes = body.len(), "bundle written");
        Ok(Receipt {
            document_id: bundle.document_id.clone(),
            location: path.into_string(),
            bytes: body.len(),
        })
    }
}
