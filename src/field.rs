//! Documents and the signature fields placed on them

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::encoder::SignatureImage;
use crate::types::{Point, Rect, Size};

/// Identifier of a field, unique within its document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a document, unique within a session.
/// Numeric ids are kept in their decimal form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Usable as a single file name: non-empty, not `.` or `..`, and free of
    /// path separators and control characters.
    pub fn is_file_safe(&self) -> bool {
        let id = self.as_str();
        !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && !id.chars().any(char::is_control)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        DocumentId(s)
    }
}

impl From<u64> for DocumentId {
    fn from(n: u64) -> Self {
        DocumentId(n.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document page the fields are overlaid on
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    /// URL or data URI of the background image; never fetched here
    pub image_ref: String,
    /// Rendered surface bounds; drag gestures clamp against these
    pub size: Size,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, image_ref: impl Into<String>, size: Size) -> Self {
        Self { id: id.into(), image_ref: image_ref.into(), size }
    }
}

/// A rectangular region designated to receive a signature
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureField {
    id: FieldId,
    rect: Rect,
    owner_label: String,
    signature: Option<Arc<SignatureImage>>,
}

impl SignatureField {
    pub(crate) fn new(id: FieldId, rect: Rect, owner_label: impl Into<String>) -> Self {
        Self { id, rect, owner_label: owner_label.into(), signature: None }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn top_left(&self) -> Point {
        self.rect.top_left()
    }

    /// Name of the recipient the field was placed for
    pub fn owner_label(&self) -> &str {
        &self.owner_label
    }

    pub fn signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn signature(&self) -> Option<&Arc<SignatureImage>> {
        self.signature.as_ref()
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub(crate) fn bind(&mut self, image: Arc<SignatureImage>) {
        self.signature = Some(image);
    }
}
