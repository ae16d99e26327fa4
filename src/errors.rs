//! Error types with diagnostics using miette
//!
//! Geometry, gesture and capture errors are plain values returned at the point
//! of failure. Script errors carry source spans so miette can point at the
//! offending statement.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::field::{DocumentId, FieldId};

// ============================================================================
// Capture / Encoding Errors
// ============================================================================

/// Errors from the signature pad and the image encoder
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("nothing has been drawn yet")]
    #[diagnostic(
        code(signpad::capture::empty),
        help("draw a signature before saving")
    )]
    EmptyCapture,

    #[error("signature image is {size} bytes, limit is {limit}")]
    #[diagnostic(code(signpad::capture::oversized))]
    OversizedImage { size: usize, limit: usize },

    #[error("malformed signature image: {reason}")]
    #[diagnostic(code(signpad::capture::malformed))]
    Malformed { reason: String },

    #[error("capture surface must be at least 1x1 pixel, got {width}x{height}")]
    #[diagnostic(code(signpad::capture::invalid_canvas))]
    InvalidCanvas { width: f64, height: f64 },

    #[error("failed to encode signature: {0}")]
    #[diagnostic(code(signpad::capture::encoding))]
    Encoding(String),
}

// ============================================================================
// Placement / Gesture Errors
// ============================================================================

/// Errors from turning a document click into a field
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("field would overlap field {existing}")]
    #[diagnostic(
        code(signpad::placement::overlap),
        help("click on an empty area of the document")
    )]
    Overlap { existing: FieldId },

    #[error("placement point ({x}, {y}) is outside the document")]
    #[diagnostic(code(signpad::placement::outside_document))]
    OutsideDocument { x: f64, y: f64 },
}

/// Errors from starting a drag or resize gesture
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum GestureError {
    #[error("no field with id {0}")]
    #[diagnostic(code(signpad::gesture::unknown_field))]
    UnknownField(FieldId),
}

// ============================================================================
// Session Errors
// ============================================================================

/// Errors from the multi-document signing flow
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("no document with id {0}")]
    #[diagnostic(code(signpad::session::unknown_document))]
    UnknownDocument(DocumentId),

    #[error("no document is displayed")]
    #[diagnostic(code(signpad::session::no_document))]
    NoDocument,

    #[error("no field with id {0}")]
    #[diagnostic(code(signpad::session::unknown_field))]
    UnknownField(FieldId),

    #[error("no saved signature")]
    #[diagnostic(
        code(signpad::session::no_saved_signature),
        help("save the signature again after editing it")
    )]
    NoSavedSignature,

    #[error("document {document} still has {unsigned} unsigned field(s)")]
    #[diagnostic(code(signpad::session::document_incomplete))]
    DocumentIncomplete { document: DocumentId, unsigned: usize },

    #[error("already at the last document")]
    #[diagnostic(code(signpad::session::last_document))]
    LastDocument,

    #[error("document {0} is already loaded")]
    #[diagnostic(code(signpad::session::duplicate_document))]
    DuplicateDocument(DocumentId),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Placement(#[from] PlacementError),
}

// ============================================================================
// Persistence Errors
// ============================================================================

/// Failures at the persistence boundary. All of them are retryable; local
/// state is never rolled back.
#[derive(Error, Diagnostic, Debug)]
pub enum PersistenceError {
    #[error("store rejected bundle for {document} ({status}): {message}")]
    #[diagnostic(code(signpad::persistence::rejected), help("retry the submission"))]
    Rejected { document: DocumentId, status: u16, message: String },

    #[error("bundle is {size} bytes, the store accepts at most {limit}")]
    #[diagnostic(code(signpad::persistence::payload_too_large))]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("no document is displayed")]
    #[diagnostic(code(signpad::persistence::no_document))]
    NoDocument,

    #[error("no document with id {0}")]
    #[diagnostic(code(signpad::persistence::unknown_document))]
    UnknownDocument(DocumentId),

    #[error("document id {0:?} cannot be used as a storage key")]
    #[diagnostic(code(signpad::persistence::invalid_document_id))]
    InvalidDocumentId(String),

    #[error("failed to serialize bundle")]
    #[diagnostic(code(signpad::persistence::serialize))]
    Serialize(#[from] serde_json::Error),

    #[error("i/o error while storing bundle")]
    #[diagnostic(code(signpad::persistence::io))]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Config Errors
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("failed to parse config")]
    #[diagnostic(code(signpad::config::parse))]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config file {path}")]
    #[diagnostic(code(signpad::config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {message}")]
    #[diagnostic(code(signpad::config::invalid))]
    Invalid { message: String },
}

// ============================================================================
// Gesture Script Errors
// ============================================================================

/// Errors raised while parsing or replaying a gesture script
#[derive(Error, Diagnostic, Debug)]
pub enum ScriptError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(signpad::script::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("expected {expected}, got {actual}")]
    #[diagnostic(code(signpad::script::unexpected_outcome))]
    UnexpectedOutcome {
        expected: String,
        actual: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("this statement")]
        span: SourceSpan,
    },

    #[error("assertion failed")]
    #[diagnostic(code(signpad::script::assertion_failed))]
    AssertionFailed {
        #[source_code]
        src: NamedSource<String>,
        #[label("assertion failed here")]
        span: SourceSpan,
        #[help]
        details: Option<String>,
    },
}
