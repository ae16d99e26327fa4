//! Signature fields on document images, and the freehand signature that
//! fills them.
//!
//! A [`SigningSession`] holds one or more documents. Clicking bare document
//! places a fixed-size field, fields are dragged by their body and resized
//! from their bottom-right handle, and a signature drawn on the
//! [`StrokeCaptureSurface`] is encoded to a transparent PNG and bound to
//! fields. Finished documents are handed to a [`PersistenceClient`].

pub mod log;

pub mod capture;
pub mod config;
pub mod defaults;
pub mod encoder;
pub mod errors;
pub mod field;
pub mod geometry;
pub mod gesture;
pub mod persistence;
pub mod placement;
pub mod script;
pub mod session;
pub mod store;
pub mod types;

pub use capture::{CaptureState, InkStroke, StrokeCaptureSurface};
pub use config::{EngineConfig, PenStyle};
pub use encoder::{SignatureEncoder, SignatureImage};
pub use errors::{
    CaptureError, ConfigError, GestureError, PersistenceError, PlacementError, ScriptError, SessionError,
};
pub use field::{Document, DocumentId, FieldId, SignatureField};
pub use gesture::{ActiveGesture, DragController, Interaction, PointerGesture, PointerRouter, ResizeController};
pub use persistence::{DirectoryClient, FieldRecord, MemoryClient, PersistenceClient, Receipt, SubmissionBundle};
pub use placement::{FieldPlacementEngine, HitRegion, hit_test};
pub use session::SigningSession;
pub use store::{DocumentFieldStore, DocumentSet};
pub use types::{Offset, Point, Rect, Size};

/// Replay a gesture script with the default configuration.
///
/// Returns the finished session on success, or a diagnostic pointing at the
/// statement that failed.
pub fn replay(source: &str) -> Result<script::ScriptReport, miette::Report> {
    script::run("<script>", source, &EngineConfig::default())
}
