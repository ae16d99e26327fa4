//! A signing session over one or more documents
//!
//! The session owns the documents, the shared signature pad and the pointer
//! router for whichever document is displayed. Everything is synchronous
//! except submission, which borrows the session immutably.

use std::sync::Arc;

use crate::capture::{CaptureState, StrokeCaptureSurface};
use crate::config::EngineConfig;
use crate::encoder::{SignatureEncoder, SignatureImage};
use crate::errors::{PersistenceError, SessionError};
use crate::field::{Document, DocumentId, FieldId, SignatureField};
use crate::gesture::{Interaction, PointerRouter};
use crate::log::{debug, info, warn};
use crate::persistence::{PersistenceClient, Receipt, SubmissionBundle};
use crate::store::{DocumentFieldStore, DocumentSet};
use crate::types::Point;

#[derive(Debug)]
pub struct SigningSession {
    config: EngineConfig,
    documents: DocumentSet,
    surface: StrokeCaptureSurface,
    encoder: SignatureEncoder,
    router: PointerRouter,
    saved: Option<Arc<SignatureImage>>,
}

impl SigningSession {
    pub fn new(config: EngineConfig) -> Result<Self, SessionError> {
        let surface = StrokeCaptureSurface::new(config.canvas_size, config.pen)?;
        Ok(Self {
            encoder: SignatureEncoder::from_config(&config),
            router: PointerRouter::new(&config),
            documents: DocumentSet::new(),
            saved: None,
            surface,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn router(&self) -> &PointerRouter {
        &self.router
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    pub fn add_document(&mut self, document: Document) -> Result<(), SessionError> {
        let id = document.id.clone();
        if !self.documents.insert(document) {
            return Err(SessionError::DuplicateDocument(id));
        }
        debug!(document = %id, "document added");
        Ok(())
    }

    pub fn remove_document(&mut self, id: &DocumentId) -> Result<DocumentFieldStore, SessionError> {
        if self.documents.current_id() == Some(id) {
            self.reset_pointer();
        }
        self.documents
            .remove(id)
            .ok_or_else(|| SessionError::UnknownDocument(id.clone()))
    }

    pub fn move_document(&mut self, id: &DocumentId, index: usize) -> Result<(), SessionError> {
        if self.documents.move_to_index(id, index) {
            Ok(())
        } else {
            Err(SessionError::UnknownDocument(id.clone()))
        }
    }

    /// Display another document. Any gesture on the previous one is cancelled.
    pub fn select(&mut self, id: &DocumentId) -> Result<(), SessionError> {
        if self.documents.get(id).is_none() {
            return Err(SessionError::UnknownDocument(id.clone()));
        }
        if self.documents.current_id() != Some(id) {
            self.reset_pointer();
        }
        self.documents.select(id);
        Ok(())
    }

    pub fn current(&self) -> Option<&DocumentFieldStore> {
        self.documents.current()
    }

    /// Move to the next document once every field on this one is signed
    pub fn advance(&mut self) -> Result<DocumentId, SessionError> {
        let store = self.documents.current().ok_or(SessionError::NoDocument)?;
        let unsigned = store.unsigned_fields().count();
        if unsigned > 0 {
            return Err(SessionError::DocumentIncomplete { document: store.document().id.clone(), unsigned });
        }
        if self.documents.next_id().is_none() {
            return Err(SessionError::LastDocument);
        }
        self.reset_pointer();
        let next = self.documents.advance().cloned().ok_or(SessionError::LastDocument)?;
        info!(document = %next, "advanced to next document");
        Ok(next)
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    pub fn delete_field(&mut self, id: FieldId) -> Result<SignatureField, SessionError> {
        if self.router.active_field() == Some(id) {
            self.router.pointer_cancel();
        }
        if self.router.selected() == Some(id) {
            self.router.clear_selection();
        }
        self.current_mut()?.delete_field(id).ok_or(SessionError::UnknownField(id))
    }

    /// Bind the saved signature to one field of the displayed document
    pub fn sign_field(&mut self, id: FieldId) -> Result<(), SessionError> {
        let image = self.saved.clone().ok_or(SessionError::NoSavedSignature)?;
        if self.current_mut()?.bind_signature(id, image) {
            Ok(())
        } else {
            Err(SessionError::UnknownField(id))
        }
    }

    /// Bind the saved signature to every unsigned field of the displayed
    /// document. Returns how many fields were signed.
    pub fn sign_current_document(&mut self) -> Result<usize, SessionError> {
        let image = self.saved.clone().ok_or(SessionError::NoSavedSignature)?;
        let store = self.current_mut()?;
        let pending: Vec<FieldId> = store.unsigned_fields().map(SignatureField::id).collect();
        for id in &pending {
            store.bind_signature(*id, Arc::clone(&image));
        }
        Ok(pending.len())
    }

    // ------------------------------------------------------------------
    // Pointer input on the displayed document
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, point: Point, owner_label: &str) -> Result<Interaction, SessionError> {
        let store = self.documents.current_mut().ok_or(SessionError::NoDocument)?;
        Ok(self.router.pointer_down(store, point, owner_label))
    }

    pub fn pointer_move(&mut self, point: Point) -> Result<Interaction, SessionError> {
        let store = self.documents.current_mut().ok_or(SessionError::NoDocument)?;
        Ok(self.router.pointer_move(store, point))
    }

    pub fn pointer_up(&mut self) -> Interaction {
        self.router.pointer_up()
    }

    pub fn pointer_cancel(&mut self) -> Interaction {
        self.router.pointer_cancel()
    }

    // ------------------------------------------------------------------
    // Signature capture
    // ------------------------------------------------------------------

    pub fn surface(&self) -> &StrokeCaptureSurface {
        &self.surface
    }

    pub fn saved_signature(&self) -> Option<&Arc<SignatureImage>> {
        self.saved.as_ref()
    }

    pub fn begin_stroke(&mut self, point: Point) {
        self.surface.begin_stroke(point);
        self.sync_saved();
    }

    pub fn extend_stroke(&mut self, point: Point) {
        self.surface.extend_stroke(point);
        self.sync_saved();
    }

    pub fn end_stroke(&mut self) {
        self.surface.end_stroke();
    }

    pub fn clear_signature(&mut self) {
        self.surface.clear();
        self.sync_saved();
    }

    /// Encode the pad and keep the result as the signature to apply
    pub fn save_signature(&mut self) -> Result<Arc<SignatureImage>, SessionError> {
        let image = Arc::new(self.encoder.encode(&mut self.surface)?);
        self.saved = Some(Arc::clone(&image));
        Ok(image)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn bundle(&self, id: &DocumentId) -> Result<SubmissionBundle, SessionError> {
        self.documents
            .get(id)
            .map(SubmissionBundle::from_store)
            .ok_or_else(|| SessionError::UnknownDocument(id.clone()))
    }

    /// Bundles for every document in display order
    pub fn bundles(&self) -> Vec<SubmissionBundle> {
        self.documents.iter().map(SubmissionBundle::from_store).collect()
    }

    pub async fn submit<C: PersistenceClient + ?Sized>(
        &self,
        id: &DocumentId,
        client: &C,
    ) -> Result<Receipt, PersistenceError> {
        let store = self
            .documents
            .get(id)
            .ok_or_else(|| PersistenceError::UnknownDocument(id.clone()))?;
        let bundle = SubmissionBundle::from_store(store);
        client.submit(&bundle).await.inspect_err(|err| {
            warn!(document = %id, %err, "submission failed");
        })
    }

    pub async fn submit_current<C: PersistenceClient + ?Sized>(&self, client: &C) -> Result<Receipt, PersistenceError> {
        let id = self.documents.current_id().ok_or(PersistenceError::NoDocument)?;
        self.submit(id, client).await
    }

    /// Submit every document in display order, stopping at the first failure.
    /// Documents already stored stay stored.
    pub async fn submit_all<C: PersistenceClient + ?Sized>(&self, client: &C) -> Result<Vec<Receipt>, PersistenceError> {
        let mut receipts = Vec::with_capacity(self.documents.len());
        for id in self.documents.order() {
            receipts.push(self.submit(id, client).await?);
        }
        Ok(receipts)
    }

    fn current_mut(&mut self) -> Result<&mut DocumentFieldStore, SessionError> {
        self.documents.current_mut().ok_or(SessionError::NoDocument)
    }

    fn reset_pointer(&mut self) {
        self.router.pointer_cancel();
        self.router.clear_selection();
    }

    fn sync_saved(&mut self) {
        if self.surface.state() != CaptureState::Saved && self.saved.take().is_some() {
            debug!("signature edited, saved image dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    fn session() -> SigningSession {
        let mut session = SigningSession::new(EngineConfig::default()).unwrap();
        session.add_document(Document::new("one", "one.png", Size::new(400.0, 400.0))).unwrap();
        session.add_document(Document::new("two", "two.png", Size::new(400.0, 400.0))).unwrap();
        session
    }

    fn draw(session: &mut SigningSession) {
        session.begin_stroke(Point::new(20.0, 100.0));
        session.extend_stroke(Point::new(200.0, 80.0));
        session.end_stroke();
    }

    #[test]
    fn duplicate_document_is_rejected() {
        let mut session = session();
        let err = session
            .add_document(Document::new("one", "x.png", Size::new(10.0, 10.0)))
            .unwrap_err();
        assert_eq!(err, SessionError::DuplicateDocument("one".into()));
    }

    #[test]
    fn signing_requires_a_saved_signature() {
        let mut session = session();
        let Interaction::Placed(id) = session.pointer_down(Point::new(70.0, 70.0), "Ada").unwrap() else {
            panic!("expected placement");
        };
        assert_eq!(session.sign_field(id), Err(SessionError::NoSavedSignature));

        draw(&mut session);
        session.save_signature().unwrap();
        session.sign_field(id).unwrap();
        assert!(session.current().unwrap().is_fully_signed());
    }

    #[test]
    fn stroke_after_save_drops_saved_signature() {
        let mut session = session();
        draw(&mut session);
        session.save_signature().unwrap();
        assert!(session.saved_signature().is_some());
        session.begin_stroke(Point::new(5.0, 5.0));
        assert!(session.saved_signature().is_none());
        assert_eq!(session.sign_current_document(), Err(SessionError::NoSavedSignature));
    }

    #[test]
    fn clearing_drops_saved_signature() {
        let mut session = session();
        draw(&mut session);
        session.save_signature().unwrap();
        session.clear_signature();
        assert!(session.saved_signature().is_none());
        assert!(matches!(session.save_signature(), Err(SessionError::Capture(_))));
    }

    #[test]
    fn advance_waits_for_every_field() {
        let mut session = session();
        session.pointer_down(Point::new(0.0, 0.0), "Ada").unwrap();
        session.pointer_down(Point::new(0.0, 200.0), "Ada").unwrap();
        assert!(matches!(
            session.advance(),
            Err(SessionError::DocumentIncomplete { unsigned: 2, .. })
        ));

        draw(&mut session);
        session.save_signature().unwrap();
        assert_eq!(session.sign_current_document(), Ok(2));
        assert_eq!(session.advance(), Ok(DocumentId::from("two")));
        assert_eq!(session.advance(), Err(SessionError::LastDocument));
    }

    #[test]
    fn deleting_dragged_field_cancels_gesture() {
        let mut session = session();
        let Interaction::Placed(id) = session.pointer_down(Point::new(10.0, 10.0), "Ada").unwrap() else {
            panic!("expected placement");
        };
        session.pointer_down(Point::new(20.0, 20.0), "Ada").unwrap();
        assert!(session.router().is_active());
        session.delete_field(id).unwrap();
        assert!(!session.router().is_active());
        assert_eq!(session.delete_field(id).unwrap_err(), SessionError::UnknownField(id));
    }

    #[test]
    fn switching_documents_cancels_gesture() {
        let mut session = session();
        session.pointer_down(Point::new(10.0, 10.0), "Ada").unwrap();
        session.pointer_down(Point::new(20.0, 20.0), "Ada").unwrap();
        session.select(&"two".into()).unwrap();
        assert!(!session.router().is_active());
        assert_eq!(session.select(&"nope".into()), Err(SessionError::UnknownDocument("nope".into())));
    }

    #[test]
    fn bundle_reflects_fields() {
        let mut session = session();
        session.pointer_down(Point::new(70.0, 70.0), "Ada").unwrap();
        let bundle = session.bundle(&"one".into()).unwrap();
        assert_eq!(bundle.fields.len(), 1);
        assert!(!bundle.fields[0].signed);
        assert!(bundle.signature_image.is_none());
        assert_eq!(session.bundles().len(), 2);
    }
}
