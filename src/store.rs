//! Per-document field collections and the set of documents in a session

use std::collections::HashMap;
use std::sync::Arc;

use crate::encoder::SignatureImage;
use crate::field::{Document, DocumentId, FieldId, SignatureField};
use crate::log::debug;
use crate::types::Rect;

/// The ordered fields of one document.
///
/// Fields are only created through placement, only moved or resized through
/// the gesture controllers, and removed through [`delete_field`].
///
/// [`delete_field`]: DocumentFieldStore::delete_field
#[derive(Clone, Debug)]
pub struct DocumentFieldStore {
    document: Document,
    fields: Vec<SignatureField>,
    next_id: u64,
}

impl DocumentFieldStore {
    pub fn new(document: Document) -> Self {
        Self { document, fields: Vec::new(), next_id: 1 }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Fields in creation order
    pub fn fields(&self) -> &[SignatureField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, id: FieldId) -> Option<&SignatureField> {
        self.fields.iter().find(|f| f.id() == id)
    }

    pub(crate) fn field_mut(&mut self, id: FieldId) -> Option<&mut SignatureField> {
        self.fields.iter_mut().find(|f| f.id() == id)
    }

    /// Append a field; ids are never reused within a store.
    pub(crate) fn insert(&mut self, rect: Rect, owner_label: &str) -> FieldId {
        let id = FieldId(self.next_id);
        self.next_id += 1;
        self.fields.push(SignatureField::new(id, rect, owner_label));
        debug!(document = %self.document.id, field = %id, "field inserted");
        id
    }

    /// Remove a field unconditionally. Confirmation happens in the UI.
    pub fn delete_field(&mut self, id: FieldId) -> Option<SignatureField> {
        let index = self.fields.iter().position(|f| f.id() == id)?;
        debug!(document = %self.document.id, field = %id, "field deleted");
        Some(self.fields.remove(index))
    }

    /// Bind a saved signature to a field, marking it signed.
    /// Returns false if the field does not exist.
    pub fn bind_signature(&mut self, id: FieldId, image: Arc<SignatureImage>) -> bool {
        match self.field_mut(id) {
            Some(field) => {
                field.bind(image);
                true
            }
            None => false,
        }
    }

    pub fn unsigned_fields(&self) -> impl Iterator<Item = &SignatureField> {
        self.fields.iter().filter(|f| !f.signed())
    }

    /// Every field is signed. Vacuously true for a document without fields.
    pub fn is_fully_signed(&self) -> bool {
        self.fields.iter().all(SignatureField::signed)
    }
}

/// Documents of a session keyed by their stable id, plus display order and
/// the currently displayed document.
///
/// The current document is tracked by id, so reordering or removing other
/// documents never changes which one is displayed.
#[derive(Clone, Debug, Default)]
pub struct DocumentSet {
    order: Vec<DocumentId>,
    stores: HashMap<DocumentId, DocumentFieldStore>,
    current: Option<DocumentId>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document at the end of the display order. The first document
    /// added becomes the current one. Returns false for a duplicate id.
    pub fn insert(&mut self, document: Document) -> bool {
        if self.stores.contains_key(&document.id) {
            return false;
        }
        let id = document.id.clone();
        self.order.push(id.clone());
        self.stores.insert(id.clone(), DocumentFieldStore::new(document));
        if self.current.is_none() {
            self.current = Some(id);
        }
        true
    }

    /// Remove a document. If it was displayed, the document now at its
    /// position (or the new last one) becomes current.
    pub fn remove(&mut self, id: &DocumentId) -> Option<DocumentFieldStore> {
        let index = self.position(id)?;
        self.order.remove(index);
        if self.current.as_ref() == Some(id) {
            let next = index.min(self.order.len().saturating_sub(1));
            self.current = self.order.get(next).cloned();
        }
        self.stores.remove(id)
    }

    /// Move a document to `index` in the display order (clamped to the end)
    pub fn move_to_index(&mut self, id: &DocumentId, index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let doc = self.order.remove(from);
        let to = index.min(self.order.len());
        self.order.insert(to, doc);
        true
    }

    pub fn order(&self) -> &[DocumentId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, id: &DocumentId) -> Option<usize> {
        self.order.iter().position(|d| d == id)
    }

    pub fn get(&self, id: &DocumentId) -> Option<&DocumentFieldStore> {
        self.stores.get(id)
    }

    pub fn get_mut(&mut self, id: &DocumentId) -> Option<&mut DocumentFieldStore> {
        self.stores.get_mut(id)
    }

    /// Stores in display order
    pub fn iter(&self) -> impl Iterator<Item = &DocumentFieldStore> {
        self.order.iter().filter_map(|id| self.stores.get(id))
    }

    pub fn current_id(&self) -> Option<&DocumentId> {
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&DocumentFieldStore> {
        self.current.as_ref().and_then(|id| self.stores.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut DocumentFieldStore> {
        match self.current.as_ref() {
            Some(id) => self.stores.get_mut(id),
            None => None,
        }
    }

    /// Display a specific document. Returns false for an unknown id.
    pub fn select(&mut self, id: &DocumentId) -> bool {
        if !self.stores.contains_key(id) {
            return false;
        }
        self.current = Some(id.clone());
        true
    }

    /// The document after the current one in display order
    pub fn next_id(&self) -> Option<&DocumentId> {
        let index = self.position(self.current.as_ref()?)?;
        self.order.get(index + 1)
    }

    /// Display the next document. Stays put on the last one.
    pub fn advance(&mut self) -> Option<&DocumentId> {
        let next = self.next_id()?.clone();
        self.current = Some(next);
        self.current.as_ref()
    }
}
