use crate::errors::GestureError;
use crate::field::FieldId;
use crate::geometry::clamp_rect;
use crate::log::debug;
use crate::store::DocumentFieldStore;
use crate::types::{Offset, Point, Rect};

use super::PointerGesture;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        field: FieldId,
        /// Pointer position relative to the field's top-left at grab time
        offset: Offset,
        moved: bool,
    },
}

/// Moves a field with the pointer, keeping it inside the document
#[derive(Clone, Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, store: &DocumentFieldStore, field: FieldId, pointer: Point) -> Result<(), GestureError> {
        let target = store.field(field).ok_or(GestureError::UnknownField(field))?;
        let offset = pointer - target.top_left();
        debug!(%field, %pointer, "drag started");
        self.state = DragState::Dragging { field, offset, moved: false };
        Ok(())
    }

    /// Reposition the field under the pointer. Returns the new geometry, or
    /// `None` when idle. If the field was deleted mid-gesture the drag ends.
    /// A non-finite pointer leaves the field where it is.
    pub fn move_to(&mut self, store: &mut DocumentFieldStore, pointer: Point) -> Option<Rect> {
        let DragState::Dragging { field, offset, moved } = &mut self.state else {
            return None;
        };
        let bounds = store.document().size;
        let Some(target) = store.field_mut(*field) else {
            debug!(field = %*field, "dragged field vanished, ending drag");
            self.state = DragState::Idle;
            return None;
        };
        if !pointer.is_finite() {
            return Some(target.rect());
        }
        let rect = clamp_rect(target.rect().with_origin(pointer - *offset), bounds);
        target.set_rect(rect);
        *moved = true;
        Some(rect)
    }

    /// Stop dragging. The field keeps its last position.
    pub fn end(&mut self) -> Option<FieldId> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { field, .. } => {
                debug!(%field, "drag ended");
                Some(field)
            }
            DragState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The pointer moved since the drag began
    pub fn has_moved(&self) -> bool {
        matches!(self.state, DragState::Dragging { moved: true, .. })
    }
}

impl PointerGesture for DragController {
    fn field(&self) -> Option<FieldId> {
        match self.state {
            DragState::Dragging { field, .. } => Some(field),
            DragState::Idle => None,
        }
    }

    fn pointer_move(&mut self, store: &mut DocumentFieldStore, pointer: Point) -> Option<Rect> {
        self.move_to(store, pointer)
    }

    fn release(&mut self) -> Option<FieldId> {
        self.end()
    }

    fn moved(&self) -> bool {
        self.has_moved()
    }
}
