use crate::errors::GestureError;
use crate::field::FieldId;
use crate::log::debug;
use crate::store::DocumentFieldStore;
use crate::types::{Point, Rect, Size};

use super::PointerGesture;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum ResizeState {
    #[default]
    Idle,
    Resizing {
        field: FieldId,
        last: Point,
        moved: bool,
    },
}

/// Grows or shrinks a field from its bottom-right corner.
///
/// Width and height never go below the configured minimum. Unlike dragging,
/// the result is not clamped to the document bounds.
#[derive(Clone, Debug)]
pub struct ResizeController {
    min_size: Size,
    state: ResizeState,
}

impl ResizeController {
    pub fn new(min_size: Size) -> Self {
        Self { min_size, state: ResizeState::Idle }
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn begin(&mut self, store: &DocumentFieldStore, field: FieldId, pointer: Point) -> Result<(), GestureError> {
        if store.field(field).is_none() {
            return Err(GestureError::UnknownField(field));
        }
        debug!(%field, %pointer, "resize started");
        self.state = ResizeState::Resizing { field, last: pointer, moved: false };
        Ok(())
    }

    /// Apply the pointer delta since the previous move
    pub fn move_to(&mut self, store: &mut DocumentFieldStore, pointer: Point) -> Option<Rect> {
        let ResizeState::Resizing { field, last, moved } = &mut self.state else {
            return None;
        };
        let Some(target) = store.field_mut(*field) else {
            debug!(field = %*field, "resized field vanished, ending resize");
            self.state = ResizeState::Idle;
            return None;
        };
        if !pointer.is_finite() {
            return Some(target.rect());
        }
        let delta = pointer - *last;
        let rect = target.rect();
        let size = Size::new(
            (rect.width + delta.dx).max(self.min_size.w),
            (rect.height + delta.dy).max(self.min_size.h),
        );
        let rect = rect.with_size(size);
        target.set_rect(rect);
        *last = pointer;
        *moved = true;
        Some(rect)
    }

    pub fn end(&mut self) -> Option<FieldId> {
        match std::mem::take(&mut self.state) {
            ResizeState::Resizing { field, .. } => {
                debug!(%field, "resize ended");
                Some(field)
            }
            ResizeState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ResizeState::Resizing { .. })
    }
}

impl PointerGesture for ResizeController {
    fn field(&self) -> Option<FieldId> {
        match self.state {
            ResizeState::Resizing { field, .. } => Some(field),
            ResizeState::Idle => None,
        }
    }

    fn pointer_move(&mut self, store: &mut DocumentFieldStore, pointer: Point) -> Option<Rect> {
        self.move_to(store, pointer)
    }

    fn release(&mut self) -> Option<FieldId> {
        self.end()
    }

    fn moved(&self) -> bool {
        matches!(self.state, ResizeState::Resizing { moved: true, .. })
    }
}
