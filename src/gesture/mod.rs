//! Pointer gestures on a document surface
//!
//! A press is routed by hit-testing: the resize handle starts a resize, a
//! field body starts a drag, and bare document starts a placement. The drag
//! or resize controller only exists between press and release, so a document
//! has at most one gesture in flight.

mod drag;
mod resize;

pub use drag::DragController;
pub use resize::ResizeController;

use enum_dispatch::enum_dispatch;

use crate::config::EngineConfig;
use crate::errors::PlacementError;
use crate::field::FieldId;
use crate::log::debug;
use crate::placement::{FieldPlacementEngine, HitRegion, hit_test};
use crate::store::DocumentFieldStore;
use crate::types::{Point, Rect, Size};

/// Common surface of the drag and resize controllers while a gesture runs
#[enum_dispatch]
pub trait PointerGesture {
    /// Field being manipulated, if the gesture is still live
    fn field(&self) -> Option<FieldId>;
    fn pointer_move(&mut self, store: &mut DocumentFieldStore, pointer: Point) -> Option<Rect>;
    /// End the gesture, returning the field it manipulated
    fn release(&mut self) -> Option<FieldId>;
    fn moved(&self) -> bool;
}

#[enum_dispatch(PointerGesture)]
#[derive(Clone, Debug)]
pub enum ActiveGesture {
    DragController,
    ResizeController,
}

/// What a pointer event did to the document
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    Placed(FieldId),
    PlacementRejected(PlacementError),
    DragStarted(FieldId),
    ResizeStarted(FieldId),
    FieldMoved(FieldId, Rect),
    FieldResized(FieldId, Rect),
    /// A field was pressed and released without moving
    FieldClicked(FieldId),
    GestureEnded(FieldId),
    Ignored,
}

#[derive(Clone, Debug)]
pub struct PointerRouter {
    placement: FieldPlacementEngine,
    min_size: Size,
    handle: f64,
    active: Option<ActiveGesture>,
    selected: Option<FieldId>,
}

impl Default for PointerRouter {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl PointerRouter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            placement: FieldPlacementEngine::new(config),
            min_size: config.min_field_size,
            handle: config.resize_handle,
            active: None,
            selected: None,
        }
    }

    pub fn placement(&self) -> &FieldPlacementEngine {
        &self.placement
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Field under the live drag or resize
    pub fn active_field(&self) -> Option<FieldId> {
        self.active.as_ref().and_then(PointerGesture::field)
    }

    /// Last field whose body was pressed
    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn pointer_down(&mut self, store: &mut DocumentFieldStore, point: Point, owner_label: &str) -> Interaction {
        if self.active.is_some() {
            debug!(%point, "pointer down during active gesture ignored");
            return Interaction::Ignored;
        }
        match hit_test(store.fields(), point, self.handle) {
            HitRegion::ResizeHandle(id) => {
                let mut resize = ResizeController::new(self.min_size);
                if resize.begin(store, id, point).is_err() {
                    return Interaction::Ignored;
                }
                self.active = Some(resize.into());
                Interaction::ResizeStarted(id)
            }
            HitRegion::FieldBody(id) => {
                let mut drag = DragController::new();
                if drag.begin(store, id, point).is_err() {
                    return Interaction::Ignored;
                }
                self.active = Some(drag.into());
                self.selected = Some(id);
                Interaction::DragStarted(id)
            }
            HitRegion::Document => match self.placement.place_field(store, point, owner_label) {
                Ok(id) => Interaction::Placed(id),
                Err(err) => Interaction::PlacementRejected(err),
            },
        }
    }

    pub fn pointer_move(&mut self, store: &mut DocumentFieldStore, point: Point) -> Interaction {
        let Some(gesture) = self.active.as_mut() else {
            return Interaction::Ignored;
        };
        let Some(field) = gesture.field() else {
            self.active = None;
            return Interaction::Ignored;
        };
        match gesture.pointer_move(store, point) {
            Some(rect) => match gesture {
                ActiveGesture::DragController(_) => Interaction::FieldMoved(field, rect),
                ActiveGesture::ResizeController(_) => Interaction::FieldResized(field, rect),
            },
            None => {
                // the field went away underneath the gesture
                self.active = None;
                Interaction::Ignored
            }
        }
    }

    pub fn pointer_up(&mut self) -> Interaction {
        self.finish(true)
    }

    /// Lost pointer capture. Ends the gesture like a release but never
    /// counts as a click.
    pub fn pointer_cancel(&mut self) -> Interaction {
        self.finish(false)
    }

    fn finish(&mut self, report_click: bool) -> Interaction {
        let Some(mut gesture) = self.active.take() else {
            return Interaction::Ignored;
        };
        let clicked = report_click && !gesture.moved() && matches!(gesture, ActiveGesture::DragController(_));
        match gesture.release() {
            Some(id) if clicked => Interaction::FieldClicked(id),
            Some(id) => Interaction::GestureEnded(id),
            None => Interaction::Ignored,
        }
    }
}
