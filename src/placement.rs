//! Turning document clicks into signature fields

use crate::config::EngineConfig;
use crate::errors::PlacementError;
use crate::field::{FieldId, SignatureField};
use crate::geometry::{contains, overlaps, resize_handle};
use crate::log::debug;
use crate::store::DocumentFieldStore;
use crate::types::{Point, Rect, Size};

/// What lies under the pointer on a document surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitRegion {
    /// Bottom-right grab square of a field
    ResizeHandle(FieldId),
    /// Anywhere else inside a field
    FieldBody(FieldId),
    /// Bare document background
    Document,
}

/// Find what a press at `point` lands on.
///
/// Resize handles are checked before bodies, and later fields are drawn on
/// top, so they win ties.
pub fn hit_test(fields: &[SignatureField], point: Point, handle: f64) -> HitRegion {
    if let Some(field) = fields.iter().rev().find(|f| contains(&resize_handle(&f.rect(), handle), point)) {
        return HitRegion::ResizeHandle(field.id());
    }
    if let Some(field) = fields.iter().rev().find(|f| contains(&f.rect(), point)) {
        return HitRegion::FieldBody(field.id());
    }
    HitRegion::Document
}

#[derive(Clone, Copy, Debug)]
pub struct FieldPlacementEngine {
    default_size: Size,
}

impl Default for FieldPlacementEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl FieldPlacementEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self { default_size: config.default_field_size }
    }

    pub fn default_size(&self) -> Size {
        self.default_size
    }

    /// Geometry a field placed at `point` would get, anchored by its
    /// top-left corner. Fails if it would overlap any of `existing`.
    pub fn plan(&self, point: Point, existing: &[SignatureField]) -> Result<Rect, PlacementError> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return Err(PlacementError::OutsideDocument { x: point.x, y: point.y });
        }
        let candidate = Rect::from_origin_size(point, self.default_size);
        match existing.iter().find(|f| overlaps(&candidate, &f.rect())) {
            Some(field) => Err(PlacementError::Overlap { existing: field.id() }),
            None => Ok(candidate),
        }
    }

    /// Create a field at `point`. The store is untouched on error.
    pub fn place_field(
        &self,
        store: &mut DocumentFieldStore,
        point: Point,
        owner_label: &str,
    ) -> Result<FieldId, PlacementError> {
        let rect = self.plan(point, store.fields()).inspect_err(|err| {
            debug!(%point, %err, "placement rejected");
        })?;
        Ok(store.insert(rect, owner_label))
    }
}
