//! Default sizes and limits (all in document pixels unless noted)

use crate::types::Size;

/// Size of a newly placed field; the click point becomes its top-left corner.
pub const FIELD_SIZE: Size = Size::new(180.0, 60.0);
/// Floor applied by resize gestures.
pub const MIN_FIELD_SIZE: Size = Size::new(100.0, 50.0);
/// Side of the square grab region at a field's bottom-right corner.
pub const RESIZE_HANDLE: f64 = 12.0;
/// Largest accepted decoded signature image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;
/// Signature pad dimensions.
pub const CANVAS_SIZE: Size = Size::new(500.0, 200.0);
pub const PEN_WIDTH: f32 = 2.5;
pub const PEN_COLOR: [u8; 4] = [0, 0, 0, 255];
/// Request body ceiling of the persistence service.
pub const MAX_BUNDLE_BYTES: usize = 50 * 1024 * 1024;
/// Marker every portable signature image starts with.
pub const IMAGE_DATA_MARKER: &str = "data:image/png;base64,";
