//! Engine configuration.
//!
//! Every key is optional; missing keys fall back to [`crate::defaults`].
//!
//! ```json
//! { "defaultFieldSize": { "w": 200, "h": 80 }, "pen": { "width": 3.0 } }
//! ```

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::errors::ConfigError;
use crate::types::Size;

/// Ink style for the capture surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PenStyle {
    pub width: f32,
    /// Straight (non-premultiplied) RGBA
    pub color: [u8; 4],
}

impl Default for PenStyle {
    fn default() -> Self {
        Self { width: defaults::PEN_WIDTH, color: defaults::PEN_COLOR }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    pub default_field_size: Size,
    pub min_field_size: Size,
    pub resize_handle: f64,
    pub max_image_bytes: usize,
    pub canvas_size: Size,
    pub pen: PenStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_field_size: defaults::FIELD_SIZE,
            min_field_size: defaults::MIN_FIELD_SIZE,
            resize_handle: defaults::RESIZE_HANDLE,
            max_image_bytes: defaults::MAX_IMAGE_BYTES,
            canvas_size: defaults::CANVAS_SIZE,
            pen: PenStyle::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        for (name, size) in [
            ("defaultFieldSize", self.default_field_size),
            ("minFieldSize", self.min_field_size),
            ("canvasSize", self.canvas_size),
        ] {
            if let Err(e) = Size::try_new(size.w, size.h) {
                return invalid(format!("{name}: {e}"));
            }
        }
        if self.default_field_size.w < self.min_field_size.w
            || self.default_field_size.h < self.min_field_size.h
        {
            return invalid(format!(
                "defaultFieldSize {} is below minFieldSize {}",
                self.default_field_size, self.min_field_size
            ));
        }
        if !(self.resize_handle.is_finite() && self.resize_handle > 0.0) {
            return invalid(format!("resizeHandle must be positive, got {}", self.resize_handle));
        }
        if self.max_image_bytes == 0 {
            return invalid("maxImageBytes must be non-zero".to_string());
        }
        // stored bundles are decoded against the fixed ceiling
        if self.max_image_bytes > defaults::MAX_IMAGE_BYTES {
            return invalid(format!(
                "maxImageBytes must not exceed {}, got {}",
                defaults::MAX_IMAGE_BYTES,
                self.max_image_bytes
            ));
        }
        if !(self.pen.width.is_finite() && self.pen.width > 0.0) {
            return invalid(format!("pen.width must be positive, got {}", self.pen.width));
        }
        Ok(())
    }
}
