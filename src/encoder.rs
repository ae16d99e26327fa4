//! Signature image encoding and validation
//!
//! The portable form of a signature is a PNG with a transparent background,
//! wrapped in a `data:image/png;base64,` URI.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tiny_skia::Pixmap;

use crate::capture::StrokeCaptureSurface;
use crate::config::EngineConfig;
use crate::defaults::{IMAGE_DATA_MARKER, MAX_IMAGE_BYTES};
use crate::errors::CaptureError;
use crate::log::{debug, warn};

/// A saved, hand-drawn signature as lossless PNG bytes
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl SignatureImage {
    #[cfg(test)]
    pub(crate) fn from_png_unchecked(png: Vec<u8>, width: u32, height: u32) -> Self {
        Self { png, width, height }
    }

    /// Parse a data URI, rejecting anything [`SignatureEncoder::check`]
    /// rejects or that is not a decodable PNG.
    pub fn from_data_uri(uri: &str, max_bytes: usize) -> Result<Self, CaptureError> {
        let png = decode_payload(uri, max_bytes)?;
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .map_err(|e| CaptureError::Malformed { reason: e.to_string() })?;
        Ok(Self { width: decoded.width(), height: decoded.height(), png })
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Decoded size, the quantity the 1 MiB ceiling applies to
    pub fn byte_len(&self) -> usize {
        self.png.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn to_data_uri(&self) -> String {
        format!("{IMAGE_DATA_MARKER}{}", STANDARD.encode(&self.png))
    }

    /// Decode back to straight-alpha RGBA pixels
    pub fn to_rgba(&self) -> Result<RgbaImage, CaptureError> {
        image::load_from_memory_with_format(&self.png, ImageFormat::Png)
            .map(|img| img.to_rgba8())
            .map_err(|e| CaptureError::Malformed { reason: e.to_string() })
    }
}

impl fmt::Debug for SignatureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.png.len())
            .finish()
    }
}

impl Serialize for SignatureImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_uri())
    }
}

impl<'de> Deserialize<'de> for SignatureImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        SignatureImage::from_data_uri(&uri, MAX_IMAGE_BYTES).map_err(serde::de::Error::custom)
    }
}

/// Turns the capture surface into a [`SignatureImage`]
#[derive(Clone, Copy, Debug)]
pub struct SignatureEncoder {
    max_bytes: usize,
}

impl Default for SignatureEncoder {
    fn default() -> Self {
        Self { max_bytes: MAX_IMAGE_BYTES }
    }
}

impl SignatureEncoder {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_image_bytes)
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Encode the surface and mark it saved.
    ///
    /// Fails with `EmptyCapture` when nothing was drawn and with
    /// `OversizedImage` when the PNG exceeds the limit; on failure the
    /// surface state is untouched. Encoding twice without new strokes yields
    /// identical bytes.
    pub fn encode(&self, surface: &mut StrokeCaptureSurface) -> Result<SignatureImage, CaptureError> {
        if !surface.has_content() {
            debug!("encode refused: empty capture");
            return Err(CaptureError::EmptyCapture);
        }
        let pixmap = surface.pixmap();
        let png = encode_png(pixmap)?;
        if png.len() > self.max_bytes {
            warn!(size = png.len(), limit = self.max_bytes, "signature image too large");
            return Err(CaptureError::OversizedImage { size: png.len(), limit: self.max_bytes });
        }
        let image = SignatureImage { width: pixmap.width(), height: pixmap.height(), png };
        surface.mark_saved();
        debug!(bytes = image.byte_len(), "signature saved");
        Ok(image)
    }

    /// Detailed validation of a portable signature image.
    /// Returns the decoded size on success.
    pub fn check(&self, data_uri: &str) -> Result<usize, CaptureError> {
        decode_payload(data_uri, self.max_bytes).map(|png| png.len())
    }

    /// True iff `data_uri` carries the image-data marker and its decoded
    /// payload is within the size limit.
    pub fn validate(&self, data_uri: &str) -> bool {
        self.check(data_uri).is_ok()
    }
}

fn decode_payload(uri: &str, max_bytes: usize) -> Result<Vec<u8>, CaptureError> {
    let payload = uri.strip_prefix(IMAGE_DATA_MARKER).ok_or_else(|| CaptureError::Malformed {
        reason: format!("missing `{IMAGE_DATA_MARKER}` marker"),
    })?;
    // Reject before decoding anything absurdly large.
    let estimated = payload.len() / 4 * 3;
    if estimated > max_bytes + 2 {
        return Err(CaptureError::OversizedImage { size: estimated, limit: max_bytes });
    }
    let png = STANDARD
        .decode(payload)
        .map_err(|e| CaptureError::Malformed { reason: e.to_string() })?;
    if png.len() > max_bytes {
        return Err(CaptureError::OversizedImage { size: png.len(), limit: max_bytes });
    }
    Ok(png)
}

/// Demultiply the premultiplied pixmap and write a straight-alpha PNG.
/// The transparent background is preserved, never flattened.
fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, CaptureError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let img = RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| CaptureError::Encoding("pixel buffer size mismatch".to_string()))?;

    let mut buf = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut buf))
        .map_err(|e| CaptureError::Encoding(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureState;
    use crate::config::PenStyle;
    use crate::types::{Point, Size};

    fn inked_surface() -> StrokeCaptureSurface {
        let mut s = StrokeCaptureSurface::new(Size::new(120.0, 40.0), PenStyle::default()).unwrap();
        s.begin_stroke(Point::new(10.0, 20.0));
        s.extend_stroke(Point::new(60.0, 10.0));
        s.extend_stroke(Point::new(110.0, 30.0));
        s.end_stroke();
        s
    }

    #[test]
    fn encode_empty_surface_fails() {
        let mut s = StrokeCaptureSurface::new(Size::new(10.0, 10.0), PenStyle::default()).unwrap();
        let err = SignatureEncoder::default().encode(&mut s).unwrap_err();
        assert_eq!(err, CaptureError::EmptyCapture);
        assert_eq!(s.state(), CaptureState::Empty);
    }

    #[test]
    fn edit_after_repeated_saves_is_dirty() {
        let mut s = inked_surface();
        let encoder = SignatureEncoder::default();
        let first = encoder.encode(&mut s).unwrap();
        let second = encoder.encode(&mut s).unwrap();
        assert_eq!(first, second);
        assert_eq!(s.state(), CaptureState::Saved);

        s.begin_stroke(Point::new(20.0, 35.0));
        assert_eq!(s.state(), CaptureState::Dirty);
        s.extend_stroke(Point::new(40.0, 35.0));
        s.end_stroke();
        assert_eq!(s.state(), CaptureState::Dirty);
        assert_ne!(encoder.encode(&mut s).unwrap(), second);
    }

    #[test]
    fn encode_produces_transparent_png() {
        let mut s = inked_surface();
        let image = SignatureEncoder::default().encode(&mut s).unwrap();
        assert_eq!(s.state(), CaptureState::Saved);
        assert_eq!((image.width(), image.height()), (120, 40));
        assert!(image.png_bytes().starts_with(b"\x89PNG\r\n\x1a\n"));

        let rgba = image.to_rgba().unwrap();
        assert_eq!(rgba.get_pixel(0, 0).0[3], 0, "background must stay transparent");
        assert!(rgba.get_pixel(60, 10).0[3] > 0, "ink must survive encoding");
    }

    #[test]
    fn encoding_twice_is_bit_identical() {
        let mut s = inked_surface();
        let encoder = SignatureEncoder::default();
        let first = encoder.encode(&mut s).unwrap();
        let second = encoder.encode(&mut s).unwrap();
        assert_eq!(first, second);
        assert_eq!(s.state(), CaptureState::Saved);
    }

    #[test]
    fn oversized_image_leaves_surface_dirty() {
        let mut s = inked_surface();
        let err = SignatureEncoder::new(16).encode(&mut s).unwrap_err();
        assert!(matches!(err, CaptureError::OversizedImage { limit: 16, .. }));
        assert_eq!(s.state(), CaptureState::Dirty);
    }

    #[test]
    fn data_uri_round_trip_validates() {
        let mut s = inked_surface();
        let encoder = SignatureEncoder::default();
        let image = encoder.encode(&mut s).unwrap();
        let uri = image.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(encoder.validate(&uri));
        assert_eq!(encoder.check(&uri), Ok(image.byte_len()));
        assert_eq!(SignatureImage::from_data_uri(&uri, MAX_IMAGE_BYTES).unwrap(), image);
    }

    #[test]
    fn validate_rejects_wrong_marker_and_garbage() {
        let encoder = SignatureEncoder::default();
        assert!(!encoder.validate("data:image/jpeg;base64,AAAA"));
        assert!(!encoder.validate("iVBORw0KGgo="));
        assert!(!encoder.validate("data:image/png;base64,not base64!!"));
    }

    #[test]
    fn validate_rejects_oversized_payload() {
        let encoder = SignatureEncoder::new(3);
        let small = format!("{IMAGE_DATA_MARKER}{}", STANDARD.encode([1u8, 2, 3]));
        let large = format!("{IMAGE_DATA_MARKER}{}", STANDARD.encode([1u8, 2, 3, 4]));
        assert!(encoder.validate(&small));
        assert!(matches!(
            encoder.check(&large),
            Err(CaptureError::OversizedImage { size: 4, limit: 3 })
        ));
    }

    #[test]
    fn non_png_payload_is_not_an_image() {
        let uri = format!("{IMAGE_DATA_MARKER}{}", STANDARD.encode(b"hello"));
        let err = SignatureImage::from_data_uri(&uri, MAX_IMAGE_BYTES).unwrap_err();
        assert!(matches!(err, CaptureError::Malformed { .. }));
    }
}
