//! End-to-end behaviour of placement, gestures and capture through the
//! public API.

use signpad::geometry::overlaps;
use signpad::{
    CaptureError, CaptureState, Document, DocumentFieldStore, DragController, EngineConfig, FieldId,
    FieldPlacementEngine, PenStyle, PlacementError, Point, Rect, ResizeController, SignatureEncoder, Size,
    StrokeCaptureSurface,
};

fn page(w: f64, h: f64) -> DocumentFieldStore {
    DocumentFieldStore::new(Document::new("page", "page.png", Size::new(w, h)))
}

fn pad() -> StrokeCaptureSurface {
    StrokeCaptureSurface::new(Size::new(500.0, 200.0), PenStyle::default()).unwrap()
}

#[test]
fn place_at_click_point() {
    let mut store = page(800.0, 1000.0);
    let id = FieldPlacementEngine::default()
        .place_field(&mut store, Point::new(70.0, 70.0), "Ada")
        .unwrap();
    let field = store.field(id).unwrap();
    assert_eq!(field.rect(), Rect::new(70.0, 70.0, 180.0, 60.0));
    assert!(!field.signed());
}

#[test]
fn overlapping_placement_leaves_store_unchanged() {
    let mut store = page(800.0, 1000.0);
    let engine = FieldPlacementEngine::default();
    let first = engine.place_field(&mut store, Point::new(70.0, 70.0), "Ada").unwrap();
    let before = store.fields().to_vec();
    let err = engine.place_field(&mut store, Point::new(80.0, 80.0), "Ada").unwrap_err();
    assert_eq!(err, PlacementError::Overlap { existing: first });
    assert_eq!(store.fields(), before.as_slice());
}

#[test]
fn drag_past_corner_is_clamped() {
    let mut store = page(400.0, 400.0);
    let id = FieldPlacementEngine::default()
        .place_field(&mut store, Point::new(70.0, 70.0), "Ada")
        .unwrap();
    let mut drag = DragController::new();
    drag.begin(&store, id, Point::new(70.0, 70.0)).unwrap();
    drag.move_to(&mut store, Point::new(570.0, 570.0));
    drag.end();
    assert_eq!(store.field(id).unwrap().top_left(), Point::new(220.0, 340.0));
}

#[test]
fn resize_below_minimum_floors() {
    let mut store = page(400.0, 400.0);
    let id = FieldPlacementEngine::default()
        .place_field(&mut store, Point::new(70.0, 70.0), "Ada")
        .unwrap();
    let mut resize = ResizeController::new(EngineConfig::default().min_field_size);
    resize.begin(&store, id, Point::new(250.0, 130.0)).unwrap();
    resize.move_to(&mut store, Point::new(50.0, -70.0));
    resize.end();
    assert_eq!(store.field(id).unwrap().rect().size(), Size::new(100.0, 50.0));
}

#[test]
fn second_save_includes_both_strokes() {
    let mut surface = pad();
    let encoder = SignatureEncoder::default();

    surface.begin_stroke(Point::new(20.0, 50.0));
    surface.extend_stroke(Point::new(200.0, 50.0));
    surface.end_stroke();
    let first = encoder.encode(&mut surface).unwrap();

    surface.begin_stroke(Point::new(20.0, 150.0));
    assert_eq!(surface.state(), CaptureState::Dirty);
    surface.extend_stroke(Point::new(200.0, 150.0));
    surface.end_stroke();
    let second = encoder.encode(&mut surface).unwrap();
    assert_ne!(first, second);

    let pixels = second.to_rgba().unwrap();
    assert!(pixels.get_pixel(100, 50).0[3] > 0, "first stroke kept");
    assert!(pixels.get_pixel(100, 150).0[3] > 0, "second stroke present");
    assert_eq!(first.to_rgba().unwrap().get_pixel(100, 150).0[3], 0);
}

#[test]
fn untouched_surface_cannot_be_saved() {
    let mut surface = pad();
    assert_eq!(SignatureEncoder::default().encode(&mut surface), Err(CaptureError::EmptyCapture));
}

/// Deterministic pseudo-random points so the property checks are repeatable
fn scatter(seed: u64, n: usize, max: f64) -> Vec<Point> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f64 / (1u64 << 31) as f64) * max
    };
    (0..n).map(|_| Point::new(next(), next())).collect()
}

#[test]
fn successful_placements_never_overlap() {
    let mut store = page(1000.0, 1000.0);
    let engine = FieldPlacementEngine::default();
    for point in scatter(7, 200, 900.0) {
        let _ = engine.place_field(&mut store, point, "Ada");
    }
    assert!(store.len() > 1);
    let fields = store.fields();
    for (i, a) in fields.iter().enumerate() {
        for b in &fields[i + 1..] {
            assert!(!overlaps(&a.rect(), &b.rect()), "{} overlaps {}", a.rect(), b.rect());
        }
    }
}

#[test]
fn drag_moves_stay_inside_document() {
    let bounds = Size::new(400.0, 300.0);
    let mut store = page(bounds.w, bounds.h);
    let id = FieldPlacementEngine::default()
        .place_field(&mut store, Point::new(10.0, 10.0), "Ada")
        .unwrap();
    let mut drag = DragController::new();
    drag.begin(&store, id, Point::new(50.0, 30.0)).unwrap();
    for pointer in scatter(11, 100, 2000.0) {
        let pointer = Point::new(pointer.x - 1000.0, pointer.y - 1000.0);
        let rect = drag.move_to(&mut store, pointer).unwrap();
        assert!(rect.x >= 0.0 && rect.y >= 0.0, "{rect}");
        assert!(rect.right() <= bounds.w && rect.bottom() <= bounds.h, "{rect}");
    }
}

#[test]
fn resize_moves_respect_minimum() {
    let mut store = page(400.0, 400.0);
    let id = FieldPlacementEngine::default()
        .place_field(&mut store, Point::new(70.0, 70.0), "Ada")
        .unwrap();
    let min = Size::new(100.0, 50.0);
    let mut resize = ResizeController::new(min);
    resize.begin(&store, id, Point::new(250.0, 130.0)).unwrap();
    for pointer in scatter(23, 100, 600.0) {
        let rect = resize.move_to(&mut store, pointer).unwrap();
        assert!(rect.width >= min.w && rect.height >= min.h, "{rect}");
    }
    assert_eq!(resize.end(), Some(id));
}

#[test]
fn stale_field_ids_are_rejected() {
    let store = page(400.0, 400.0);
    let mut drag = DragController::new();
    assert!(drag.begin(&store, FieldId(1), Point::ORIGIN).is_err());
}
