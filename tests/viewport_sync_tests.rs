use chartflow::api::{ChartEngine, ChartEngineConfig};
use chartflow::chart::ChartKind;
use chartflow::core::{DataPoint, DimensionCell, Identity, MeasureCell, Viewport};
use chartflow::interaction::{GestureSource, SyncOutcome, ViewportSync, ZoomLimits};
use chartflow::render::NullRenderer;

use proptest::prelude::*;

fn dense_rows(count: u64) -> Vec<DataPoint> {
    (1..=count)
        .map(|id| {
            DataPoint::new(
                Identity(id),
                [DimensionCell::numeric("T", id as f64)],
                [MeasureCell::new("V", (id as f64).sin() * 10.0)],
            )
        })
        .collect()
}

#[test]
fn dense_data_engages_overview_and_brush_state() {
    let config = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_data(dense_rows(100)).expect("set data");
    engine.render().expect("render");

    let renderer = engine.into_renderer();
    let frame = renderer.last_frame().expect("frame");
    // Main marks plus overview marks.
    assert_eq!(frame.circles.len(), 200);
    // Background, overview strip background, and the brush selection rect.
    assert_eq!(frame.rects.len(), 3);
}

#[test]
fn panned_marks_never_escape_the_plot_area() {
    let config = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_data(dense_rows(100)).expect("set data");
    engine.render().expect("render");

    assert!(engine.zoom(GestureSource::Zoom, 8.0, -5000.0).expect("zoom"));

    let renderer = engine.into_renderer();
    let frame = renderer.last_frame().expect("frame");
    // Main-surface dots and the path respect the plot edges; overview dots
    // (radius 1) live in their own strip below.
    let (lo, hi) = (40.0, 760.0);
    let main: Vec<_> = frame
        .circles
        .iter()
        .filter(|circle| circle.radius > 2.0)
        .collect();
    assert!(!main.is_empty());
    assert!(main.iter().all(|circle| circle.cx >= lo && circle.cx <= hi));
    for path in &frame.paths {
        assert!(path.points.iter().all(|(x, _)| *x >= lo && *x <= hi));
    }
}

#[test]
fn disabled_viewbox_pins_fit_zoom_and_drops_the_strip() {
    let config =
        ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line).with_viewbox(false);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_data(dense_rows(100)).expect("set data");
    engine.render().expect("render");

    // No overview strip means the zoom gesture has nowhere to apply.
    let applied = engine.zoom(GestureSource::Zoom, 4.0, -900.0).expect("zoom");
    assert!(!applied);

    let renderer = engine.into_renderer();
    let frame = renderer.last_frame().expect("frame");
    // Main marks only, over the bare background.
    assert_eq!(frame.circles.len(), 100);
    assert_eq!(frame.rects.len(), 1);
}

#[test]
fn zoom_gesture_renders_exactly_once() {
    let config = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_data(dense_rows(100)).expect("set data");
    engine.render().expect("render");

    let applied = engine
        .zoom(GestureSource::Zoom, 4.0, -900.0)
        .expect("zoom");
    assert!(applied);
    assert!(!engine.has_pending_invalidation());

    let renderer = engine.into_renderer();
    assert_eq!(renderer.frames_rendered(), 2);
}

#[test]
fn brush_gesture_renders_exactly_once() {
    let config = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_data(dense_rows(100)).expect("set data");
    engine.render().expect("render");

    let applied = engine
        .brush(GestureSource::Brush, 100.0, 400.0)
        .expect("brush");
    assert!(applied);

    let renderer = engine.into_renderer();
    assert_eq!(renderer.frames_rendered(), 2);
}

#[test]
fn echoed_gestures_do_not_render() {
    let config = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_data(dense_rows(100)).expect("set data");
    engine.render().expect("render");

    // A brush event carrying the zoom source tag is the synchronizer's own
    // echo and must not trigger another pass.
    let applied = engine.brush(GestureSource::Zoom, 100.0, 400.0).expect("echo");
    assert!(!applied);
    let applied = engine.zoom(GestureSource::Brush, 2.0, 0.0).expect("echo");
    assert!(!applied);

    let renderer = engine.into_renderer();
    assert_eq!(renderer.frames_rendered(), 1);
}

#[test]
fn gestures_before_first_render_are_inert() {
    let config = ChartEngineConfig::new(Viewport::new(800, 600), ChartKind::Line);
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    assert!(!engine.zoom(GestureSource::Zoom, 2.0, 0.0).expect("zoom"));
    assert!(!engine
        .brush(GestureSource::Brush, 10.0, 50.0)
        .expect("brush"));
}

proptest! {
    /// Any interleaving of zoom and brush gestures keeps the two window
    /// representations describing the same visible span.
    #[test]
    fn alternating_gestures_never_diverge(
        gestures in prop::collection::vec(
            (any::<bool>(), 1.0..8.0f64, 0.0..1000.0f64, 0.0..1000.0f64),
            1..40,
        )
    ) {
        let mut sync = ViewportSync::new(1000.0, ZoomLimits::default()).expect("sync");
        for (is_zoom, scale, a, b) in gestures {
            let outcome = if is_zoom {
                sync.on_zoom(GestureSource::Zoom, scale, -a).expect("zoom")
            } else {
                match sync.on_brush(GestureSource::Brush, a, b) {
                    Ok(outcome) => outcome,
                    // Degenerate selections fault without touching state.
                    Err(_) => continue,
                }
            };
            prop_assert!(matches!(outcome, SyncOutcome::Applied(_)));
            prop_assert!(sync.representations_agree(1e-6));

            let brush = sync.brush_extent();
            prop_assert!(brush.lo >= -1e-9);
            prop_assert!(brush.hi <= 1000.0 + 1e-9);
            prop_assert!(brush.lo < brush.hi);

            let zoom = sync.zoom_transform();
            prop_assert!((1.0..=8.0).contains(&zoom.scale));
            prop_assert!(zoom.translate_x <= 1e-9);
        }
    }
}
