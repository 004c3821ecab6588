//! Fragment stitching, duplicate suppression, and ribbon centerline
//! extraction, plus property tests for the shoelace area and the merge
//! pipeline's stability.

use chart_oxide::geometry::{polygon_area, Color, PaintMode, Path, PathSegment, Point, RawPath, Rect};
use chart_oxide::{Chart, ChartPathInfo, ChartType, ClassifierConfig, PathClassifier, PathKind};
use proptest::prelude::*;

fn chart() -> Chart {
    Chart::new(Rect::new(0.0, 0.0, 400.0, 300.0))
}

fn classifier() -> PathClassifier {
    PathClassifier::new(ClassifierConfig::new())
}

fn polyline(pts: &[(f64, f64)]) -> Path {
    let mut path = Path::new().move_to(Point::new(pts[0].0, pts[0].1));
    for &(x, y) in &pts[1..] {
        path = path.line_to(Point::new(x, y));
    }
    path
}

fn stroke(pts: &[(f64, f64)], color: Color) -> RawPath {
    RawPath::new(polyline(pts), PaintMode::Stroke, color)
}

// ==================== continuity ====================

#[test]
fn test_split_series_stitched_back_together() {
    let mut ch = chart();
    let blue = Color::new(40, 90, 200);
    let raws = vec![
        stroke(&[(20.0, 200.0), (90.0, 180.0), (160.0, 190.0)], blue),
        stroke(&[(160.4, 190.3), (230.0, 170.0), (300.0, 185.0)], blue),
    ];
    classifier().classify_chart(&mut ch, &raws);
    assert_eq!(ch.kind, ChartType::Line);
    assert_eq!(ch.path_infos.len(), 1);
    assert_eq!(ch.path_infos[0].path.point_count(), 6);
}

#[test]
fn test_parallel_series_stay_separate() {
    let mut ch = chart();
    let blue = Color::new(40, 90, 200);
    let raws = vec![
        stroke(&[(20.0, 200.0), (160.0, 180.0), (300.0, 190.0)], blue),
        stroke(&[(20.0, 120.0), (160.0, 100.0), (300.0, 110.0)], blue),
    ];
    classifier().classify_chart(&mut ch, &raws);
    assert_eq!(ch.path_infos.len(), 2);
}

// ==================== duplicate suppression ====================

#[test]
fn test_area_boundary_stroke_suppressed() {
    let mut ch = chart();
    let green = Color::new(60, 180, 90);
    let mut band = Path::new().move_to(Point::new(20.0, 200.0));
    for i in 1..12 {
        let x = 20.0 + 16.0 * i as f64;
        let y = 200.0 - 12.0 * (i % 3) as f64;
        band = band.line_to(Point::new(x, y));
    }
    for i in (0..12).rev() {
        let x = 20.0 + 16.0 * i as f64;
        band = band.line_to(Point::new(x, 250.0));
    }
    let raws = vec![
        RawPath::new(band.close(), PaintMode::Fill, green),
        // the producer re-strokes the upper boundary in the fill color
        stroke(
            &[(20.0, 200.0), (100.0, 176.0), (180.0, 188.0), (196.0, 176.0)],
            green,
        ),
    ];
    classifier().classify_chart(&mut ch, &raws);
    assert_eq!(ch.kind, ChartType::Area);
    assert_eq!(ch.path_infos.len(), 1);
    assert_eq!(ch.path_infos[0].kind, PathKind::Area);
}

// ==================== ribbon centerlines ====================

#[test]
fn test_filled_ribbon_collapses_to_centerline() {
    let mut ch = chart();
    let top = [
        (20.0, 200.0),
        (40.0, 190.0),
        (60.0, 195.0),
        (80.0, 185.0),
        (100.0, 192.0),
        (120.0, 180.0),
        (140.0, 188.0),
    ];
    let mut ribbon = Path::new().move_to(Point::new(top[0].0, top[0].1));
    for &(x, y) in &top[1..] {
        ribbon = ribbon.line_to(Point::new(x, y));
    }
    // back along the lower edge, two points below the upper one
    for &(x, y) in top.iter().rev() {
        ribbon = ribbon.line_to(Point::new(x, y + 2.0));
    }
    let raws = vec![RawPath::new(
        ribbon.close(),
        PaintMode::Fill,
        Color::new(210, 50, 50),
    )];
    classifier().classify_chart(&mut ch, &raws);
    assert_eq!(ch.kind, ChartType::Line);
    assert_eq!(ch.path_infos.len(), 1);
    let info = &ch.path_infos[0];
    assert_eq!(info.kind, PathKind::Line);
    // the centerline is the upper boundary, monotone in x
    let mut last_x = f64::NEG_INFINITY;
    for seg in &info.path.segments {
        if let PathSegment::MoveTo(p) | PathSegment::LineTo(p) = seg {
            assert!(p.x > last_x);
            last_x = p.x;
        }
    }
    assert_eq!(info.path.point_count(), top.len() as u32);
}

// ==================== properties ====================

proptest! {
    #[test]
    fn prop_shoelace_area_invariant_under_rotation_and_reversal(
        pts in prop::collection::vec((0.0f64..1000.0, 0.0f64..1000.0), 3..10),
        shift in 0usize..10,
    ) {
        let xs: Vec<f64> = pts.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pts.iter().map(|p| p.1).collect();
        let area = polygon_area(&xs, &ys);

        let k = shift % pts.len();
        let rot_xs: Vec<f64> = xs.iter().cycle().skip(k).take(xs.len()).cloned().collect();
        let rot_ys: Vec<f64> = ys.iter().cycle().skip(k).take(ys.len()).cloned().collect();
        let rotated = polygon_area(&rot_xs, &rot_ys);

        let rev_xs: Vec<f64> = xs.iter().rev().cloned().collect();
        let rev_ys: Vec<f64> = ys.iter().rev().cloned().collect();
        let reversed = polygon_area(&rev_xs, &rev_ys);

        let tol = 1e-6 * area.max(1.0);
        prop_assert!((area - rotated).abs() <= tol);
        prop_assert!((area - reversed).abs() <= tol);
    }

    #[test]
    fn prop_merge_pipeline_is_idempotent(
        series in prop::collection::vec(
            prop::collection::vec(20.0f64..280.0, 3..6),
            1..4,
        ),
    ) {
        let palette = [
            Color::new(40, 90, 200),
            Color::new(210, 50, 50),
            Color::new(60, 180, 90),
            Color::new(230, 140, 40),
        ];
        let cfg = ClassifierConfig::new();
        let mut ch = chart();
        ch.kind = ChartType::Line;
        for (i, ys) in series.iter().enumerate() {
            let pts: Vec<(f64, f64)> = ys
                .iter()
                .enumerate()
                .map(|(j, &y)| (20.0 + 60.0 * j as f64, y))
                .collect();
            ch.path_infos
                .push(ChartPathInfo::new(polyline(&pts), PathKind::Line, palette[i]));
        }

        chart_oxide::classify::merge::merge_fragments(&mut ch, &cfg);
        let inventory = |c: &Chart| -> Vec<(PathKind, Color, u32)> {
            c.path_infos
                .iter()
                .map(|p| (p.kind, p.color, p.path.point_count()))
                .collect()
        };
        let first = inventory(&ch);
        let first_kind = ch.kind;

        chart_oxide::classify::merge::merge_fragments(&mut ch, &cfg);
        prop_assert_eq!(inventory(&ch), first);
        prop_assert_eq!(ch.kind, first_kind);
    }
}
