//! Path classification pipeline.
//!
//! [`PathClassifier`] drives one chart region through the full
//! reconstruction: every raw path is tested against the shape
//! classifiers in a fixed order, wedges accumulate in the arc
//! reconstructor, bar candidates too small to trust are deferred, and
//! once every path is placed the chart is typed, table-checked,
//! legend-resolved and fragment-merged.
//!
//! The decision order per path:
//! 1. small rectangle sets are stashed as deferred bar candidates;
//! 2. rectangle sets passing the columnar acceptance become `Columnar`;
//! 3. arc/triangle wedges accumulate toward a pie;
//! 4. filled ribbons and dash blobs collapse to their centerline;
//! 5. area fills become `Area`;
//! 6. stroked polylines/Bézier chains become `Line`/`Curve`, re-tagged
//!    when degenerate;
//! 7. gridwork and tick marks contribute axis metadata only;
//! 8. everything else is `Unknown` and may be refined by the fallback
//!    classifier before the merger purges it.

pub mod arcs;
pub mod bars;
pub mod legend;
pub mod merge;
pub mod scale;
pub mod shapes;

use std::sync::Arc;

use log::debug;

use crate::chart::{Chart, ChartPathInfo, ChartType, PathKind};
use crate::config::ClassifierConfig;
use crate::geometry::{Line, PaintMode, Path, PathSegment, RawPath};
use crate::ml::{FallbackClassifier, PathFeatures};

use arcs::ArcReconstructor;
use shapes::{ColumnarVerdict, LineVerdict};

/// The classification engine for one or more chart regions.
///
/// Holds the threshold configuration and, optionally, the injected
/// fallback model. The classifier itself is immutable across charts and
/// may be shared between threads.
pub struct PathClassifier {
    cfg: ClassifierConfig,
    fallback: Option<Arc<dyn FallbackClassifier>>,
}

impl PathClassifier {
    /// Create a classifier with the given configuration.
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self {
            cfg,
            fallback: None,
        }
    }

    /// Attach a fallback classifier consulted on unclassifiable paths.
    pub fn with_fallback(mut self, model: Arc<dyn FallbackClassifier>) -> Self {
        self.fallback = Some(model);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    /// Classify every raw path of a chart region and reconstruct the
    /// chart structure: records, pies, type, legends, merged fragments.
    pub fn classify_chart(&self, chart: &mut Chart, raw_paths: &[RawPath]) {
        let cfg = &self.cfg;
        let mut arcs_rec = ArcReconstructor::new(cfg);
        let mut grid_lines: Vec<Line> = Vec::new();

        for raw in raw_paths {
            if self.classify_one(chart, raw, &mut arcs_rec, &mut grid_lines) {
                continue;
            }
            self.consult_fallback(chart, raw, raw_paths, &arcs_rec);
        }

        // a full horizontal-by-vertical lattice is a drawn table, not a
        // chart; nothing in it is data
        if shapes::is_table_grid(&grid_lines, cfg.eps.delta) {
            debug!("grid rules form a table lattice, dropping the region");
            chart.path_infos.clear();
            chart.bars_infos.clear();
            chart.kind = ChartType::Unknown;
            return;
        }

        chart.pies = arcs_rec.finish();
        chart.pie = chart.pies.last().cloned();
        bars::set_column_direction(&mut chart.path_infos, cfg.eps.delta);
        chart.derive_type();

        if bars::stacking_invalid(chart, cfg) {
            debug!("bar stacks fail the table-rejection tests");
            chart.path_infos.retain(|p| !p.is_bar_kind());
            chart.bars_infos.clear();
            chart.derive_type();
        }

        bars::reconfirm_deferred(chart, cfg);
        legend::resolve(chart, cfg);
        merge::merge_fragments(chart, cfg);
    }

    /// Run one path through the decision order. Returns true when the
    /// path was consumed (record created, wedge accumulated, axis
    /// metadata collected, or recognized as a legend icon).
    fn classify_one(
        &self,
        chart: &mut Chart,
        raw: &RawPath,
        arcs_rec: &mut ArcReconstructor,
        grid_lines: &mut Vec<Line>,
    ) -> bool {
        let cfg = &self.cfg;
        let path = &raw.path;

        if let Some(rects) = shapes::collect_bar_rects(path, cfg) {
            match shapes::accept_columnar(&rects, &chart.area, cfg) {
                ColumnarVerdict::Stash => {
                    debug!("deferring small rectangle set ({} rects)", rects.len());
                    chart
                        .bars_infos
                        .push(ChartPathInfo::new(path.clone(), PathKind::Bar, raw.color));
                    return true;
                }
                ColumnarVerdict::Accept => {
                    chart.path_infos.push(ChartPathInfo::new(
                        path.clone(),
                        PathKind::Columnar,
                        raw.color,
                    ));
                    return true;
                }
                ColumnarVerdict::Reject => {
                    if let Some(lines) = shapes::columnar_grid_candidates(&rects, cfg) {
                        grid_lines.extend(lines);
                        return true;
                    }
                }
            }
        }

        if arcs_rec.offer(path, raw.color) {
            return true;
        }

        if raw.mode == PaintMode::Fill {
            if let Some(center) = shapes::is_filled_dash_line(path, &chart.area, cfg) {
                debug!("dash blobs collapse to a series centerline");
                chart
                    .path_infos
                    .push(ChartPathInfo::new(center, PathKind::DashLine, raw.color));
                return true;
            }
            if let Some(center) = shapes::is_filled_line(path, &chart.area, cfg) {
                let kind = if has_curve(&center) {
                    PathKind::Curve
                } else {
                    PathKind::Line
                };
                chart
                    .path_infos
                    .push(ChartPathInfo::new(center, kind, raw.color));
                return true;
            }
            if shapes::is_area_fill(path, &chart.area, chart.h_axis.as_ref(), cfg) {
                chart
                    .path_infos
                    .push(ChartPathInfo::new(path.clone(), PathKind::Area, raw.color));
                return true;
            }
            // legend swatches and icons carry no data; the legend list
            // already knows their color and position
            if shapes::is_dashed_legend(path, &chart.area, cfg)
                || shapes::is_legend_icon_shape(path, &chart.area, cfg)
            {
                return true;
            }
        } else {
            if let Some(verdict) = shapes::is_line_or_curve(path, &chart.area, cfg) {
                let mut kind = match verdict {
                    LineVerdict::Line => PathKind::Line,
                    LineVerdict::Curve => PathKind::Curve,
                };
                if shapes::is_horizon_long_line(path, &chart.area, cfg) {
                    kind = PathKind::HorizonLongLine;
                } else if raw.dashed || shapes::is_special_dash_line(path, &chart.area, cfg) {
                    kind = PathKind::DashLine;
                }
                chart
                    .path_infos
                    .push(ChartPathInfo::new(path.clone(), kind, raw.color));
                return true;
            }
            if let Some(ticks) = shapes::is_axis_scale(path, &chart.area, cfg) {
                chart.axis_scale_lines.extend(ticks);
                return true;
            }
            if shapes::is_axis_grid(path, &chart.area, cfg) {
                if let Some(lines) = shapes::line_grid_candidates(path, cfg) {
                    grid_lines.extend(lines);
                }
                return true;
            }
            if let Some(lines) = shapes::line_grid_candidates(path, cfg) {
                if !lines.is_empty() {
                    grid_lines.extend(lines);
                    return true;
                }
            }
        }

        false
    }

    /// Ask the fallback model about a path the rules could not place.
    /// The answer is accepted only when consistent with what the chart
    /// already contains; a missing model skips refinement silently.
    fn consult_fallback(
        &self,
        chart: &mut Chart,
        raw: &RawPath,
        all: &[RawPath],
        arcs_rec: &ArcReconstructor,
    ) {
        let model = match &self.fallback {
            Some(m) => m,
            None => return,
        };
        let features = match PathFeatures::compute(chart, raw, all) {
            Some(f) => f,
            None => return,
        };
        let label = match model.classify(features.values()) {
            Some(l) => l,
            None => return,
        };
        if !(1..=9).contains(&label) {
            return;
        }
        let kind = match label {
            3 if chart.has_kind(&[PathKind::Line, PathKind::Curve]) => PathKind::Line,
            4 | 5 if chart.has_kind(&[PathKind::Bar, PathKind::Columnar]) => {
                if chart.has_kind(&[PathKind::Columnar]) {
                    PathKind::Columnar
                } else {
                    PathKind::Bar
                }
            }
            8 if chart.has_kind(&[PathKind::Area]) => PathKind::Area,
            // a pie answer adds no record; the wedge list already carries
            // any arc geometry this chart has
            7 if arcs_rec.has_wedges() => return,
            _ => return,
        };
        debug!("fallback model adopted a path as {:?} (label {})", kind, label);
        chart
            .path_infos
            .push(ChartPathInfo::new(raw.path.clone(), kind, raw.color));
    }
}

fn has_curve(path: &Path) -> bool {
    path.segments
        .iter()
        .any(|s| matches!(s, PathSegment::CurveTo(..)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Point, Rect};
    use crate::ml::FEATURE_DIM;
    use std::f64::consts::PI;

    // ==================== helpers ====================

    fn chart() -> Chart {
        Chart::new(Rect::new(0.0, 0.0, 400.0, 300.0))
    }

    fn classifier() -> PathClassifier {
        PathClassifier::new(ClassifierConfig::new())
    }

    fn fill(path: Path, color: Color) -> RawPath {
        RawPath::new(path, PaintMode::Fill, color)
    }

    fn stroke(path: Path, color: Color) -> RawPath {
        RawPath::new(path, PaintMode::Stroke, color)
    }

    fn polyline(pts: &[(f64, f64)]) -> Path {
        let mut path = Path::new().move_to(Point::new(pts[0].0, pts[0].1));
        for &(x, y) in &pts[1..] {
            path = path.line_to(Point::new(x, y));
        }
        path
    }

    fn wedge_path(center: Point, radius: f64, a0: f64, a1: f64) -> Path {
        let mut path = Path::new().move_to(center).line_to(Point::new(
            center.x + radius * a0.cos(),
            center.y + radius * a0.sin(),
        ));
        let steps = ((a1 - a0).abs() / (PI / 4.0)).ceil().max(1.0) as usize;
        let step = (a1 - a0) / steps as f64;
        for i in 0..steps {
            let s = a0 + step * i as f64;
            let e = s + step;
            let k = 4.0 / 3.0 * ((e - s) / 4.0).tan() * radius;
            let p0 = Point::new(center.x + radius * s.cos(), center.y + radius * s.sin());
            let p3 = Point::new(center.x + radius * e.cos(), center.y + radius * e.sin());
            let c1 = Point::new(p0.x - k * s.sin(), p0.y + k * s.cos());
            let c2 = Point::new(p3.x + k * e.sin(), p3.y - k * e.cos());
            path = path.curve_to(c1, c2, p3);
        }
        path.close()
    }

    // ==================== pipeline scenarios ====================

    #[test]
    fn test_three_bars_become_vertical_records() {
        let mut ch = chart();
        ch.h_axis = Some(Line::from_coords(0.0, 280.0, 400.0, 280.0));
        let raws = vec![
            fill(
                Path::new().rect(&Rect::new(2.5, 260.0, 15.0, 20.0)),
                Color::new(200, 40, 40),
            ),
            fill(
                Path::new().rect(&Rect::new(22.5, 245.0, 15.0, 35.0)),
                Color::new(40, 200, 40),
            ),
            fill(
                Path::new().rect(&Rect::new(42.5, 255.0, 15.0, 25.0)),
                Color::new(40, 40, 200),
            ),
        ];
        classifier().classify_chart(&mut ch, &raws);
        assert_eq!(ch.path_infos.len(), 3);
        assert!(ch.path_infos.iter().all(|p| p.kind == PathKind::Bar));
        assert_eq!(ch.kind, ChartType::Bar);
    }

    #[test]
    fn test_three_wedges_become_pie() {
        let mut ch = chart();
        let center = Point::new(200.0, 150.0);
        let raws = vec![
            fill(wedge_path(center, 80.0, 0.0, 2.0 * PI / 3.0), Color::new(220, 60, 60)),
            fill(
                wedge_path(center, 80.0, 2.0 * PI / 3.0, 4.0 * PI / 3.0),
                Color::new(60, 220, 60),
            ),
            fill(
                wedge_path(center, 80.0, 4.0 * PI / 3.0, 2.0 * PI),
                Color::new(60, 60, 220),
            ),
        ];
        classifier().classify_chart(&mut ch, &raws);
        assert_eq!(ch.kind, ChartType::Pie);
        assert_eq!(ch.pies.len(), 1);
        assert_eq!(ch.pies[0].parts.len(), 3);
        let total: f64 = ch.pies[0].parts.iter().map(|p| p.angle).sum();
        assert!((total - 2.0 * PI).abs() < 0.01);
    }

    #[test]
    fn test_trend_line_classified() {
        let mut ch = chart();
        let raws = vec![stroke(
            polyline(&[(20.0, 200.0), (120.0, 150.0), (220.0, 180.0), (320.0, 120.0)]),
            Color::new(30, 90, 200),
        )];
        classifier().classify_chart(&mut ch, &raws);
        assert_eq!(ch.path_infos.len(), 1);
        assert_eq!(ch.path_infos[0].kind, PathKind::Line);
        assert_eq!(ch.kind, ChartType::Line);
    }

    #[test]
    fn test_gridwork_produces_no_records() {
        let mut ch = chart();
        let mut path = Path::new();
        for i in 0..4 {
            let y = 60.0 + 55.0 * i as f64;
            path = path
                .move_to(Point::new(10.0, y))
                .line_to(Point::new(390.0, y));
        }
        let raws = vec![stroke(path, Color::new(220, 220, 220))];
        classifier().classify_chart(&mut ch, &raws);
        assert!(ch.path_infos.is_empty());
        assert_eq!(ch.kind, ChartType::Unknown);
    }

    #[test]
    fn test_table_lattice_drops_region() {
        let mut ch = chart();
        let mut hpath = Path::new();
        for i in 0..3 {
            let y = 50.0 + 80.0 * i as f64;
            hpath = hpath
                .move_to(Point::new(20.0, y))
                .line_to(Point::new(380.0, y));
        }
        let mut vpath = Path::new();
        for i in 0..3 {
            let x = 40.0 + 140.0 * i as f64;
            vpath = vpath
                .move_to(Point::new(x, 50.0))
                .line_to(Point::new(x, 210.0));
        }
        let raws = vec![
            stroke(hpath, Color::new(0, 0, 0)),
            stroke(vpath, Color::new(0, 0, 0)),
        ];
        classifier().classify_chart(&mut ch, &raws);
        assert_eq!(ch.kind, ChartType::Unknown);
        assert!(ch.path_infos.is_empty());
    }

    // ==================== fallback refinement ====================

    struct Always(i32);

    impl FallbackClassifier for Always {
        fn classify(&self, _features: &[f64; FEATURE_DIM]) -> Option<i32> {
            Some(self.0)
        }
    }

    #[test]
    fn test_fallback_adopts_consistent_label() {
        let mut ch = chart();
        let raws = vec![
            stroke(
                polyline(&[(20.0, 200.0), (120.0, 150.0), (220.0, 180.0), (320.0, 120.0)]),
                Color::new(30, 90, 200),
            ),
            // too small for the geometric line test
            stroke(
                polyline(&[(50.0, 100.0), (56.0, 104.0), (62.0, 99.0)]),
                Color::new(200, 90, 30),
            ),
        ];
        let engine = classifier().with_fallback(Arc::new(Always(3)));
        engine.classify_chart(&mut ch, &raws);
        assert_eq!(ch.path_infos.len(), 2);
        assert!(ch.path_infos.iter().all(|p| p.kind == PathKind::Line));
    }

    #[test]
    fn test_fallback_rejects_inconsistent_label() {
        let mut ch = chart();
        let raws = vec![
            stroke(
                polyline(&[(20.0, 200.0), (120.0, 150.0), (220.0, 180.0), (320.0, 120.0)]),
                Color::new(30, 90, 200),
            ),
            stroke(
                polyline(&[(50.0, 100.0), (56.0, 104.0), (62.0, 99.0)]),
                Color::new(200, 90, 30),
            ),
        ];
        // area label, but the chart has no area record
        let engine = classifier().with_fallback(Arc::new(Always(8)));
        engine.classify_chart(&mut ch, &raws);
        assert_eq!(ch.path_infos.len(), 1);
    }

    #[test]
    fn test_no_fallback_leaves_geometry_verdict() {
        let mut ch = chart();
        let raws = vec![stroke(
            polyline(&[(50.0, 100.0), (56.0, 104.0), (62.0, 99.0)]),
            Color::new(200, 90, 30),
        )];
        classifier().classify_chart(&mut ch, &raws);
        assert!(ch.path_infos.is_empty());
        assert_eq!(ch.kind, ChartType::Unknown);
    }
}
