//! Statistical fallback classification (optional).
//!
//! When the geometric rules cannot decide what a path is, the
//! orchestrator may consult an offline-trained path classifier. This
//! module carries the pieces of that contract:
//!
//! - [`FallbackClassifier`]: the inference trait the orchestrator
//!   consumes. Injected by the caller, never a global.
//! - [`PathFeatures`]: the 28-dimensional feature vector the model was
//!   trained on, computed from a raw path in its chart context.
//! - Under the `ml` feature, a tract-onnx backed implementation
//!   ([`path_model::PathModel`]) plus the min-max feature scaler
//!   ([`feature_extractor::FeatureScaler`]).
//!
//! All inference is CPU-only; a missing model artifact degrades to the
//! geometric answer and is never an error at the call site.

use crate::chart::{Chart, PathKind};
use crate::geometry::{polygon_area, PaintMode, PathSegment, RawPath, SegKind};

#[cfg(feature = "ml")]
pub mod feature_extractor;
#[cfg(feature = "ml")]
pub mod path_model;

#[cfg(feature = "ml")]
pub use feature_extractor::FeatureScaler;
#[cfg(feature = "ml")]
pub use path_model::PathModel;

/// Number of features the path model consumes.
pub const FEATURE_DIM: usize = 28;

/// Inference interface for the fallback path classifier.
///
/// Implementations must be immutable after construction so one model can
/// serve charts processed on independent threads.
pub trait FallbackClassifier: Send + Sync {
    /// Classify a feature vector, returning the remapped label in
    /// `[1, 9]`, or `None` when the model cannot answer.
    fn classify(&self, features: &[f64; FEATURE_DIM]) -> Option<i32>;
}

/// Remap a raw model output to the label space used downstream.
///
/// The training labels were compacted before fitting; predictions are
/// widened back: raw values up to 3 shift by one, the rest by two.
pub fn remap_label(raw: i32) -> i32 {
    if raw <= 3 {
        raw + 1
    } else {
        raw + 2
    }
}

/// The 28-dimensional feature vector of one raw path.
///
/// Layout (indices):
/// - `0..4` chart-content flags: line, area, bar, pie present;
/// - `4..7` paint color, channels scaled to `[0, 1]`;
/// - `7` fill flag, `8` summed fill sub-path area over the chart area;
/// - `9..14` segment counts: move, line, quadratic (always 0 here),
///   cubic, close;
/// - `14..18` consecutive-point deltas: dx-zero, dx-nonzero, dy-zero,
///   dy-nonzero counts (zero under 1e-2, both-zero pairs skipped, pairs
///   broken by a MoveTo skipped);
/// - `18..20` stroke width and dash flag;
/// - `20..24` bounding box, centered and normalized by the chart size;
/// - `24..28` context features: axis-gridwork flag, same-color same-size
///   companion, same-color legend-sized companion, position-aligned
///   companion count.
#[derive(Debug, Clone)]
pub struct PathFeatures {
    values: [f64; FEATURE_DIM],
}

impl PathFeatures {
    /// Compute the feature vector for `raw` inside `chart`, with `all`
    /// the chart's full raw-path set (the context features compare
    /// against every sibling). `None` when the chart or path geometry
    /// is degenerate.
    pub fn compute(chart: &Chart, raw: &RawPath, all: &[RawPath]) -> Option<Self> {
        let mut v = [0.0f64; FEATURE_DIM];
        let cw = chart.width();
        let ch = chart.height();
        if cw <= 0.0 || ch <= 0.0 {
            return None;
        }

        let has_line = chart.path_infos.iter().any(|p| p.is_line_kind());
        let has_area = chart.path_infos.iter().any(|p| p.kind == PathKind::Area);
        let has_bar = chart.path_infos.iter().any(|p| p.is_bar_kind());
        let has_pie =
            !chart.pies.is_empty() || chart.path_infos.iter().any(|p| p.kind == PathKind::Arc);
        v[0] = f64::from(u8::from(has_line));
        v[1] = f64::from(u8::from(has_area));
        v[2] = f64::from(u8::from(has_bar));
        v[3] = f64::from(u8::from(has_pie));

        v[4] = raw.color.r as f64 / 255.0;
        v[5] = raw.color.g as f64 / 255.0;
        v[6] = raw.color.b as f64 / 255.0;

        let is_fill = raw.mode == PaintMode::Fill;
        v[7] = f64::from(u8::from(is_fill));
        if is_fill {
            let mut area_sum = 0.0;
            for sub in raw.path.split_sub_paths(true) {
                let pts = sub.key_points();
                if pts.len() >= 3 {
                    area_sum += polygon_area(&pts.xs, &pts.ys);
                }
            }
            v[8] = area_sum / (cw * ch);
        }

        let mut counts = [0u32; 4];
        for seg in &raw.path.segments {
            match seg {
                PathSegment::MoveTo(_) => counts[0] += 1,
                PathSegment::LineTo(_) => counts[1] += 1,
                PathSegment::CurveTo(..) => counts[2] += 1,
                PathSegment::Close => counts[3] += 1,
            }
        }
        v[9] = counts[0] as f64;
        v[10] = counts[1] as f64;
        // quadratic curves never survive page decomposition; the slot is
        // kept so the vector matches the trained layout
        v[11] = 0.0;
        v[12] = counts[2] as f64;
        v[13] = counts[3] as f64;

        let (dx_zero, dx_nzero, dy_zero, dy_nzero) = delta_counts(&raw.path);
        v[14] = dx_zero as f64;
        v[15] = dx_nzero as f64;
        v[16] = dy_zero as f64;
        v[17] = dy_nzero as f64;

        v[18] = raw.stroke_width;
        v[19] = f64::from(u8::from(raw.dashed));

        let bounds = raw.path.bounds()?;
        v[20] = (bounds.left() - 0.5 * cw) / cw;
        v[21] = (bounds.top() - 0.5 * ch) / ch;
        v[22] = bounds.width / cw;
        v[23] = bounds.height / ch;

        v[24] = f64::from(u8::from(is_axis_gridwork(raw, cw, ch)));
        let (same_size, small_companion, aligned) = context_features(raw, all);
        v[25] = f64::from(u8::from(same_size));
        v[26] = f64::from(u8::from(small_companion));
        v[27] = aligned as f64;

        if v.iter().any(|x| !x.is_finite()) {
            return None;
        }
        Some(Self { values: v })
    }

    /// The raw (unscaled) feature values.
    pub fn values(&self) -> &[f64; FEATURE_DIM] {
        &self.values
    }
}

/// Count x/y movement between consecutive key points. A pair whose
/// successor opens a new sub-path is skipped, as is a pair with no
/// movement at all.
fn delta_counts(path: &crate::geometry::Path) -> (u32, u32, u32, u32) {
    let zero = 1e-2;
    let pts = path.key_points();
    let n = pts.len();
    let (mut dx_zero, mut dx_nzero, mut dy_zero, mut dy_nzero) = (0u32, 0u32, 0u32, 0u32);
    for i in 0..n.saturating_sub(1) {
        if pts.kinds[i + 1] == SegKind::Move {
            continue;
        }
        let dx = (pts.xs[i + 1] - pts.xs[i]).abs();
        let dy = (pts.ys[i + 1] - pts.ys[i]).abs();
        if dx < zero && dy < zero {
            continue;
        }
        if dx < zero {
            dx_zero += 1;
        } else {
            dx_nzero += 1;
        }
        if dy < zero {
            dy_zero += 1;
        } else {
            dy_nzero += 1;
        }
    }
    (dx_zero, dx_nzero, dy_zero, dy_nzero)
}

/// True when a stroked path decomposes into four or more long
/// axis-aligned two-point sub-lines and nothing else, i.e. gridwork.
fn is_axis_gridwork(raw: &RawPath, cw: f64, ch: f64) -> bool {
    if raw.mode != PaintMode::Stroke {
        return false;
    }
    let mut long = 0u32;
    for sub in raw.path.split_sub_paths(true) {
        let pts = sub.key_points();
        if pts.len() != 2 {
            return false;
        }
        let dx = (pts.xs[1] - pts.xs[0]).abs();
        let dy = (pts.ys[1] - pts.ys[0]).abs();
        if dy < 1e-2 {
            if dx > 0.3 * cw {
                long += 1;
            }
        } else if dx < 1e-2 {
            if dy > 0.3 * ch {
                long += 1;
            }
        } else {
            return false;
        }
    }
    long >= 4
}

/// Companion features over the chart's full raw-path set: a same-color
/// same-size sibling, a same-color legend-sized sibling, and the count
/// of siblings sharing this path's x-extent.
fn context_features(raw: &RawPath, all: &[RawPath]) -> (bool, bool, u32) {
    let bounds = match raw.path.bounds() {
        Some(b) => b,
        None => return (false, false, 0),
    };
    let mut same_size = false;
    let mut small_companion = false;
    let mut aligned = 0u32;
    for other in all {
        if std::ptr::eq(other, raw) {
            continue;
        }
        let ob = match other.path.bounds() {
            Some(b) => b,
            None => continue,
        };
        if other.color == raw.color {
            if (ob.width - bounds.width).abs() < 1.0 || (ob.height - bounds.height).abs() < 1.0 {
                same_size = true;
            }
            if ob.width < 10.0 && ob.height < 10.0 {
                small_companion = true;
            }
        }
        if (ob.left() - bounds.left()).abs() < 1.0 && (ob.right() - bounds.right()).abs() < 1.0 {
            aligned += 1;
        }
    }
    (same_size, small_companion, aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Path, Point, Rect};

    fn chart() -> Chart {
        Chart::new(Rect::new(0.0, 0.0, 400.0, 300.0))
    }

    #[test]
    fn test_remap_label() {
        assert_eq!(remap_label(0), 1);
        assert_eq!(remap_label(3), 4);
        assert_eq!(remap_label(4), 6);
        assert_eq!(remap_label(7), 9);
    }

    #[test]
    fn test_feature_layout_for_filled_rect() {
        let raw = RawPath::new(
            Path::new().rect(&Rect::new(100.0, 100.0, 40.0, 80.0)),
            PaintMode::Fill,
            Color::new(255, 0, 0),
        );
        let all = [raw.clone()];
        let f = PathFeatures::compute(&chart(), &raw, &all).unwrap();
        let v = f.values();
        assert_eq!(v[4], 1.0); // red channel
        assert_eq!(v[7], 1.0); // fill
        assert!((v[8] - (40.0 * 80.0) / (400.0 * 300.0)).abs() < 1e-9);
        assert_eq!(v[9], 1.0); // one MoveTo
        assert_eq!(v[10], 3.0); // three LineTos
        assert_eq!(v[13], 1.0); // one Close
        assert!((v[22] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_gridwork_flag() {
        let mut path = Path::new();
        for i in 0..5 {
            let y = 50.0 + 40.0 * i as f64;
            path = path
                .move_to(Point::new(10.0, y))
                .line_to(Point::new(390.0, y));
        }
        let raw = RawPath::new(path, PaintMode::Stroke, Color::new(200, 200, 200));
        let all = [raw.clone()];
        let f = PathFeatures::compute(&chart(), &raw, &all).unwrap();
        assert_eq!(f.values()[24], 1.0);
    }

    #[test]
    fn test_degenerate_chart_rejected() {
        let raw = RawPath::new(
            Path::new().rect(&Rect::new(0.0, 0.0, 10.0, 10.0)),
            PaintMode::Fill,
            Color::new(0, 0, 0),
        );
        let empty = Chart::new(Rect::new(0.0, 0.0, 0.0, 0.0));
        assert!(PathFeatures::compute(&empty, &raw, &[]).is_none());
    }
}
