//! Vertex and band extraction for value interpolation.
//!
//! Line records interpolate against their vertex list; area records
//! interpolate against an upper/lower boundary band. Both extractions
//! filter to the horizontal axis range so stray points outside the plot
//! never feed the scale mapping.

use crate::geometry::{Line, Path, PathSegment};

/// Vertex list of a line/curve record.
#[derive(Debug, Clone, Default)]
pub struct LinePoints {
    /// Vertex x coordinates.
    pub xs: Vec<f64>,
    /// Vertex y coordinates.
    pub ys: Vec<f64>,
    /// True per vertex when it ends a curve segment.
    pub curved: Vec<bool>,
}

/// Upper/lower boundary band of an area record.
#[derive(Debug, Clone, Default)]
pub struct BandPoints {
    /// Shared x coordinates.
    pub xs: Vec<f64>,
    /// Upper boundary y per x (numerically smaller).
    pub ys_upper: Vec<f64>,
    /// Lower boundary y per x.
    pub ys_lower: Vec<f64>,
}

/// Extract the interpolation vertices of a line or curve path.
///
/// Move/Line endpoints are kept with adjacent duplicates (within `eps`)
/// collapsed; curves contribute their endpoint. When an axis is given,
/// points outside its x-range (expanded by 1%) are skipped. Fails when
/// fewer than two vertices survive.
pub fn line_points(path: &Path, h_axis: Option<&Line>, eps: f64) -> Option<LinePoints> {
    let range = h_axis.map(|axis| {
        let xmin = axis.p1.x.min(axis.p2.x);
        let xmax = axis.p1.x.max(axis.p2.x);
        let dw = 0.01 * (xmax - xmin);
        (xmin - dw, xmax + dw)
    });
    let in_range = |x: f64| range.map_or(true, |(lo, hi)| x >= lo && x <= hi);

    let mut out = LinePoints::default();
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => {
                if !in_range(p.x) {
                    continue;
                }
                if let (Some(&lx), Some(&ly)) = (out.xs.last(), out.ys.last()) {
                    if (lx - p.x).abs() < eps && (ly - p.y).abs() < eps {
                        continue;
                    }
                }
                out.xs.push(p.x);
                out.ys.push(p.y);
                out.curved.push(false);
            }
            PathSegment::CurveTo(c1, _, e) => {
                // the original filters on the first control point
                if !in_range(c1.x) {
                    continue;
                }
                out.xs.push(e.x);
                out.ys.push(e.y);
                out.curved.push(true);
            }
            PathSegment::Close => {}
        }
    }
    if out.xs.len() < 2 {
        None
    } else {
        Some(out)
    }
}

/// Extract the upper/lower boundary band of a filled area ring.
///
/// The ring is close-point normalized first, then its Move/Line vertices
/// inside the axis x-range are bucketed by x: the first point seen at an
/// x goes to the upper set, a repeat at the same x to the lower set, and
/// a single-x boundary vertex (its neighbors coincide) is duplicated into
/// the lower set. The two sets must pair up with equal x; each pair is
/// swapped so the upper y is the smaller.
pub fn band_points(path: &Path, h_axis: &Line, eps: f64) -> Option<BandPoints> {
    let normalized = path.reset_close_point(eps);
    let xmin = h_axis.p1.x.min(h_axis.p2.x) - eps;
    let xmax = h_axis.p1.x.max(h_axis.p2.x) + eps;

    let same_x = |a: f64, b: f64| (a - b).abs() < eps;
    let same_pt = |a: (f64, f64), b: (f64, f64)| same_x(a.0, b.0) && (a.1 - b.1).abs() < eps;

    let mut seen: Vec<(f64, f64)> = Vec::new();
    let mut upper: Vec<(f64, f64)> = Vec::new();
    let mut lower: Vec<(f64, f64)> = Vec::new();
    for seg in &normalized.segments {
        let p = match seg {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => *p,
            _ => continue,
        };
        if p.x < xmin || p.x > xmax {
            continue;
        }
        let apt = (p.x, p.y);
        let n = seen.len();
        // a vertex whose neighbors coincide is the single point of its x
        // column; it bounds the band on both sides
        if n >= 2
            && !same_pt(apt, seen[n - 1])
            && same_pt(apt, seen[n - 2])
            && !lower.iter().any(|q| same_x(q.0, seen[n - 1].0))
        {
            lower.push(seen[n - 1]);
        }
        if upper.iter().any(|q| same_x(q.0, apt.0)) {
            if !lower.iter().any(|q| same_x(q.0, apt.0)) {
                lower.push(apt);
            }
        } else {
            upper.push(apt);
        }
        seen.push(apt);
    }

    if upper.is_empty() || upper.len() != lower.len() {
        return None;
    }
    let by_x = |a: &(f64, f64), b: &(f64, f64)| {
        a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
    };
    upper.sort_by(by_x);
    lower.sort_by(by_x);

    let mut out = BandPoints::default();
    for (u, d) in upper.iter().zip(lower.iter()) {
        if !same_x(u.0, d.0) {
            return None;
        }
        let (yu, yd) = if u.1 > d.1 { (d.1, u.1) } else { (u.1, d.1) };
        out.xs.push(u.0);
        out.ys_upper.push(yu);
        out.ys_lower.push(yd);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Path, Point};

    fn axis() -> Line {
        Line::from_coords(0.0, 100.0, 200.0, 100.0)
    }

    #[test]
    fn test_line_points_dedup_and_filter() {
        let path = Path::new()
            .move_to(Point::new(10.0, 50.0))
            .line_to(Point::new(10.05, 50.02))
            .line_to(Point::new(60.0, 30.0))
            .line_to(Point::new(500.0, 30.0));
        let pts = line_points(&path, Some(&axis()), 0.1).unwrap();
        assert_eq!(pts.xs, vec![10.0, 60.0]);
        assert!(!pts.curved[0]);
    }

    #[test]
    fn test_line_points_needs_two() {
        let path = Path::new().move_to(Point::new(10.0, 50.0));
        assert!(line_points(&path, None, 0.1).is_none());
    }

    #[test]
    fn test_band_points_simple_ribbon() {
        // closed band: upper edge y=20..30, lower edge y=80
        let path = Path::new()
            .move_to(Point::new(10.0, 20.0))
            .line_to(Point::new(50.0, 30.0))
            .line_to(Point::new(90.0, 25.0))
            .line_to(Point::new(90.0, 80.0))
            .line_to(Point::new(50.0, 80.0))
            .line_to(Point::new(10.0, 80.0))
            .close();
        let band = band_points(&path, &axis(), 0.1).unwrap();
        assert_eq!(band.xs, vec![10.0, 50.0, 90.0]);
        assert_eq!(band.ys_upper, vec![20.0, 30.0, 25.0]);
        assert_eq!(band.ys_lower, vec![80.0, 80.0, 80.0]);
    }

    #[test]
    fn test_band_points_unbalanced_fails() {
        let path = Path::new()
            .move_to(Point::new(10.0, 20.0))
            .line_to(Point::new(50.0, 30.0))
            .line_to(Point::new(10.0, 80.0))
            .close();
        assert!(band_points(&path, &axis(), 0.1).is_none());
    }
}
