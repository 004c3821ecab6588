//! Minimum oriented bounding box computation.
//!
//! Dash-blob measurement needs the tightest rectangle around a point blob
//! at any orientation, not just axis-aligned. The construction is the
//! standard one: monotone-chain convex hull, then rotating calipers over
//! the hull edges.

use super::Point;

/// An oriented bounding box: four corners in order plus the enclosed area.
#[derive(Debug, Clone)]
pub struct OrientedBox {
    /// Corner points in winding order.
    pub corners: [Point; 4],
    /// Box area.
    pub area: f64,
}

impl OrientedBox {
    /// Mean of the four corners.
    pub fn centroid(&self) -> Point {
        let sx: f64 = self.corners.iter().map(|p| p.x).sum();
        let sy: f64 = self.corners.iter().map(|p| p.y).sum();
        Point::new(sx / 4.0, sy / 4.0)
    }
}

fn cross(o: &Point, a: &Point, b: &Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull of a point set by the monotone-chain construction.
///
/// Returns hull vertices in counter-clockwise order without the repeated
/// first point. Fewer than three input points come back as-is.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup_by(|a, b| a.x == b.x && a.y == b.y);
    let n = pts.len();
    if n < 3 {
        return pts;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(2 * n);
    for p in &pts {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev() {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Minimum-area oriented bounding box of a point set.
///
/// Rotating calipers over the convex hull: the minimum box has one side
/// collinear with a hull edge, so it suffices to project the hull onto
/// each edge direction. Returns `None` for fewer than three distinct
/// points (no area to bound).
///
/// # Examples
///
/// ```
/// use chart_oxide::geometry::obb::min_oriented_box;
/// use chart_oxide::geometry::Point;
///
/// let pts = vec![
///     Point::new(0.0, 0.0),
///     Point::new(4.0, 0.0),
///     Point::new(4.0, 2.0),
///     Point::new(0.0, 2.0),
/// ];
/// let obb = min_oriented_box(&pts).unwrap();
/// assert!((obb.area - 8.0).abs() < 1e-9);
/// ```
pub fn min_oriented_box(points: &[Point]) -> Option<OrientedBox> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<OrientedBox> = None;
    let n = hull.len();
    for i in 0..n {
        let a = hull[i];
        let b = hull[(i + 1) % n];
        let ex = b.x - a.x;
        let ey = b.y - a.y;
        let len = (ex * ex + ey * ey).sqrt();
        if len == 0.0 {
            continue;
        }
        let (ux, uy) = (ex / len, ey / len);
        // perpendicular direction
        let (vx, vy) = (-uy, ux);

        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for p in &hull {
            let du = (p.x - a.x) * ux + (p.y - a.y) * uy;
            let dv = (p.x - a.x) * vx + (p.y - a.y) * vy;
            min_u = min_u.min(du);
            max_u = max_u.max(du);
            min_v = min_v.min(dv);
            max_v = max_v.max(dv);
        }
        let area = (max_u - min_u) * (max_v - min_v);
        if best.as_ref().map_or(true, |b| area < b.area) {
            let corner = |u: f64, v: f64| {
                Point::new(a.x + u * ux + v * vx, a.y + u * uy + v * vy)
            };
            best = Some(OrientedBox {
                corners: [
                    corner(min_u, min_v),
                    corner(max_u, min_v),
                    corner(max_u, max_v),
                    corner(min_u, max_v),
                ],
                area,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_drops_interior_points() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(2.0, 2.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.iter().any(|p| p.x == 2.0 && p.y == 2.0));
    }

    #[test]
    fn test_axis_aligned_box() {
        let pts = vec![
            Point::new(1.0, 1.0),
            Point::new(5.0, 1.0),
            Point::new(5.0, 3.0),
            Point::new(1.0, 3.0),
        ];
        let obb = min_oriented_box(&pts).unwrap();
        assert!((obb.area - 8.0).abs() < 1e-9);
        let c = obb.centroid();
        assert!((c.x - 3.0).abs() < 1e-9);
        assert!((c.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_box_beats_axis_aligned() {
        // diamond: axis-aligned bbox has area 4, tilted box has area 2
        let pts = vec![
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 2.0),
        ];
        let obb = min_oriented_box(&pts).unwrap();
        assert!((obb.area - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_input() {
        assert!(min_oriented_box(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_none());
        assert!(min_oriented_box(&[]).is_none());
    }
}
