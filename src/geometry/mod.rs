//! Geometric primitives for chart-structure analysis.
//!
//! This module provides the basic geometric types and operations used
//! throughout the classification algorithms: points, rectangles, axis
//! segments, and RGB colors, all in page-point coordinates.

pub mod obb;
pub mod path;

pub use path::{PaintMode, Path, PathSegment, PointList, RawPath, SegKind};

use serde::{Deserialize, Serialize};

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::Point;
    ///
    /// let p1 = Point::new(0.0, 0.0);
    /// let p2 = Point::new(3.0, 4.0);
    /// assert_eq!(p1.distance_to(&p2), 5.0);
    /// ```
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Check coordinate-wise equality within a tolerance.
    pub fn approx_eq(&self, other: &Point, eps: f64) -> bool {
        (self.x - other.x).abs() < eps && (self.y - other.y).abs() < eps
    }
}

/// A rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the lower-left corner
    pub x: f64,
    /// Y coordinate of the lower-left corner
    pub y: f64,
    /// Width of rectangle
    pub width: f64,
    /// Height of rectangle
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::Rect;
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Get the center point of the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// let center = rect.center();
    /// assert_eq!(center.x, 50.0);
    /// assert_eq!(center.y, 25.0);
    /// ```
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Check if this rectangle intersects with another.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
    /// let r3 = Rect::new(200.0, 200.0, 100.0, 100.0);
    ///
    /// assert!(r1.intersects(&r2));
    /// assert!(!r1.intersects(&r3));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Check if this rectangle contains a point (edges inclusive).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Check if this rectangle fully contains another.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.left() <= other.left()
            && self.right() >= other.right()
            && self.top() <= other.top()
            && self.bottom() >= other.bottom()
    }

    /// Compute the union of this rectangle with another.
    ///
    /// Returns the smallest rectangle that contains both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }

    /// Area of the overlap with another rectangle, zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.left().max(other.left());
        let h = self.bottom().min(other.bottom()) - self.top().max(other.top());
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Compute the area of the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.area(), 5000.0);
    /// ```
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// An RGB color in 0–255 channel space.
///
/// Integer channels, because every color tolerance in the engine (summed
/// channel difference, luminance rank) is calibrated against 0–255 values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Create a new color.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Summed absolute channel difference to another color.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::Color;
    ///
    /// let a = Color::new(200, 100, 50);
    /// let b = Color::new(205, 98, 50);
    /// assert_eq!(a.channel_diff(&b), 7);
    /// ```
    pub fn channel_diff(&self, other: &Color) -> u32 {
        (self.r as i32 - other.r as i32).unsigned_abs()
            + (self.g as i32 - other.g as i32).unsigned_abs()
            + (self.b as i32 - other.b as i32).unsigned_abs()
    }

    /// Largest single-channel difference to another color.
    pub fn channel_max_diff(&self, other: &Color) -> u32 {
        let dr = (self.r as i32 - other.r as i32).unsigned_abs();
        let dg = (self.g as i32 - other.g as i32).unsigned_abs();
        let db = (self.b as i32 - other.b as i32).unsigned_abs();
        dr.max(dg).max(db)
    }

    /// Squared-channel luminance used to rank near-miss colors.
    pub fn luminance(&self) -> u32 {
        let (r, g, b) = (self.r as u32, self.g as u32, self.b as u32);
        r * r + g * g + b * b
    }
}

/// An axis line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// First endpoint
    pub p1: Point,
    /// Second endpoint
    pub p2: Point,
}

impl Line {
    /// Create a line from two endpoints.
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Create a line from raw coordinates.
    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            p1: Point::new(x1, y1),
            p2: Point::new(x2, y2),
        }
    }

    /// Segment length. Axis-aligned segments (within `eps`) take the
    /// single-coordinate fast path.
    pub fn length(&self, eps: f64) -> f64 {
        let dx = (self.p2.x - self.p1.x).abs();
        let dy = (self.p2.y - self.p1.y).abs();
        if dy < eps {
            dx
        } else if dx < eps {
            dy
        } else {
            (dx * dx + dy * dy).sqrt()
        }
    }

    /// True when the endpoints share a y-coordinate within `eps`.
    pub fn is_horizontal(&self, eps: f64) -> bool {
        (self.p2.y - self.p1.y).abs() < eps
    }

    /// True when the endpoints share an x-coordinate within `eps`.
    pub fn is_vertical(&self, eps: f64) -> bool {
        (self.p2.x - self.p1.x).abs() < eps
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> Point {
        Point::new((self.p1.x + self.p2.x) / 2.0, (self.p1.y + self.p2.y) / 2.0)
    }

    /// Test orthogonality against another segment: the normalized direction
    /// dot product must vanish, and when `test_intersect` is set one endpoint
    /// of `other` must lie on this segment's carrier line.
    pub fn orthogonal_to(&self, other: &Line, test_intersect: bool, eps: f64) -> bool {
        let (dx1, dy1) = (self.p2.x - self.p1.x, self.p2.y - self.p1.y);
        let (dx2, dy2) = (other.p2.x - other.p1.x, other.p2.y - other.p1.y);
        let len1 = (dx1 * dx1 + dy1 * dy1).sqrt();
        let len2 = (dx2 * dx2 + dy2 * dy2).sqrt();
        if len1 < eps || len2 < eps {
            return false;
        }
        let dot = (dx1 * dx2 + dy1 * dy2) / (len1 * len2);
        if dot.abs() >= eps {
            return false;
        }
        if !test_intersect {
            return true;
        }
        // cross-product point-line distance from either endpoint of `other`
        let dist = |p: &Point| {
            ((p.x - self.p1.x) * dy1 - (p.y - self.p1.y) * dx1).abs() / len1
        };
        dist(&other.p1) < eps
            || dist(&other.p2) < eps
            || {
                let d2 = |p: &Point| {
                    ((p.x - other.p1.x) * dy2 - (p.y - other.p1.y) * dx2).abs() / len2
                };
                d2(&self.p1) < eps || d2(&self.p2) < eps
            }
    }
}

/// Compute the Euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use chart_oxide::geometry::{euclidean_distance, Point};
///
/// let p1 = Point::new(0.0, 0.0);
/// let p2 = Point::new(3.0, 4.0);
/// assert_eq!(euclidean_distance(&p1, &p2), 5.0);
/// ```
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f64 {
    p1.distance_to(p2)
}

/// Shoelace area of the polygon formed by the coordinate lists.
///
/// The ring is closed with the first point before summing; the absolute
/// value is returned, so orientation does not matter. Self-intersecting
/// fill-then-close paths are tolerated (signed lobes may cancel).
///
/// # Examples
///
/// ```
/// use chart_oxide::geometry::polygon_area;
///
/// let xs = [0.0, 4.0, 4.0, 0.0];
/// let ys = [0.0, 0.0, 3.0, 3.0];
/// assert_eq!(polygon_area(&xs, &ys), 12.0);
/// ```
pub fn polygon_area(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += 0.5 * (xs[i] * ys[j] - xs[j] * ys[i]);
    }
    area.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.distance_to(&p2), 5.0);
        assert_eq!(p2.distance_to(&p2), 0.0);
    }

    #[test]
    fn test_point_approx_eq() {
        let p1 = Point::new(10.0, 20.0);
        let p2 = Point::new(10.05, 19.96);
        assert!(p1.approx_eq(&p2, 0.1));
        assert!(!p1.approx_eq(&p2, 0.01));
    }

    #[test]
    fn test_rect_from_points() {
        let r = Rect::from_points(10.0, 20.0, 110.0, 70.0);
        assert_eq!(r.x, 10.0);
        assert_eq!(r.y, 20.0);
        assert_eq!(r.width, 100.0);
        assert_eq!(r.height, 50.0);
    }

    #[test]
    fn test_rect_edges_and_center() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 70.0);
        let c = r.center();
        assert_eq!(c.x, 60.0);
        assert_eq!(c.y, 45.0);
    }

    #[test]
    fn test_rect_intersects() {
        let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
        let r3 = Rect::new(200.0, 200.0, 100.0, 100.0);
        assert!(r1.intersects(&r2));
        assert!(r2.intersects(&r1));
        assert!(!r1.intersects(&r3));
    }

    #[test]
    fn test_rect_contains_rect() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(25.0, 25.0, 50.0, 50.0);
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
    }

    #[test]
    fn test_rect_intersection_area() {
        let r1 = Rect::new(0.0, 0.0, 10.0, 10.0);
        let r2 = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(r1.intersection_area(&r2), 25.0);
        let r3 = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert_eq!(r1.intersection_area(&r3), 0.0);
    }

    #[test]
    fn test_color_channel_diff() {
        let a = Color::new(200, 100, 50);
        let b = Color::new(190, 105, 50);
        assert_eq!(a.channel_diff(&b), 15);
        assert_eq!(a.channel_diff(&a), 0);
    }

    #[test]
    fn test_color_luminance_ordering() {
        let dark = Color::new(30, 30, 30);
        let bright = Color::new(200, 200, 200);
        assert!(dark.luminance() < bright.luminance());
    }

    #[test]
    fn test_line_orientation() {
        let h = Line::from_coords(0.0, 5.0, 100.0, 5.05);
        let v = Line::from_coords(10.0, 0.0, 10.0, 80.0);
        assert!(h.is_horizontal(0.1));
        assert!(!h.is_vertical(0.1));
        assert!(v.is_vertical(0.1));
        assert_eq!(v.length(0.1), 80.0);
    }

    #[test]
    fn test_line_orthogonal() {
        let h = Line::from_coords(0.0, 50.0, 100.0, 50.0);
        let v = Line::from_coords(40.0, 0.0, 40.0, 100.0);
        let diag = Line::from_coords(0.0, 0.0, 100.0, 100.0);
        assert!(h.orthogonal_to(&v, true, 0.1));
        assert!(!h.orthogonal_to(&diag, false, 0.1));
    }

    #[test]
    fn test_polygon_area_rectangle() {
        let xs = [0.0, 10.0, 10.0, 0.0];
        let ys = [0.0, 0.0, 5.0, 5.0];
        assert_eq!(polygon_area(&xs, &ys), 50.0);
    }

    #[test]
    fn test_polygon_area_degenerate() {
        assert_eq!(polygon_area(&[0.0, 1.0], &[0.0, 1.0]), 0.0);
    }
}
