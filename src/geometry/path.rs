//! Vector path representation and traversal helpers.
//!
//! A [`Path`] is an ordered list of move/line/curve/close segments, built
//! with value-semantics methods that consume and return `Self`. The
//! traversal helpers ([`Path::extract_points`], [`Path::key_points`],
//! [`Path::all_points`]) flatten a path into the coordinate lists the
//! classifiers work on.

use serde::{Deserialize, Serialize};

use super::{Point, Rect};

/// One drawing segment of a vector path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    /// Start a new sub-path at the given point.
    MoveTo(Point),
    /// Straight segment to the given point.
    LineTo(Point),
    /// Cubic Bézier segment: control1, control2, endpoint.
    CurveTo(Point, Point, Point),
    /// Close the current sub-path back to its starting point.
    Close,
}

/// How a path was painted on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaintMode {
    /// Interior filled.
    Fill,
    /// Outline stroked.
    Stroke,
}

/// Segment tag attached to each flattened point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegKind {
    /// Point came from a MoveTo.
    Move,
    /// Point came from a LineTo.
    Line,
    /// Point is the endpoint of a CurveTo.
    Curve,
    /// Marker for a Close (coordinates repeat the sub-path start).
    Close,
}

/// Flattened point arrays with per-point segment tags.
#[derive(Debug, Clone, Default)]
pub struct PointList {
    /// X coordinates.
    pub xs: Vec<f64>,
    /// Y coordinates.
    pub ys: Vec<f64>,
    /// Originating segment kind per point.
    pub kinds: Vec<SegKind>,
}

impl PointList {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// True when no point was collected.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Point at index `i`.
    pub fn point(&self, i: usize) -> Point {
        Point::new(self.xs[i], self.ys[i])
    }

    fn push(&mut self, p: Point, kind: SegKind) {
        self.xs.push(p.x);
        self.ys.push(p.y);
        self.kinds.push(kind);
    }
}

/// An ordered sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// The segments in drawing order.
    pub segments: Vec<PathSegment>,
}

impl Path {
    /// Create an empty path.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::{Path, Point};
    ///
    /// let path = Path::new()
    ///     .move_to(Point::new(0.0, 0.0))
    ///     .line_to(Point::new(10.0, 0.0))
    ///     .close();
    /// assert_eq!(path.segments.len(), 3);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a MoveTo segment.
    pub fn move_to(mut self, p: Point) -> Self {
        self.segments.push(PathSegment::MoveTo(p));
        self
    }

    /// Append a LineTo segment.
    pub fn line_to(mut self, p: Point) -> Self {
        self.segments.push(PathSegment::LineTo(p));
        self
    }

    /// Append a CurveTo segment.
    pub fn curve_to(mut self, c1: Point, c2: Point, end: Point) -> Self {
        self.segments.push(PathSegment::CurveTo(c1, c2, end));
        self
    }

    /// Append a Close segment.
    pub fn close(mut self) -> Self {
        self.segments.push(PathSegment::Close);
        self
    }

    /// Append an axis-aligned rectangle as a closed sub-path.
    ///
    /// # Examples
    ///
    /// ```
    /// use chart_oxide::geometry::{Path, Rect};
    ///
    /// let path = Path::new().rect(&Rect::new(0.0, 0.0, 20.0, 10.0));
    /// let bounds = path.bounds().unwrap();
    /// assert_eq!(bounds.width, 20.0);
    /// assert_eq!(bounds.height, 10.0);
    /// ```
    pub fn rect(self, r: &Rect) -> Self {
        self.move_to(Point::new(r.left(), r.top()))
            .line_to(Point::new(r.right(), r.top()))
            .line_to(Point::new(r.right(), r.bottom()))
            .line_to(Point::new(r.left(), r.bottom()))
            .close()
    }

    /// True when the path holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Bounding box over all endpoints and curve control points.
    ///
    /// Returns `None` for an empty path or when any coordinate is NaN.
    pub fn bounds(&self) -> Option<Rect> {
        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        let mut any = false;
        let mut visit = |p: &Point| {
            if p.x.is_nan() || p.y.is_nan() {
                return false;
            }
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
            any = true;
            true
        };
        for seg in &self.segments {
            let ok = match seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => visit(p),
                PathSegment::CurveTo(c1, c2, e) => visit(c1) && visit(c2) && visit(e),
                PathSegment::Close => true,
            };
            if !ok {
                return None;
            }
        }
        if any {
            Some(Rect::from_points(x0, y0, x1, y1))
        } else {
            None
        }
    }

    /// Weighted point count: Move, Line, and Close count 1, Curve counts 3.
    pub fn point_count(&self) -> u32 {
        self.segments
            .iter()
            .map(|seg| match seg {
                PathSegment::CurveTo(..) => 3,
                _ => 1,
            })
            .sum()
    }

    /// First drawn point, if any.
    pub fn first_point(&self) -> Option<Point> {
        self.segments.iter().find_map(|seg| match seg {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => Some(*p),
            PathSegment::CurveTo(_, _, e) => Some(*e),
            PathSegment::Close => None,
        })
    }

    /// Last drawn point, if any.
    pub fn last_point(&self) -> Option<Point> {
        self.segments.iter().rev().find_map(|seg| match seg {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => Some(*p),
            PathSegment::CurveTo(_, _, e) => Some(*e),
            PathSegment::Close => None,
        })
    }

    /// True when the path ends in a Close or its first and last drawn
    /// points coincide within `eps`.
    pub fn is_closed(&self, eps: f64) -> bool {
        if matches!(self.segments.last(), Some(PathSegment::Close)) {
            return true;
        }
        match (self.first_point(), self.last_point()) {
            (Some(a), Some(b)) => a.approx_eq(&b, eps),
            _ => false,
        }
    }

    /// Every point in drawing order, curve control points included,
    /// Close markers skipped. Arc analysis relies on the three-points-per
    /// -curve layout.
    pub fn all_points(&self) -> Vec<Point> {
        let mut pts = Vec::new();
        for seg in &self.segments {
            match seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => pts.push(*p),
                PathSegment::CurveTo(c1, c2, e) => {
                    pts.push(*c1);
                    pts.push(*c2);
                    pts.push(*e);
                }
                PathSegment::Close => {}
            }
        }
        pts
    }

    /// Segment endpoints with tags, kept exactly as drawn (no dedup).
    ///
    /// Curves contribute their endpoint only; a Close contributes a marker
    /// point repeating the current sub-path start.
    pub fn key_points(&self) -> PointList {
        let mut list = PointList::default();
        let mut sub_start: Option<Point> = None;
        for seg in &self.segments {
            match seg {
                PathSegment::MoveTo(p) => {
                    sub_start = Some(*p);
                    list.push(*p, SegKind::Move);
                }
                PathSegment::LineTo(p) => list.push(*p, SegKind::Line),
                PathSegment::CurveTo(_, _, e) => list.push(*e, SegKind::Curve),
                PathSegment::Close => {
                    if let Some(start) = sub_start {
                        list.push(start, SegKind::Close);
                    }
                }
            }
        }
        list
    }

    /// Segment endpoints with tags, adjacent duplicates (within `eps`)
    /// collapsed. A MoveTo always starts a fresh run, so no chord is drawn
    /// across sub-paths; Close markers are skipped.
    pub fn extract_points(&self, eps: f64) -> PointList {
        let mut list = PointList::default();
        for seg in &self.segments {
            let (p, kind) = match seg {
                PathSegment::MoveTo(p) => (*p, SegKind::Move),
                PathSegment::LineTo(p) => (*p, SegKind::Line),
                PathSegment::CurveTo(_, _, e) => (*e, SegKind::Curve),
                PathSegment::Close => continue,
            };
            if kind != SegKind::Move && !list.is_empty() {
                let last = list.point(list.len() - 1);
                if last.approx_eq(&p, eps) {
                    continue;
                }
            }
            list.push(p, kind);
        }
        list
    }

    /// Split into sub-paths at every Close and, when `split_on_move` is
    /// set, at every MoveTo as well.
    pub fn split_sub_paths(&self, split_on_move: bool) -> Vec<Path> {
        let mut parts = Vec::new();
        let mut current = Path::new();
        for seg in &self.segments {
            match seg {
                PathSegment::MoveTo(_) => {
                    if split_on_move && !current.is_empty() {
                        parts.push(std::mem::take(&mut current));
                    }
                    current.segments.push(*seg);
                }
                PathSegment::Close => {
                    current.segments.push(*seg);
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.segments.push(*seg),
            }
        }
        if !current.is_empty() {
            parts.push(current);
        }
        parts
    }

    /// Rewrite a trailing Close into an explicit LineTo back to the
    /// sub-path start when the endpoints differ by more than `eps`, so
    /// area and band extraction see an explicit ring.
    pub fn reset_close_point(&self, eps: f64) -> Path {
        let mut out = Path::new();
        let mut sub_start: Option<Point> = None;
        let mut last: Option<Point> = None;
        for seg in &self.segments {
            match seg {
                PathSegment::MoveTo(p) => {
                    sub_start = Some(*p);
                    last = Some(*p);
                    out.segments.push(*seg);
                }
                PathSegment::LineTo(p) => {
                    last = Some(*p);
                    out.segments.push(*seg);
                }
                PathSegment::CurveTo(_, _, e) => {
                    last = Some(*e);
                    out.segments.push(*seg);
                }
                PathSegment::Close => {
                    if let (Some(start), Some(end)) = (sub_start, last) {
                        if !start.approx_eq(&end, eps) {
                            out.segments.push(PathSegment::LineTo(start));
                            last = Some(start);
                            continue;
                        }
                    }
                    out.segments.push(*seg);
                }
            }
        }
        out
    }

    /// Append another path's segments to this one.
    pub fn extend(&mut self, other: &Path) {
        self.segments.extend_from_slice(&other.segments);
    }
}

/// One raw page-decomposition path: geometry plus paint style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPath {
    /// The vector geometry.
    pub path: Path,
    /// Fill or stroke.
    pub mode: PaintMode,
    /// Paint color.
    pub color: super::Color,
    /// Stroke width in points (0 for fills).
    pub stroke_width: f64,
    /// True when the stroke used a dash pattern.
    pub dashed: bool,
}

impl RawPath {
    /// Create a raw path record.
    pub fn new(path: Path, mode: PaintMode, color: super::Color) -> Self {
        Self {
            path,
            mode,
            color,
            stroke_width: 0.0,
            dashed: false,
        }
    }
}
