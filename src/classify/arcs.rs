//! Arc, ring, and pie reconstruction.
//!
//! Pie slices arrive in two encodings: a content-stream wedge (MoveTo the
//! center, LineTo the rim, then Bézier sub-arcs, Close) and a form-object
//! wedge (MoveTo the rim, Bézier sub-arcs, LineTo the center, Close).
//! Rings, donut holes, sliver triangles, and circular legend icons round
//! out the zoo. The [`ArcReconstructor`] accumulates wedges until their
//! spans sum to a full circle, then snapshots the set as a [`Pie`].

use std::f64::consts::PI;

use log::debug;

use crate::chart::{ArcObject, Pie};
use crate::config::ClassifierConfig;
use crate::geometry::{Color, Path, PathSegment, Point};

/// Geometric parameters of one wedge, before color/path attachment.
#[derive(Debug, Clone, Copy, Default)]
pub struct WedgeGeom {
    /// Implied circle center.
    pub center: Point,
    /// Mean rim radius.
    pub radius: f64,
    /// Angular span, positive.
    pub angle: f64,
    /// Absolute start angle in `(-pi, pi]`.
    pub start_angle: f64,
    /// Absolute end angle in `(-pi, pi]`.
    pub end_angle: f64,
}

/// Quadrant-aware ray angle in `(-pi, pi]`.
///
/// Near-vertical rays (|vx| < 1e-4) snap to ±pi/2 by the sign of vy; the
/// left half-plane offsets the principal arctangent by ±pi.
fn ray_angle(vx: f64, vy: f64) -> f64 {
    if vx.abs() < 1e-4 {
        if vy > 0.0 {
            PI / 2.0
        } else if vy < 0.0 {
            -PI / 2.0
        } else {
            0.0
        }
    } else if vx > 0.0 {
        (vy / vx).atan()
    } else if vy >= 0.0 {
        (vy / vx).atan() + PI
    } else {
        (vy / vx).atan() - PI
    }
}

/// Wedge parameters from a center and two rim points.
///
/// The radius is the mean of the two rays; the span comes from the
/// absolute cosine of the angle between them, snapped to 1 when the rays
/// are numerically parallel.
pub fn compute_wedge(center: Point, rim1: Point, rim2: Point) -> WedgeGeom {
    let v1 = (rim1.x - center.x, rim1.y - center.y);
    let v2 = (rim2.x - center.x, rim2.y - center.y);
    let len1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let len2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    let mut fcos = ((v1.0 * v2.0 + v1.1 * v2.1) / (len1 * len2)).abs();
    if (0.999..=1.001).contains(&fcos) {
        fcos = 1.0;
    }
    WedgeGeom {
        center,
        radius: 0.5 * (len1 + len2),
        angle: fcos.min(1.0).acos(),
        start_angle: ray_angle(v1.0, v1.1),
        end_angle: ray_angle(v2.0, v2.1),
    }
}

/// Validate an arc point list and accumulate its wedge parameters.
///
/// `pts` holds the flattened path points, three per Bézier sub-arc, with
/// the center either leading (`center_at_end == false`, rotated to the
/// end first) or already trailing. Every rim point must sit within the
/// relative tolerance of the mean radius; the span accumulates pairwise
/// over consecutive sub-arc endpoints.
pub fn arc_from_points(pts: &[Point], center_at_end: bool, rel_tol: f64) -> Option<WedgeGeom> {
    let count = pts.len();
    if count < 5 {
        return None;
    }
    let mut n = count / 3;
    if n * 3 == count {
        n -= 1;
    }
    let mut pts = pts.to_vec();
    if !center_at_end {
        let first = pts.remove(0);
        pts.push(first);
    }
    let cpt = pts[count - 1];

    let mut dists = Vec::with_capacity(n + 1);
    let mut sum = 0.0;
    for i in 0..=n {
        let d = pts[3 * i].distance_to(&cpt);
        sum += d;
        dists.push(d);
    }
    let mean = sum / (n + 1) as f64;

    let mut out = WedgeGeom::default();
    for i in 0..=n {
        if (dists[i] - mean).abs() >= rel_tol * mean {
            return None;
        }
        if i < n {
            let sub = compute_wedge(cpt, pts[3 * i], pts[3 * i + 3]);
            out.angle += sub.angle;
            if i == 0 {
                out.start_angle = sub.start_angle;
            }
            out.end_angle = sub.end_angle;
            out.center = sub.center;
            out.radius = sub.radius;
        }
    }
    Some(out)
}

/// Parse a content-stream wedge: MoveTo center, LineTo rim, Bézier
/// sub-arcs, Close. A redrawn rim start is tolerated.
fn content_stream_wedge(path: &Path, eps: f64, rel_tol: f64) -> Option<WedgeGeom> {
    let mut pts: Vec<Point> = Vec::new();
    let mut count = 0usize;
    let mut has_arc = false;
    let mut closed = false;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                pts.push(*p);
                count += 1;
            }
            PathSegment::LineTo(p) => {
                if count != 1 {
                    if !pts.is_empty() && pts[0].approx_eq(p, eps) {
                        continue;
                    }
                    return None;
                }
                pts.push(*p);
                count += 1;
            }
            PathSegment::CurveTo(c1, c2, e) => {
                if count != 2 && !has_arc {
                    return None;
                }
                has_arc = true;
                pts.push(*c1);
                pts.push(*c2);
                pts.push(*e);
                count += 3;
            }
            PathSegment::Close => {
                if !has_arc || count < 5 {
                    return None;
                }
                closed = true;
            }
        }
    }
    if count < 5 || !has_arc || !closed {
        return None;
    }
    arc_from_points(&pts, false, rel_tol)
}

/// Parse a form-object wedge: MoveTo rim, Bézier sub-arcs, LineTo center,
/// Close (optionally redrawing the rim start).
fn form_object_wedge(path: &Path, eps: f64, rel_tol: f64) -> Option<WedgeGeom> {
    let mut pts: Vec<Point> = Vec::new();
    let mut count = 0usize;
    let mut has_arc = false;
    let mut continuous = false;
    let mut has_center = false;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                pts.push(*p);
                count += 1;
            }
            PathSegment::LineTo(p) => {
                if count % 3 != 1 || has_center {
                    if has_center && !pts.is_empty() && pts[0].approx_eq(p, eps) {
                        continue;
                    }
                    return None;
                }
                has_center = true;
                pts.push(*p);
                count += 1;
            }
            PathSegment::CurveTo(c1, c2, e) => {
                has_arc = true;
                if count == 1 {
                    continuous = true;
                }
                pts.push(*c1);
                pts.push(*c2);
                pts.push(*e);
                count += 3;
            }
            PathSegment::Close => {
                if !has_arc || !continuous || !has_center {
                    return None;
                }
            }
        }
    }
    if count < 5 || !has_arc || !continuous || !has_center {
        return None;
    }
    arc_from_points(&pts, true, rel_tol)
}

/// Parse a sliver-triangle wedge: MoveTo + two LineTo + Close, isosceles.
///
/// The apex of the two equal edges is the implied pie center.
fn triangle_wedge(path: &Path, eps: f64) -> Option<WedgeGeom> {
    let mut pts: Vec<Point> = Vec::new();
    let mut count = 0usize;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                if count >= 1 {
                    return None;
                }
                pts.push(*p);
                count += 1;
            }
            PathSegment::LineTo(p) => {
                pts.push(*p);
                count += 1;
            }
            PathSegment::Close => {
                if count != 3 {
                    return None;
                }
            }
            PathSegment::CurveTo(..) => return None,
        }
    }
    if pts.len() < 3 {
        return None;
    }
    let d01 = pts[0].distance_to(&pts[1]);
    let d02 = pts[0].distance_to(&pts[2]);
    let d21 = pts[2].distance_to(&pts[1]);
    if (d01 - d02).abs() < eps {
        Some(compute_wedge(pts[0], pts[1], pts[2]))
    } else if (d02 - d21).abs() < eps {
        Some(compute_wedge(pts[2], pts[1], pts[0]))
    } else {
        None
    }
}

/// Parse either wedge encoding.
pub fn parse_wedge(path: &Path, cfg: &ClassifierConfig) -> Option<WedgeGeom> {
    let eps = cfg.eps.delta;
    let tol = cfg.arc.radius_rel_tol;
    content_stream_wedge(path, eps, tol).or_else(|| form_object_wedge(path, eps, tol))
}

/// Flattened ring path: vertex list plus the chord endpoints of every
/// Bézier sub-arc (pen position and curve endpoint, one pair per curve).
struct RingPoints {
    xs: Vec<f64>,
    ys: Vec<f64>,
    chord_pairs: Vec<Point>,
    has_curve: bool,
    has_line: bool,
}

fn ring_points(path: &Path) -> Option<RingPoints> {
    let mut out = RingPoints {
        xs: Vec::new(),
        ys: Vec::new(),
        chord_pairs: Vec::new(),
        has_curve: false,
        has_line: false,
    };
    let mut pen: Option<Point> = None;
    let mut start: Option<Point> = None;
    let mut closes = 0usize;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                if !out.xs.is_empty() {
                    return None;
                }
                start = Some(*p);
                pen = Some(*p);
                out.xs.push(p.x);
                out.ys.push(p.y);
            }
            PathSegment::LineTo(p) => {
                out.has_line = true;
                pen = Some(*p);
                out.xs.push(p.x);
                out.ys.push(p.y);
            }
            PathSegment::CurveTo(_, _, e) => {
                out.has_curve = true;
                out.chord_pairs.push(pen?);
                out.chord_pairs.push(*e);
                pen = Some(*e);
                out.xs.push(e.x);
                out.ys.push(e.y);
            }
            PathSegment::Close => {
                if closes >= 1 {
                    return None;
                }
                closes += 1;
                let s = start?;
                out.xs.push(s.x);
                out.ys.push(s.y);
            }
        }
    }
    if out.xs.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Close the ring when the endpoints differ and drop adjacent duplicate
/// vertices (squared distance under 1e-4). Fails when the deduped ring
/// does not reach `min_box` in either dimension.
fn normalize_ring(xs: &mut Vec<f64>, ys: &mut Vec<f64>, min_box: f64) -> Option<(Vec<f64>, Vec<f64>)> {
    let err = 1e-2 * 1e-2;
    let n = xs.len();
    let d = (xs[0] - xs[n - 1]).powi(2) + (ys[0] - ys[n - 1]).powi(2);
    if d > err {
        xs.push(xs[0]);
        ys.push(ys[0]);
    }
    let mut xs_new = Vec::new();
    let mut ys_new = Vec::new();
    let n = xs.len();
    let mut i = 0usize;
    while i < n - 1 {
        let d = (xs[i] - xs[i + 1]).powi(2) + (ys[i] - ys[i + 1]).powi(2);
        xs_new.push(xs[i]);
        ys_new.push(ys[i]);
        if d < err {
            i += 1;
        }
        i += 1;
    }
    let xmin = xs_new.iter().cloned().fold(f64::INFINITY, f64::min);
    let xmax = xs_new.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let ymin = ys_new.iter().cloned().fold(f64::INFINITY, f64::min);
    let ymax = ys_new.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if xmax - xmin < min_box && ymax - ymin < min_box {
        None
    } else {
        Some((xs_new, ys_new))
    }
}

/// Test a candidate center against the point set: every rim distance of
/// at least `min_dist` must stay within `coef` of the mean radius, and
/// the mean radius must reach `min_radius`. Returns the mean fit error.
fn center_fit(
    xs: &[f64],
    ys: &[f64],
    xc: f64,
    yc: f64,
    coef: f64,
    min_radius: f64,
    min_dist: f64,
) -> Option<f64> {
    let mut dists = Vec::new();
    let mut sum = 0.0;
    for i in 0..xs.len() {
        let d = ((xs[i] - xc).powi(2) + (ys[i] - yc).powi(2)).sqrt();
        if d < min_dist {
            continue;
        }
        sum += d;
        dists.push(d);
    }
    if dists.is_empty() {
        return None;
    }
    let mean = sum / dists.len() as f64;
    if mean < min_radius {
        return None;
    }
    let mut err = 0.0;
    for d in &dists {
        let e = (d - mean).abs();
        if e >= coef * mean {
            return None;
        }
        err += e;
    }
    Some(err / dists.len() as f64)
}

/// Accumulate a ring's span over its Bézier chord pairs around a center.
fn ring_arc_info(chords: &[Point], center: Point) -> WedgeGeom {
    let err = 1e-2 * 1e-2;
    let mut out = WedgeGeom {
        center,
        ..WedgeGeom::default()
    };
    let mut r_sum = 0.0;
    let mut count = 0usize;
    let mut first = true;
    for i in 0..chords.len() / 2 {
        let p1 = chords[2 * i];
        let p2 = chords[2 * i + 1];
        let d1 = (p1.x - center.x).powi(2) + (p1.y - center.y).powi(2);
        let d2 = (p2.x - center.x).powi(2) + (p2.y - center.y).powi(2);
        if d1 < err || d2 < err {
            continue;
        }
        let sub = compute_wedge(center, p1, p2);
        out.angle += sub.angle;
        r_sum += sub.radius;
        count += 1;
        if first {
            out.start_angle = sub.start_angle;
            first = false;
        }
        out.end_angle = sub.end_angle;
    }
    if count > 0 {
        out.radius = r_sum / count as f64;
    }
    out
}

/// Stateful wedge accumulator for one chart.
///
/// Feed every candidate path through [`ArcReconstructor::offer`]; paths
/// it consumes produce no [`ChartPathInfo`](crate::chart::ChartPathInfo)
/// record. Call [`ArcReconstructor::finish`] once the chart's paths are
/// exhausted.
pub struct ArcReconstructor {
    cfg: ClassifierConfig,
    working: Vec<ArcObject>,
    triangles: Vec<ArcObject>,
    pies: Vec<Pie>,
}

impl ArcReconstructor {
    /// Create an empty reconstructor.
    pub fn new(cfg: &ClassifierConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            working: Vec::new(),
            triangles: Vec::new(),
            pies: Vec::new(),
        }
    }

    /// True when any wedge was seen (used for type-consistency gating).
    pub fn has_wedges(&self) -> bool {
        !self.working.is_empty() || !self.triangles.is_empty() || !self.pies.is_empty()
    }

    /// Offer a path; returns true when it was consumed as arc geometry.
    pub fn offer(&mut self, path: &Path, color: Color) -> bool {
        if let Some(geom) = parse_wedge(path, &self.cfg) {
            self.working.push(make_arc(geom, color, path));
            return true;
        }
        if let Some(geom) = triangle_wedge(path, self.cfg.eps.delta) {
            self.triangles.push(make_arc(geom, color, path));
            return true;
        }
        if self.offer_ring(path, color) {
            return true;
        }
        if self.offer_donut_fill(path) {
            return true;
        }
        self.is_circle_legend(path)
    }

    /// Ring segment: a closed curve path whose vertices share a center
    /// found among the ring's own points.
    fn offer_ring(&mut self, path: &Path, color: Color) -> bool {
        let arc_cfg = self.cfg.arc.clone();
        let bounds = match path.bounds() {
            Some(b) => b,
            None => return false,
        };
        if bounds.width < arc_cfg.ring_min_box && bounds.height < arc_cfg.ring_min_box {
            return false;
        }
        let mut ring = match ring_points(path) {
            Some(r) => r,
            None => return false,
        };
        if !ring.has_curve {
            return false;
        }
        let (xs, ys) = match normalize_ring(&mut ring.xs, &mut ring.ys, arc_cfg.ring_min_box) {
            Some(v) => v,
            None => return false,
        };

        // candidate centers among the ring's own vertices
        let mut candidates: Vec<(usize, f64)> = Vec::new();
        for i in 0..xs.len() {
            if let Some(err) = center_fit(
                &xs,
                &ys,
                xs[i],
                ys[i],
                arc_cfg.grouped_center_coef,
                arc_cfg.ring_min_radius,
                arc_cfg.min_center_dist,
            ) {
                candidates.push((i, err));
            }
        }
        if candidates.is_empty() {
            return false;
        }

        // a candidate far from every accumulated wedge while the spans
        // already sum to a full circle means a second pie begins here
        if !self.working.is_empty() {
            let total: f64 = self.working.iter().map(|a| a.angle).sum();
            if (total - 2.0 * PI).abs() < arc_cfg.pie_completion_tol {
                let c = Point::new(xs[candidates[0].0], ys[candidates[0].0]);
                let all_far = self
                    .working
                    .iter()
                    .all(|a| c.distance_to(&a.center) > a.radius);
                if all_far {
                    self.snapshot_pie();
                }
            }
        }

        let pos = if self.working.is_empty() {
            candidates
                .iter()
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|&(i, _)| i)
        } else {
            candidates
                .iter()
                .min_by(|a, b| {
                    let sum = |i: usize| {
                        let p = Point::new(xs[i], ys[i]);
                        self.working
                            .iter()
                            .map(|arc| {
                                (p.x - arc.center.x).powi(2) + (p.y - arc.center.y).powi(2)
                            })
                            .sum::<f64>()
                    };
                    sum(a.0)
                        .partial_cmp(&sum(b.0))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|&(i, _)| i)
        };
        let pos = match pos {
            Some(p) => p,
            None => return false,
        };

        let center = Point::new(xs[pos], ys[pos]);
        let geom = ring_arc_info(&ring.chord_pairs, center);
        if geom.angle <= 0.0 {
            return false;
        }
        self.working.push(make_arc(geom, color, path));
        true
    }

    /// Donut hole: a full circle filled over an accumulated wedge set
    /// relabels those wedges as ring parts.
    fn offer_donut_fill(&mut self, path: &Path) -> bool {
        let arc_cfg = &self.cfg.arc;
        if self.working.len() <= 1 {
            return false;
        }
        let bounds = match path.bounds() {
            Some(b) => b,
            None => return false,
        };
        if bounds.width < arc_cfg.ring_min_box && bounds.height < arc_cfg.ring_min_box {
            return false;
        }

        let mut merged = match self.working[0].path.bounds() {
            Some(b) => b,
            None => return false,
        };
        let mut cx = 0.0;
        let mut cy = 0.0;
        for arc in &self.working {
            if let Some(b) = arc.path.bounds() {
                merged = merged.union(&b);
            }
            cx += arc.center.x;
            cy += arc.center.y;
        }
        let n = self.working.len() as f64;
        cx /= n;
        cy /= n;
        if !merged.contains_rect(&bounds) {
            return false;
        }

        let ring = match ring_points(path) {
            Some(r) => r,
            None => return false,
        };
        if ring.has_line || !ring.has_curve {
            return false;
        }

        let xc = ring.xs.iter().sum::<f64>() / ring.xs.len() as f64;
        let yc = ring.ys.iter().sum::<f64>() / ring.ys.len() as f64;
        let dist = ((cx - xc).powi(2) + (cy - yc).powi(2)).sqrt();
        if dist > arc_cfg.donut_centroid_coef * (merged.width + merged.height) {
            return false;
        }
        if center_fit(
            &ring.xs,
            &ring.ys,
            cx,
            cy,
            arc_cfg.ring_center_coef,
            arc_cfg.ring_min_radius,
            arc_cfg.min_center_dist,
        )
        .is_none()
        {
            return false;
        }
        let info = ring_arc_info(&ring.chord_pairs, Point::new(cx, cy));
        if info.angle < 2.0 * PI - arc_cfg.pie_completion_tol {
            return false;
        }

        debug!("donut hole detected, relabeling {} wedges", self.working.len());
        for arc in &mut self.working {
            arc.is_pie_slice = false;
        }
        true
    }

    /// Small full-circle curve path: a circular legend icon, consumed
    /// without producing a wedge.
    fn is_circle_legend(&self, path: &Path) -> bool {
        let arc_cfg = &self.cfg.arc;
        let bounds = match path.bounds() {
            Some(b) => b,
            None => return false,
        };
        let (lo, hi) = arc_cfg.legend_ring_box;
        if bounds.width > hi || bounds.width < lo || bounds.height > hi || bounds.height < lo {
            return false;
        }
        let ring = match ring_points(path) {
            Some(r) => r,
            None => return false,
        };
        let n = ring.xs.len();
        if n <= 4 || n >= 8 {
            return false;
        }
        if ring.has_line || !ring.has_curve {
            return false;
        }
        let c = bounds.center();
        if center_fit(
            &ring.xs,
            &ring.ys,
            c.x,
            c.y,
            arc_cfg.legend_ring_center_coef,
            arc_cfg.legend_ring_min_radius,
            arc_cfg.min_center_dist,
        )
        .is_none()
        {
            return false;
        }
        let info = ring_arc_info(&ring.chord_pairs, c);
        info.angle >= 2.0 * PI - arc_cfg.pie_completion_tol
    }

    /// Snapshot the working wedges as a completed pie, dropping any prior
    /// pie centered inside the new one (a re-drawn chart).
    fn snapshot_pie(&mut self) {
        if self.working.is_empty() {
            return;
        }
        let mut parts: Vec<ArcObject> = self.working.drain(..).collect();
        for part in &mut parts {
            part.weight = part.angle / (2.0 * PI);
        }
        let new_center = parts[0].center;
        let new_radius = parts[0].radius;
        self.pies.retain(|pie| match pie.parts.first() {
            Some(first) => {
                first.center.distance_to(&new_center)
                    >= self.cfg.arc.duplicate_pie_coef * new_radius
            }
            None => false,
        });
        self.pies.push(Pie { parts });
    }

    /// Do the accumulated wedges (plus absorbed sliver triangles) form
    /// one pie? Absorbs qualifying triangles into `working` on success.
    fn working_is_pie(&mut self) -> bool {
        let arc_cfg = self.cfg.arc.clone();
        let n = self.working.len();
        if n <= 1 {
            return false;
        }
        let nf = n as f64;
        let mean_r = self.working.iter().map(|a| a.radius).sum::<f64>() / nf;
        let cx = self.working.iter().map(|a| a.center.x).sum::<f64>() / nf;
        let cy = self.working.iter().map(|a| a.center.y).sum::<f64>() / nf;
        let mean_c = Point::new(cx, cy);

        let mut var_r = 0.0;
        for arc in &self.working {
            var_r += (arc.radius - mean_r).powi(2);
            if arc.center.distance_to(&mean_c) > arc_cfg.center_cluster_coef * mean_r {
                return false;
            }
        }
        if (var_r / nf).sqrt() >= arc_cfg.radius_stddev_coef * mean_r {
            return false;
        }

        for tri in &self.triangles {
            let coef = tri.radius / mean_r;
            if tri.center.distance_to(&mean_c) > arc_cfg.center_cluster_coef * mean_r
                || coef > arc_cfg.triangle_radius_ratio.1
                || coef < arc_cfg.triangle_radius_ratio.0
            {
                return false;
            }
        }
        let mut tris = std::mem::take(&mut self.triangles);
        self.working.append(&mut tris);
        true
    }

    /// Finalize: every previously snapshotted pie must still qualify, and
    /// a qualifying working set becomes the last pie. Returns the pies,
    /// or an empty list when the wedges never formed one.
    pub fn finish(mut self) -> Vec<Pie> {
        // saved pies each re-validated as a unit
        for pie in &self.pies {
            if pie.parts.len() <= 1 {
                return Vec::new();
            }
        }
        if !self.working.is_empty() {
            if self.working_is_pie() {
                self.snapshot_pie();
            } else if self.pies.is_empty() {
                return Vec::new();
            }
        }
        self.pies
    }
}

fn make_arc(geom: WedgeGeom, color: Color, path: &Path) -> ArcObject {
    ArcObject::new(
        geom.center,
        geom.radius,
        geom.angle,
        geom.start_angle,
        geom.end_angle,
        color,
        path.clone(),
    )
}
