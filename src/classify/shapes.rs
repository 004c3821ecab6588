//! Shape predicates over raw paths.
//!
//! Every test here is chart-relative: thresholds scale with the owning
//! chart's width and height, taken from [`ClassifierConfig`]. A failed
//! test returns `false`/`None` — "not this shape" is never an error.

use log::debug;

use crate::config::ClassifierConfig;
use crate::geometry::obb::min_oriented_box;
use crate::geometry::{Line, Path, PathSegment, Point, Rect, SegKind};

/// Verdict of the columnar acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnarVerdict {
    /// The path is a bar/column series record.
    Accept,
    /// Too small to decide now; defer to the chart's candidate stash.
    Stash,
    /// Not a bar shape.
    Reject,
}

fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// Collect the axis-aligned rectangles of a bar path.
///
/// Bar paths are runs of four-point closed sub-paths. A MoveTo may only
/// open a fresh run; a repeated first point drawn as a LineTo is skipped;
/// each completed run must close up as a rectangle (consecutive corners
/// share an x or a y, wrap pair included). Zero-extent runs are tolerated
/// individually but an all-degenerate path fails, as do adjacent runs
/// differing by more than the configured factor in both dimensions.
pub fn collect_bar_rects(path: &Path, cfg: &ClassifierConfig) -> Option<Vec<Rect>> {
    let eps = cfg.eps.delta;
    let ratio = cfg.bar.adjacent_dim_ratio;
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    let mut count = 0usize;
    let mut invalid_runs = 0usize;
    let mut in_run = false;
    let mut has_close = false;
    let (mut w, mut h) = (0.0f64, 0.0f64);

    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                if count % 4 != 0 {
                    return None;
                }
                xs.push(p.x);
                ys.push(p.y);
                in_run = true;
                count += 1;
            }
            PathSegment::LineTo(p) => {
                if count % 4 == 0 {
                    let n = xs.len();
                    // a redrawn first corner is noise, not a new run
                    if n >= 4 && approx(xs[n - 4], p.x, eps) && approx(ys[n - 4], p.y, eps) {
                        continue;
                    }
                    return None;
                }
                xs.push(p.x);
                ys.push(p.y);
                count += 1;
            }
            PathSegment::Close => {
                has_close = true;
                if count % 4 != 0 {
                    return None;
                }
                if !in_run {
                    continue;
                }
                if !last_four_rectangular(&xs, &ys, eps) {
                    return None;
                }
                let n = xs.len();
                let wnew = (xs[n - 4] - xs[n - 2]).abs();
                let hnew = (ys[n - 4] - ys[n - 2]).abs();
                if approx(wnew, 0.0, eps) || approx(hnew, 0.0, eps) {
                    invalid_runs += 1;
                }
                if n / 4 >= 2
                    && (wnew > ratio * w || w > ratio * wnew)
                    && (hnew > ratio * h || h > ratio * hnew)
                {
                    return None;
                }
                w = wnew;
                h = hnew;
                in_run = false;
            }
            PathSegment::CurveTo(..) => return None,
        }
    }

    let n = xs.len();
    if n == 0 || n % 4 != 0 {
        return None;
    }
    if n == 4 && !has_close && !last_four_rectangular(&xs, &ys, eps) {
        return None;
    }
    if n / 4 == invalid_runs {
        return None;
    }

    let mut rects = Vec::with_capacity(n / 4);
    for i in 0..n / 4 {
        let gx = &xs[4 * i..4 * i + 4];
        let gy = &ys[4 * i..4 * i + 4];
        let xmin = gx.iter().cloned().fold(f64::INFINITY, f64::min);
        let xmax = gx.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let ymin = gy.iter().cloned().fold(f64::INFINITY, f64::min);
        let ymax = gy.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        rects.push(Rect::from_points(xmin, ymin, xmax, ymax));
    }
    Some(rects)
}

fn last_four_rectangular(xs: &[f64], ys: &[f64], eps: f64) -> bool {
    let n = xs.len();
    if n < 4 {
        return false;
    }
    let pair = |i: usize, j: usize| approx(xs[i], xs[j], eps) || approx(ys[i], ys[j], eps);
    pair(n - 4, n - 3) && pair(n - 3, n - 2) && pair(n - 2, n - 1) && pair(n - 4, n - 1)
}

/// True when the whole path is a single axis-aligned rectangle.
pub fn is_rectangle(path: &Path, cfg: &ClassifierConfig) -> bool {
    matches!(collect_bar_rects(path, cfg), Some(ref rects) if rects.len() == 1)
}

/// Decide whether a rectangle set is a bar series, a deferred candidate,
/// or not a bar shape at all.
pub fn accept_columnar(rects: &[Rect], chart_area: &Rect, cfg: &ClassifierConfig) -> ColumnarVerdict {
    let cw = chart_area.width;
    let ch = chart_area.height;
    let bar = &cfg.bar;
    let n = rects.len();
    if n == 0 {
        return ColumnarVerdict::Reject;
    }

    let xmin = rects.iter().map(|r| r.left()).fold(f64::INFINITY, f64::min);
    let xmax = rects.iter().map(|r| r.right()).fold(f64::NEG_INFINITY, f64::max);
    let ymin = rects.iter().map(|r| r.top()).fold(f64::INFINITY, f64::min);
    let ymax = rects.iter().map(|r| r.bottom()).fold(f64::NEG_INFINITY, f64::max);
    let pw = xmax - xmin;
    let ph = ymax - ymin;

    if n == 1 && pw >= bar.single_rect_max.0 * cw && ph >= bar.single_rect_max.1 * ch {
        return ColumnarVerdict::Reject;
    }
    if n == 1 && (pw < bar.single_rect_min.0 || ph < bar.single_rect_min.1) {
        return ColumnarVerdict::Reject;
    }
    // many_rect_count is calibrated in corner points, four per rectangle
    if 4 * n >= bar.many_rect_count && (pw < bar.many_rect_min.0 || ph < bar.many_rect_min.1) {
        return ColumnarVerdict::Reject;
    }
    if pw <= bar.small_rect_frac * cw && ph <= bar.small_rect_frac * ch {
        return ColumnarVerdict::Stash;
    }

    // mean extents per rectangle; a flat thin set with uniform widths is
    // usually gridwork, not data
    let nf = n as f64;
    let h_mean = rects.iter().map(|r| r.height).sum::<f64>() / nf;
    let w_mean = rects.iter().map(|r| r.width).sum::<f64>() / nf;
    let w_err = rects.iter().map(|r| (r.width - w_mean).abs()).sum::<f64>() / nf;
    if h_mean < bar.flat_mean_h_frac * ch && w_err < bar.flat_w_err_frac * cw {
        if ph > bar.flat_max_h_frac * ch || n >= bar.flat_max_count {
            return ColumnarVerdict::Reject;
        }
        if n == 1
            && w_mean > bar.wide_single_min_w_frac * cw
            && w_mean * h_mean > bar.wide_single_min_area_frac * cw * ch
        {
            return ColumnarVerdict::Accept;
        }
        return ColumnarVerdict::Stash;
    }

    ColumnarVerdict::Accept
}

/// Kind returned by the line test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    /// Polyline.
    Line,
    /// Pure Bézier chain.
    Curve,
}

/// Test whether a stroked path is a trend line or curve.
///
/// The bounding box must clear the minimum fractions unless the path is a
/// thin spike; a single segment jumping most of the chart width is a grid
/// or table rule; closed paths are outlines, not series.
pub fn is_line_or_curve(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> Option<LineVerdict> {
    let rect = path.bounds()?;
    let cw = chart_area.width;
    let ch = chart_area.height;
    let (pw, ph) = (rect.width, rect.height);
    let line = &cfg.line;

    let spike = (pw <= line.spike_thin_frac * cw && ph >= line.spike_long_frac * ch)
        || (ph <= line.spike_thin_frac * ch && pw >= line.spike_long_frac * cw);
    if !spike {
        if pw <= line.min_w_frac * cw {
            return None;
        }
        if ph <= line.min_h_frac * ch {
            return None;
        }
    }

    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    let mut has_segment = false;
    let mut has_curve = false;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                xs.push(p.x);
                ys.push(p.y);
            }
            PathSegment::LineTo(p) => {
                if let Some(&prev) = xs.last() {
                    if (p.x - prev).abs() >= line.max_x_jump_frac * cw {
                        return None;
                    }
                }
                xs.push(p.x);
                ys.push(p.y);
                has_segment = true;
            }
            PathSegment::CurveTo(c1, c2, e) => {
                if xs.is_empty() {
                    return None;
                }
                for p in [c1, c2, e] {
                    xs.push(p.x);
                    ys.push(p.y);
                }
                has_curve = true;
            }
            PathSegment::Close => return None,
        }
    }

    let n = xs.len();
    if n >= 2
        && approx(xs[0], xs[n - 1], cfg.eps.delta)
        && approx(ys[0], ys[n - 1], cfg.eps.delta)
    {
        return None;
    }
    if !has_segment && has_curve {
        Some(LineVerdict::Curve)
    } else {
        Some(LineVerdict::Line)
    }
}

/// Test whether a fill path is an area band under the horizontal axis.
///
/// Falls back to the chart's top edge when no axis is known yet. The band
/// boundaries are extracted with [`super::scale::band_points`]; the ring
/// they enclose must reach the minimum area and thickness.
pub fn is_area_fill(
    path: &Path,
    chart_area: &Rect,
    h_axis: Option<&Line>,
    cfg: &ClassifierConfig,
) -> bool {
    let rect = match path.bounds() {
        Some(r) => r,
        None => return false,
    };
    let cw = chart_area.width;
    let ch = chart_area.height;
    let area_cfg = &cfg.area;
    if rect.width <= area_cfg.min_w_frac * cw || rect.height <= area_cfg.min_h_frac * ch {
        return false;
    }
    let top_edge = Line::from_coords(
        chart_area.left(),
        chart_area.top(),
        chart_area.right(),
        chart_area.top(),
    );
    let axis = h_axis.copied().unwrap_or(top_edge);

    let band = match super::scale::band_points(path, &axis, cfg.eps.delta) {
        Some(b) => b,
        None => return false,
    };
    let n = band.xs.len();
    if n as u32 <= area_cfg.min_points {
        return false;
    }

    // walk out along the upper boundary and back along the lower to close
    // the ring, tracking the thickest column on the way
    let mut xs = band.xs.clone();
    let mut ys = band.ys_upper.clone();
    let mut max_band = 0.0f64;
    for i in (0..n).rev() {
        xs.push(band.xs[i]);
        ys.push(band.ys_lower[i]);
        max_band = max_band.max((band.ys_lower[i] - band.ys_upper[i]).abs());
    }
    xs.push(band.xs[0]);
    ys.push(band.ys_upper[0]);
    let ring_area = open_chain_area(&xs, &ys);
    if max_band < area_cfg.min_band_frac * ch {
        return false;
    }
    ring_area > area_cfg.min_area_frac * ch * cw
}

/// Shoelace sum over consecutive points only (no implicit closing edge).
fn open_chain_area(xs: &[f64], ys: &[f64]) -> f64 {
    let mut area = 0.0;
    for i in 0..xs.len().saturating_sub(1) {
        area += 0.5 * (xs[i] * ys[i + 1] - xs[i + 1] * ys[i]);
    }
    area.abs()
}

/// Legend swatch size test: the bounding box of a legend key is a narrow
/// band near the caption text.
pub fn is_legend_size(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> bool {
    let rect = match path.bounds() {
        Some(r) => r,
        None => return false,
    };
    let cw = chart_area.width;
    let ch = chart_area.height;
    let lg = &cfg.legend;
    rect.width <= lg.rect_w_frac.1 * cw
        && rect.width >= lg.rect_w_frac.0 * cw
        && rect.height <= lg.rect_max_h_frac * ch
}

/// Non-rectangular legend icon test (diamonds, circles, triangles): small
/// closed shape with exactly one closure, at the path end.
pub fn is_legend_icon_shape(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> bool {
    let rect = match path.bounds() {
        Some(r) => r,
        None => return false,
    };
    let lg = &cfg.legend;
    if rect.width >= lg.icon_max_w_frac * chart_area.width
        || rect.height >= lg.icon_max_h_frac * chart_area.height
    {
        return false;
    }
    let closes = path
        .segments
        .iter()
        .filter(|s| matches!(s, PathSegment::Close))
        .count();
    closes == 1 && matches!(path.segments.last(), Some(PathSegment::Close))
}

/// Split a fill path into dash blobs at every Close and measure each with
/// its minimum oriented box.
///
/// Returns the blob centroids, or `None` when any blob is too large to be
/// a dash (the path is then some other filled shape).
pub fn split_dash_blobs(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> Option<Vec<Point>> {
    let max_area = cfg.legend.dash_blob_max_area_frac * chart_area.area();
    let pts = path.key_points();
    let mut blob: Vec<Point> = Vec::new();
    let mut centroids = Vec::new();
    for i in 0..pts.len() {
        blob.push(pts.point(i));
        if pts.kinds[i] == SegKind::Close {
            let centroid = match min_oriented_box(&blob) {
                Some(obb) => {
                    if obb.area >= max_area {
                        return None;
                    }
                    obb.centroid()
                }
                // collinear blob: zero area, centroid is the point mean
                None => {
                    let n = blob.len() as f64;
                    Point::new(
                        blob.iter().map(|p| p.x).sum::<f64>() / n,
                        blob.iter().map(|p| p.y).sum::<f64>() / n,
                    )
                }
            };
            centroids.push(centroid);
            blob.clear();
        }
    }
    Some(centroids)
}

/// Dashed legend key: a small path whose dash-blob centroids sit on one
/// horizontal band.
pub fn is_dashed_legend(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> bool {
    if !is_legend_size(path, chart_area, cfg) {
        return false;
    }
    let mut pts = match split_dash_blobs(path, chart_area, cfg) {
        Some(p) => p,
        None => return false,
    };
    if pts.len() <= cfg.legend.dash_legend_max_blobs {
        return false;
    }
    pts.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    let y0 = pts[0].y;
    pts.iter().all(|p| (p.y - y0).abs() < cfg.legend.dash_band_coef)
}

/// Reassemble a dashed series line drawn as many small fill blobs.
///
/// Returns the centroid polyline on success.
pub fn is_filled_dash_line(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> Option<Path> {
    let rect = path.bounds()?;
    let cw = chart_area.width;
    let ch = chart_area.height;
    let line = &cfg.line;
    if rect.width <= line.filled_dash_min_w_frac * cw
        || rect.height < line.filled_dash_min_h_frac * ch
    {
        return None;
    }

    let mut pts = split_dash_blobs(path, chart_area, cfg)?;
    if pts.len() < cfg.legend.dash_line_min_blobs {
        return None;
    }

    // the lowest band of a grid spans the whole box; a series line does not
    pts.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal));
    let ymin = pts[0].y;
    let band = 0.05 * rect.height;
    let mut xmin = pts[0].x;
    let mut xmax = pts[0].x;
    for p in &pts {
        if p.y >= ymin - band && p.y <= ymin + band {
            xmin = xmin.min(p.x);
            xmax = xmax.max(p.x);
        }
    }
    if xmax - xmin >= line.filled_dash_spread * rect.width {
        return None;
    }

    pts.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    let mut out = Path::new().move_to(pts[0]);
    for p in &pts[1..] {
        out = out.line_to(*p);
    }
    debug!("reassembled dashed line from {} blobs", pts.len());
    Some(out)
}

/// Extract the centerline of a filled ribbon: a thick line drawn as a
/// long thin fill whose enclosed area is nearly zero.
///
/// The upper boundary is walked left-to-right from the leftmost to the
/// rightmost vertex (doubling the ring when the walk wraps), keeping
/// cubic control points, then smoothed so x advances monotonically.
pub fn is_filled_line(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> Option<Path> {
    let rect = path.bounds()?;
    let line = &cfg.line;
    if rect.width <= line.filled_min_w_frac * chart_area.width {
        return None;
    }

    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    let mut ctrls: Vec<Option<(Point, Point)>> = Vec::new();
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                if !xs.is_empty() {
                    return None;
                }
                xs.push(p.x);
                ys.push(p.y);
                ctrls.push(None);
            }
            PathSegment::LineTo(p) => {
                xs.push(p.x);
                ys.push(p.y);
                ctrls.push(None);
            }
            PathSegment::CurveTo(c1, c2, e) => {
                xs.push(e.x);
                ys.push(e.y);
                ctrls.push(Some((*c1, *c2)));
            }
            PathSegment::Close => {
                if xs.len() < line.filled_min_points {
                    return None;
                }
            }
        }
    }
    if xs.len() < line.filled_min_points {
        return None;
    }

    let area = open_chain_area(&xs, &ys);
    if area >= line.filled_max_area_frac * chart_area.area() {
        return None;
    }

    // locate the leftmost and rightmost vertices; double the ring when the
    // left-to-right walk wraps past the end
    let mut imin = 0usize;
    let mut imax = 0usize;
    for (i, &x) in xs.iter().enumerate() {
        if x < xs[imin] {
            imin = i;
        }
        if x > xs[imax] {
            imax = i;
        }
    }
    if imin > imax {
        imax += xs.len();
        let n = xs.len();
        for i in 0..n {
            xs.push(xs[i]);
            ys.push(ys[i]);
            ctrls.push(ctrls[i]);
        }
    }

    let mut chain = Path::new().move_to(Point::new(xs[imin], ys[imin]));
    for i in imin + 1..=imax {
        let end = Point::new(xs[i], ys[i]);
        chain = match ctrls[i] {
            Some((c1, c2)) => chain.curve_to(c1, c2, end),
            None => chain.line_to(end),
        };
    }
    Some(smooth_monotonic_x(&chain, line.smooth_step))
}

/// Drop vertices that do not advance x, keeping the polyline monotone so
/// downstream interpolation sees one y per x.
fn smooth_monotonic_x(path: &Path, step: f64) -> Path {
    let mut out = Path::new();
    let mut cur: Option<Point> = None;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                out = out.move_to(*p);
                cur = Some(*p);
            }
            PathSegment::LineTo(p) => {
                if let Some(c) = cur {
                    if p.x > c.x + step {
                        out = out.line_to(*p);
                        cur = Some(*p);
                    }
                }
            }
            PathSegment::CurveTo(c1, c2, e) => {
                if let Some(c) = cur {
                    if e.x > c.x {
                        out = out.curve_to(*c1, *c2, *e);
                        cur = Some(*e);
                    }
                }
            }
            PathSegment::Close => {}
        }
    }
    out
}

/// Full-extent grid test: strictly alternating MoveTo/LineTo segments,
/// aligned starts, equal lengths, even count.
pub fn is_axis_grid(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> bool {
    let rect = match path.bounds() {
        Some(r) => r,
        None => return false,
    };
    let frac = cfg.grid.grid_min_span_frac;
    if rect.width <= frac * chart_area.width || rect.height < frac * chart_area.height {
        return false;
    }

    let eps = cfg.eps.delta;
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    let mut count = 0usize;
    let mut istart = 0usize;
    let mut len_before = 0.0f64;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                if count >= 3 {
                    let n = xs.len();
                    if !approx(p.x, xs[n - 2], eps) && !approx(p.y, ys[n - 2], eps) {
                        return false;
                    }
                }
                xs.push(p.x);
                ys.push(p.y);
                istart = count;
                count += 1;
            }
            PathSegment::LineTo(p) => {
                if count - istart != 1 {
                    return false;
                }
                if count >= 3 {
                    let n = xs.len();
                    if !approx(p.x, xs[n - 2], eps) && !approx(p.y, ys[n - 2], eps) {
                        return false;
                    }
                }
                xs.push(p.x);
                ys.push(p.y);
                let len = (xs[count] - xs[count - 1]).abs() + (ys[count] - ys[count - 1]).abs();
                count += 1;
                if count >= 4 && !approx(len, len_before, eps) {
                    return false;
                }
                len_before = len;
            }
            _ => return false,
        }
    }
    count % 2 == 0 && count > 2
}

/// Axis tick test: short MoveTo/LineTo pairs hugging one chart edge.
///
/// Returns the per-pair tick segments on success so the caller can record
/// them as axis metadata.
pub fn is_axis_scale(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> Option<Vec<Line>> {
    let rect = path.bounds()?;
    let cw = chart_area.width;
    let ch = chart_area.height;
    let dim = cfg.grid.tick_max_dim_frac;
    // exactly one thin dimension
    if rect.width >= dim * cw && rect.height >= dim * ch {
        return None;
    }
    if rect.width < dim * cw && rect.height < dim * ch {
        return None;
    }

    let eps = cfg.eps.delta;
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    let mut count = 0usize;
    let mut istart = 0usize;
    let mut len_before = 0.0f64;
    let mut mismatches = 0usize;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                xs.push(p.x);
                ys.push(p.y);
                istart = count;
                count += 1;
            }
            PathSegment::LineTo(p) => {
                if count - istart != 1 {
                    return None;
                }
                xs.push(p.x);
                ys.push(p.y);
                let len = (xs[count] - xs[count - 1]).abs() + (ys[count] - ys[count - 1]).abs();
                count += 1;
                if len > cfg.grid.tick_max_len_frac * (cw + ch) {
                    return None;
                }
                if count >= 4 {
                    if !approx(len, len_before, eps) {
                        mismatches += 1;
                    }
                    // ticks on opposite axis sides may differ once
                    if mismatches >= 2 {
                        return None;
                    }
                }
                len_before = len;
            }
            _ => return None,
        }
    }
    if count % 2 != 0 || count <= 2 {
        return None;
    }
    let mut ticks = Vec::with_capacity(count / 2);
    for i in 0..count / 2 {
        ticks.push(Line::from_coords(
            xs[2 * i],
            ys[2 * i],
            xs[2 * i + 1],
            ys[2 * i + 1],
        ));
    }
    Some(ticks)
}

/// Long horizontal rule: every point on one y, spanning a good part of
/// the chart width.
pub fn is_horizon_long_line(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> bool {
    let pts = path.all_points();
    if pts.len() <= 1 {
        return false;
    }
    let y0 = pts[0].y;
    if !pts.iter().all(|p| (p.y - y0).abs() < cfg.eps.delta) {
        return false;
    }
    let len = pts[pts.len() - 1].x - pts[0].x;
    len >= cfg.line.horizon_min_len_frac * chart_area.width && len >= cfg.line.horizon_min_len_abs
}

/// Dashed axis-parallel stroke: many points, one Move then LineTo only,
/// hair-thin on one axis and long on the other.
pub fn is_special_dash_line(path: &Path, chart_area: &Rect, cfg: &ClassifierConfig) -> bool {
    if path.point_count() < cfg.line.dash_min_points {
        return false;
    }
    let rect = match path.bounds() {
        Some(r) => r,
        None => return false,
    };
    let cw = chart_area.width;
    let ch = chart_area.height;
    let line = &cfg.line;
    let valid = (rect.width <= line.dash_thin_frac * cw && rect.height >= line.dash_long_frac * ch)
        || (rect.width >= line.dash_long_frac * cw && rect.height <= line.dash_thin_frac * ch);
    if !valid {
        return false;
    }
    for (i, seg) in path.segments.iter().enumerate() {
        match seg {
            PathSegment::MoveTo(_) if i == 0 => {}
            PathSegment::LineTo(_) if i > 0 => {}
            _ => return false,
        }
    }
    true
}

/// Table test over collected grid candidates: every horizontal rule must
/// cross every vertical rule.
pub fn is_table_grid(lines: &[Line], eps: f64) -> bool {
    let (mut hs, mut vs): (Vec<&Line>, Vec<&Line>) = (Vec::new(), Vec::new());
    for line in lines {
        if line.is_horizontal(eps) {
            hs.push(line);
        } else {
            vs.push(line);
        }
    }
    if hs.len() <= 1 || vs.len() <= 1 {
        return false;
    }
    hs.iter()
        .all(|h| vs.iter().all(|v| h.orthogonal_to(v, false, eps)))
}

/// Extract grid-rule candidates from a stroked polyline.
///
/// `None` means the path is definitely not gridwork (a curve or a slanted
/// segment); an empty list means no usable rules (too short, or an
/// orthogonal adjacent pair that indicates a data polyline).
pub fn line_grid_candidates(path: &Path, cfg: &ClassifierConfig) -> Option<Vec<Line>> {
    let eps = cfg.eps.delta;
    let pts = path.extract_points(eps);
    if pts.len() < 2 {
        return Some(Vec::new());
    }
    if pts.kinds.iter().any(|&k| k == SegKind::Curve) {
        return None;
    }

    let mut lines: Vec<Line> = Vec::new();
    for i in 0..pts.len() - 1 {
        // a MoveTo opens a new sub-path; no rule spans the gap
        if pts.kinds[i + 1] == SegKind::Move {
            continue;
        }
        let p1 = pts.point(i);
        let p2 = pts.point(i + 1);
        let line = Line::new(p1, p2);
        if !line.is_horizontal(eps) && !line.is_vertical(eps) {
            return None;
        }
        if p1.distance_to(&p2) < cfg.grid.segment_min_len {
            return Some(Vec::new());
        }
        if let Some(prev) = lines.last() {
            if line.orthogonal_to(prev, true, eps) {
                return Some(Vec::new());
            }
        }
        lines.push(line);
    }
    Some(lines)
}

/// Extract grid-rule candidates from a rectangle set: degenerate thin
/// rectangles are drawn rules, real boxes are not.
pub fn columnar_grid_candidates(rects: &[Rect], cfg: &ClassifierConfig) -> Option<Vec<Line>> {
    let thin = cfg.grid.degenerate_rect_dim;
    let min_len = cfg.grid.segment_min_len;
    let mut lines = Vec::with_capacity(rects.len());
    for r in rects {
        if r.width > thin && r.height > thin {
            return None;
        }
        if r.width > r.height {
            if r.width < min_len {
                return None;
            }
            let y = r.center().y;
            lines.push(Line::from_coords(r.left(), y, r.right(), y));
        } else {
            if r.height < min_len {
                return None;
            }
            let x = r.center().x;
            lines.push(Line::from_coords(x, r.top(), x, r.bottom()));
        }
    }
    Some(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Path;

    fn cfg() -> ClassifierConfig {
        ClassifierConfig::new()
    }

    fn chart_area() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 300.0)
    }

    fn rect_path(rects: &[Rect]) -> Path {
        let mut path = Path::new();
        for r in rects {
            path = path.rect(r);
        }
        path
    }

    #[test]
    fn test_collect_bar_rects_single() {
        let r = Rect::new(10.0, 20.0, 15.0, 60.0);
        let rects = collect_bar_rects(&rect_path(&[r]), &cfg()).unwrap();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0], r);
    }

    #[test]
    fn test_collect_bar_rects_rejects_non_rect() {
        let path = Path::new()
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 5.0))
            .line_to(Point::new(20.0, 0.0))
            .line_to(Point::new(10.0, -5.0))
            .close();
        assert!(collect_bar_rects(&path, &cfg()).is_none());
    }

    #[test]
    fn test_collect_bar_rects_skips_redrawn_first_corner() {
        let path = Path::new()
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 0.0))
            .line_to(Point::new(10.0, 30.0))
            .line_to(Point::new(0.0, 30.0))
            .line_to(Point::new(0.0, 0.0))
            .close();
        let rects = collect_bar_rects(&path, &cfg()).unwrap();
        assert_eq!(rects.len(), 1);
    }

    #[test]
    fn test_collect_bar_rects_all_degenerate_fails() {
        let path = rect_path(&[Rect::new(0.0, 0.0, 10.0, 0.0), Rect::new(20.0, 0.0, 10.0, 0.0)]);
        assert!(collect_bar_rects(&path, &cfg()).is_none());
    }

    #[test]
    fn test_collect_bar_rects_wild_size_jump_fails() {
        let path = rect_path(&[
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(20.0, 0.0, 50.0, 80.0),
        ]);
        assert!(collect_bar_rects(&path, &cfg()).is_none());
    }

    #[test]
    fn test_accept_columnar_normal_bars() {
        let rects = vec![
            Rect::new(10.0, 100.0, 15.0, 80.0),
            Rect::new(40.0, 80.0, 15.0, 100.0),
            Rect::new(70.0, 120.0, 15.0, 60.0),
        ];
        assert_eq!(accept_columnar(&rects, &chart_area(), &cfg()), ColumnarVerdict::Accept);
    }

    #[test]
    fn test_accept_columnar_background_rejected() {
        let rects = vec![Rect::new(0.0, 0.0, 390.0, 290.0)];
        assert_eq!(accept_columnar(&rects, &chart_area(), &cfg()), ColumnarVerdict::Reject);
    }

    #[test]
    fn test_accept_columnar_small_set_stashed() {
        let rects = vec![Rect::new(10.0, 10.0, 6.0, 6.0), Rect::new(18.0, 10.0, 6.0, 6.0)];
        assert_eq!(accept_columnar(&rects, &chart_area(), &cfg()), ColumnarVerdict::Stash);
    }

    #[test]
    fn test_line_verdicts() {
        let line = Path::new()
            .move_to(Point::new(10.0, 100.0))
            .line_to(Point::new(120.0, 60.0))
            .line_to(Point::new(230.0, 140.0));
        assert_eq!(is_line_or_curve(&line, &chart_area(), &cfg()), Some(LineVerdict::Line));

        let curve = Path::new().move_to(Point::new(10.0, 100.0)).curve_to(
            Point::new(60.0, 40.0),
            Point::new(140.0, 40.0),
            Point::new(200.0, 100.0),
        );
        assert_eq!(is_line_or_curve(&curve, &chart_area(), &cfg()), Some(LineVerdict::Curve));
    }

    #[test]
    fn test_line_rejects_closed_and_jumps() {
        let closed = Path::new()
            .move_to(Point::new(10.0, 100.0))
            .line_to(Point::new(120.0, 60.0))
            .line_to(Point::new(10.0, 100.0));
        assert!(is_line_or_curve(&closed, &chart_area(), &cfg()).is_none());

        let jump = Path::new()
            .move_to(Point::new(0.0, 100.0))
            .line_to(Point::new(390.0, 120.0));
        assert!(is_line_or_curve(&jump, &chart_area(), &cfg()).is_none());
    }

    #[test]
    fn test_area_fill_band() {
        // staircase band over a bottom edge, wide and thick enough
        let mut upper = Path::new().move_to(Point::new(0.0, 100.0));
        for i in 1..=20 {
            let x = i as f64 * 15.0;
            let y = 100.0 + 10.0 * ((i % 4) as f64);
            upper = upper.line_to(Point::new(x, y));
        }
        for i in (0..=20).rev() {
            let x = i as f64 * 15.0;
            upper = upper.line_to(Point::new(x, 250.0));
        }
        let path = upper.close();
        let axis = Line::from_coords(0.0, 250.0, 300.0, 250.0);
        assert!(is_area_fill(&path, &chart_area(), Some(&axis), &cfg()));
    }

    #[test]
    fn test_axis_grid() {
        let mut path = Path::new();
        for i in 0..5 {
            let y = 30.0 + i as f64 * 60.0;
            path = path
                .move_to(Point::new(10.0, y))
                .line_to(Point::new(390.0, y));
        }
        // spans width but the grid needs height span too
        assert!(is_axis_grid(&path, &chart_area(), &cfg()));
        let single = Path::new()
            .move_to(Point::new(10.0, 30.0))
            .line_to(Point::new(390.0, 30.0));
        assert!(!is_axis_grid(&single, &chart_area(), &cfg()));
    }

    #[test]
    fn test_axis_scale_ticks() {
        let mut path = Path::new();
        for i in 0..6 {
            let x = 50.0 + i as f64 * 60.0;
            path = path
                .move_to(Point::new(x, 295.0))
                .line_to(Point::new(x, 300.0));
        }
        let ticks = is_axis_scale(&path, &chart_area(), &cfg()).unwrap();
        assert_eq!(ticks.len(), 6);
        assert!(ticks.iter().all(|t| t.is_vertical(0.1)));
    }

    #[test]
    fn test_horizon_long_line() {
        let path = Path::new()
            .move_to(Point::new(10.0, 150.0))
            .line_to(Point::new(200.0, 150.0));
        assert!(is_horizon_long_line(&path, &chart_area(), &cfg()));
        let short = Path::new()
            .move_to(Point::new(10.0, 150.0))
            .line_to(Point::new(18.0, 150.0));
        assert!(!is_horizon_long_line(&short, &chart_area(), &cfg()));
    }

    #[test]
    fn test_special_dash_line() {
        let mut path = Path::new().move_to(Point::new(100.0, 0.0));
        for i in 1..60 {
            path = path.line_to(Point::new(100.0, i as f64 * 5.0));
        }
        assert!(is_special_dash_line(&path, &chart_area(), &cfg()));
    }

    #[test]
    fn test_table_grid() {
        let lines = vec![
            Line::from_coords(0.0, 50.0, 300.0, 50.0),
            Line::from_coords(0.0, 150.0, 300.0, 150.0),
            Line::from_coords(50.0, 0.0, 50.0, 200.0),
            Line::from_coords(250.0, 0.0, 250.0, 200.0),
        ];
        assert!(is_table_grid(&lines, 0.1));
        assert!(!is_table_grid(&lines[..3], 0.1));
    }

    #[test]
    fn test_filled_line_centerline() {
        // thin closed ribbon around y=100, 2 units thick, 260 wide
        let mut path = Path::new().move_to(Point::new(20.0, 99.0));
        for i in 1..=12 {
            path = path.line_to(Point::new(20.0 + i as f64 * 21.6, 99.0));
        }
        for i in (0..=12).rev() {
            path = path.line_to(Point::new(20.0 + i as f64 * 21.6, 101.0));
        }
        let path = path.close();
        let center = is_filled_line(&path, &chart_area(), &cfg()).unwrap();
        // monotonic x
        let pts = center.all_points();
        assert!(pts.len() >= 2);
        for w in pts.windows(2) {
            assert!(w[1].x > w[0].x);
        }
    }

    #[test]
    fn test_dash_blob_split() {
        let mut path = Path::new();
        for i in 0..25 {
            let x = 10.0 + i as f64 * 12.0;
            path = path.rect(&Rect::new(x, 100.0 - (i % 5) as f64 * 4.0, 6.0, 2.0));
        }
        let blobs = split_dash_blobs(&path, &chart_area(), &cfg()).unwrap();
        assert_eq!(blobs.len(), 25);
        let dashed = is_filled_dash_line(&path, &chart_area(), &cfg());
        assert!(dashed.is_some());
    }

    #[test]
    fn test_legend_icon_shape() {
        let diamond = Path::new()
            .move_to(Point::new(10.0, 5.0))
            .line_to(Point::new(15.0, 10.0))
            .line_to(Point::new(10.0, 15.0))
            .line_to(Point::new(5.0, 10.0))
            .close();
        assert!(is_legend_icon_shape(&diamond, &chart_area(), &cfg()));
    }
}
