//! Fragment merging and duplicate suppression.
//!
//! Series often arrive split across many paint operations: a polyline per
//! page band, a rectangle per bar, a boundary stroke duplicating a fill.
//! The merger stitches same-series fragments back together, drops
//! boundary duplicates and annotation boxes, re-validates records that
//! never matched a legend, and purges everything left `Unknown`.

use log::debug;

use crate::chart::{Chart, ChartPathInfo, ChartType, PathKind};
use crate::classify::bars::bar_center_records;
use crate::classify::scale::line_points;
use crate::config::ClassifierConfig;
use crate::geometry::{Path, PathSegment, Rect};

/// X-overlap test: two boxes overlap when the shared x-interval exceeds
/// `coef` of the mean width, or of either individual width (unless that
/// width is negligible next to the mean).
fn overlap_x(a: &Rect, b: &Rect, coef: f64) -> bool {
    if b.right() <= a.left() - 1.0 || b.left() >= a.right() + 1.0 {
        return false;
    }
    let dx = a.right().min(b.right()) - a.left().max(b.left());
    let mean = 0.5 * (a.width + b.width);
    dx / mean > coef
        || (dx / a.width > coef && a.width >= 0.1 * mean)
        || (dx / b.width > coef && b.width >= 0.1 * mean)
}

fn points_equal(a: &[(f64, f64)], b: &[(f64, f64)], eps: f64) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(p, q)| (p.0 - q.0).abs() < eps && (p.1 - q.1).abs() < eps)
}

fn path_points(path: &Path, eps: f64) -> Vec<(f64, f64)> {
    line_points(path, None, eps)
        .map(|p| p.xs.iter().cloned().zip(p.ys.iter().cloned()).collect())
        .unwrap_or_default()
}

/// Is one path's point sequence a sub-sequence of the other's?
pub fn is_overlay(path_a: &Path, path_b: &Path, eps: f64) -> bool {
    let a = path_points(path_a, eps);
    let b = path_points(path_b, eps);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (small, large) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if small.len() == large.len() {
        return points_equal(small, large, eps);
    }
    let diff = large.len() - small.len();
    for off in 0..diff {
        if (small[0].0 - large[off].0).abs() < eps && (small[0].1 - large[off].1).abs() < eps {
            return points_equal(small, &large[off..off + small.len()], eps);
        }
    }
    false
}

fn append_path(dst: &mut ChartPathInfo, src: &ChartPathInfo) {
    dst.path.extend(&src.path);
}

/// Stitch same-color same-kind line/curve fragments whose endpoints are
/// within the continuity gap. Exact overlays drop the smaller fragment;
/// pairs overlapping more than the x-overlap coefficient are parallel
/// series and stay separate. Runs until no merge applies.
pub fn continuity_merge(records: &mut Vec<ChartPathInfo>, cfg: &ClassifierConfig) {
    enum Action {
        Drop(usize),
        Merge(usize, usize),
    }
    let eps = cfg.eps.delta;
    loop {
        let mut action: Option<Action> = None;
        'outer: for i in 0..records.len() {
            if records[i].kind != PathKind::Line && records[i].kind != PathKind::Curve {
                continue;
            }
            for j in i + 1..records.len() {
                if records[j].kind != records[i].kind || records[j].color != records[i].color {
                    continue;
                }
                if is_overlay(&records[i].path, &records[j].path, eps) {
                    let na = records[i].path.point_count();
                    let nb = records[j].path.point_count();
                    action = Some(Action::Drop(if na >= nb { j } else { i }));
                    break 'outer;
                }
                let (box_a, box_b) = match (records[i].path.bounds(), records[j].path.bounds()) {
                    (Some(x), Some(y)) => (x, y),
                    _ => continue,
                };
                if overlap_x(&box_a, &box_b, cfg.merge.overlap_x_coef) {
                    continue;
                }
                // earlier fragment by x-center absorbs the later one
                let (dst, src) = if box_a.center().x <= box_b.center().x {
                    (i, j)
                } else {
                    (j, i)
                };
                let reachable = match (records[dst].path.last_point(), records[src].path.first_point())
                {
                    (Some(t), Some(h)) => {
                        (t.x - h.x).abs() + (t.y - h.y).abs() <= cfg.merge.continuity_gap
                    }
                    _ => false,
                };
                if !reachable {
                    continue;
                }
                action = Some(Action::Merge(dst, src));
                break 'outer;
            }
        }
        match action {
            Some(Action::Drop(k)) => {
                records[k].kind = PathKind::Unknown;
                debug!("dropped overlaid line fragment");
            }
            Some(Action::Merge(dst, src)) => {
                let fragment = records[src].clone();
                append_path(&mut records[dst], &fragment);
                records[src].kind = PathKind::Unknown;
                debug!("merged line fragment into neighbor");
            }
            None => break,
        }
    }
}

/// Drop boundary duplicates among same-color different-kind pairs: a
/// pointwise-equal pair loses its `Line`-typed member, an `Area` beats
/// its boundary, dash/horizontal-rule records wait for legend matching.
pub fn filter_invalid_pairs(records: &mut Vec<ChartPathInfo>, cfg: &ClassifierConfig) {
    if records.len() <= 1 {
        return;
    }
    let eps = cfg.eps.delta;
    loop {
        let mut found: Option<usize> = None;
        'outer: for i in 0..records.len() {
            if records[i].kind == PathKind::Unknown {
                continue;
            }
            for j in i + 1..records.len() {
                if records[j].kind == PathKind::Unknown
                    || records[i].color != records[j].color
                    || records[i].kind == records[j].kind
                {
                    continue;
                }
                let a = path_points(&records[i].path, eps);
                let b = path_points(&records[j].path, eps);
                let n = a.len().min(b.len());
                let diff = a.len().abs_diff(b.len());
                let same = diff < cfg.merge.point_count_diff as usize
                    && points_equal(&a[..n], &b[..n], eps);
                if same {
                    found = Some(if records[i].kind == PathKind::Line { i } else { j });
                    break 'outer;
                }
                if records[i].kind == PathKind::Area {
                    found = Some(j);
                    break 'outer;
                }
                if records[j].kind == PathKind::Area {
                    found = Some(i);
                    break 'outer;
                }
                let deferred = [PathKind::HorizonLongLine, PathKind::DashLine];
                if deferred.contains(&records[i].kind) || deferred.contains(&records[j].kind) {
                    continue;
                }
                found = Some(j);
                break 'outer;
            }
        }
        match found {
            Some(idx) => {
                records.remove(idx);
            }
            None => break,
        }
    }
}

/// A labeled bar record paired with a same-label line whose every
/// rectangle is mostly covered by text is an annotation box, not data.
pub fn drop_text_covered_bars(chart: &mut Chart, cfg: &ClassifierConfig) {
    let eps = cfg.eps.delta;
    let n = chart.path_infos.len();
    for i in 0..n {
        for j in i + 1..n {
            let (a, b) = (&chart.path_infos[i], &chart.path_infos[j]);
            if a.kind == PathKind::Unknown
                || b.kind == PathKind::Unknown
                || a.kind == b.kind
                || a.label != b.label
                || a.label.is_empty()
            {
                continue;
            }
            let bar_idx = if a.is_line_kind() && b.is_bar_kind() {
                j
            } else if a.is_bar_kind() && b.is_line_kind() {
                i
            } else {
                continue;
            };
            let rects = bar_center_records(&chart.path_infos[bar_idx].path, eps);
            if rects.is_empty() {
                continue;
            }
            let covered = rects.iter().all(|r| {
                let rect = Rect::new(r.cx - 0.5 * r.w, r.cy - 0.5 * r.h, r.w, r.h);
                let area: f64 = chart
                    .text_boxes
                    .iter()
                    .filter(|t| rect.intersects(t))
                    .map(|t| t.area())
                    .sum();
                area >= cfg.merge.text_cover_ratio * r.w * r.h
            });
            if covered {
                debug!("labeled bar covered by text, treating as annotation");
                chart.path_infos[bar_idx].kind = PathKind::Unknown;
            }
        }
    }
}

/// Count complete MoveTo-delimited runs that are pure vertical lines.
/// Only runs closed by a following MoveTo count; mixed-x runs or any
/// curve/close disqualify the whole path.
fn multi_vertical_line(path: &Path) -> bool {
    let mut runs = 0usize;
    let mut run_len = 0usize;
    let mut run_x: Option<f64> = None;
    let mut seen_move = false;
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) => {
                if seen_move {
                    if run_x.is_some() && run_len >= 2 {
                        runs += 1;
                    }
                }
                seen_move = true;
                run_x = Some(p.x);
                run_len = 1;
            }
            PathSegment::LineTo(p) => {
                match run_x {
                    Some(x) if (x - p.x).abs() > 1e-6 => return false,
                    _ => {}
                }
                run_len += 1;
            }
            _ => return false,
        }
    }
    if path.key_points().len() <= 3 {
        return false;
    }
    runs >= 2
}

/// Re-validate unlabeled line records: degenerate extents, excessive
/// x-coverage (the path doubles back), or a multi-vertical-rule path
/// demote the record to `Unknown`.
pub fn validate_unlabeled_line(chart: &Chart, info: &mut ChartPathInfo, cfg: &ClassifierConfig) {
    let bounds = match info.path.bounds() {
        Some(b) => b,
        None => {
            info.kind = PathKind::Unknown;
            return;
        }
    };
    if bounds.width < cfg.line.unlabeled_min_frac * chart.width()
        || bounds.height < cfg.line.unlabeled_min_frac * chart.height()
    {
        info.kind = PathKind::Unknown;
        return;
    }
    let pts = match line_points(&info.path, chart.h_axis.as_ref(), cfg.eps.delta) {
        Some(p) => p,
        None => {
            info.kind = PathKind::Unknown;
            return;
        }
    };
    let len: f64 = pts.xs.windows(2).map(|w| (w[0] - w[1]).abs()).sum();
    if len > cfg.line.unlabeled_fold_ratio * bounds.width {
        info.kind = PathKind::Unknown;
        return;
    }
    if multi_vertical_line(&info.path) {
        info.kind = PathKind::Unknown;
    }
}

/// Re-validate unlabeled bar records: stray single rectangles and
/// axis-detached uniform sets are fill-drawn rules, not data.
pub fn validate_unlabeled_bar(chart: &Chart, info: &mut ChartPathInfo, cfg: &ClassifierConfig) {
    let eps = cfg.eps.delta;
    let w = chart.width();
    let h = chart.height();
    let rects = bar_center_records(&info.path, eps);
    let n = rects.len();
    if n == 0 {
        info.kind = PathKind::Unknown;
        return;
    }
    if n == 1 {
        if chart.kind != ChartType::Column && info.kind == PathKind::Columnar {
            info.kind = PathKind::Unknown;
        }
        if rects[0].w < cfg.bar.unlabeled_min_frac * w || rects[0].h < cfg.bar.unlabeled_min_frac * h
        {
            info.kind = PathKind::Unknown;
        }
        return;
    }

    let mut same_w = true;
    let mut same_h = true;
    let mut start_axis = false;
    let tol = cfg.bar.axis_touch_tol;
    for i in 0..n - 1 {
        if (rects[i].w - rects[i + 1].w).abs() / w > cfg.bar.unlabeled_same_dim_frac {
            same_w = false;
        }
        if (rects[i].h - rects[i + 1].h).abs() / h > cfg.bar.unlabeled_same_dim_frac {
            same_h = false;
        }
        if info.kind == PathKind::Bar {
            if let Some(axis) = &chart.h_axis {
                let ymin = rects[i].cy - 0.5 * rects[i].h;
                let ymax = rects[i].cy + 0.5 * rects[i].h;
                if (ymin - axis.p1.y).abs() < tol || (ymax - axis.p1.y).abs() < tol {
                    start_axis = true;
                }
            }
        } else if info.kind == PathKind::Columnar {
            if let Some(axis) = &chart.lv_axis {
                let xmin = rects[i].cx - 0.5 * rects[i].w;
                let xmax = rects[i].cx + 0.5 * rects[i].w;
                if (xmin - axis.p1.x).abs() < tol || (xmax - axis.p1.x).abs() < tol {
                    start_axis = true;
                }
            }
        }
    }
    if (info.kind == PathKind::Bar && same_h && !start_axis)
        || (info.kind == PathKind::Columnar && same_w && !start_axis)
    {
        info.kind = PathKind::Unknown;
    }
}

/// Merge same-kind records whose colors are near misses (gradient fills)
/// when exactly one of the pair carries a legend label: overlaid lines
/// keep the labeled one, bars merge into the labeled record.
pub fn approximate_color_merge(records: &mut Vec<ChartPathInfo>, cfg: &ClassifierConfig) {
    let eps = cfg.eps.delta;
    let n = records.len();
    for i in 0..n {
        if records[i].kind == PathKind::Unknown {
            continue;
        }
        for j in i + 1..n {
            if records[i].kind == PathKind::Unknown {
                break;
            }
            if records[j].kind == PathKind::Unknown {
                continue;
            }
            let labeled_a = records[i].has_label();
            let labeled_b = records[j].has_label();
            if labeled_a == labeled_b || records[i].kind != records[j].kind {
                continue;
            }
            if records[i].color.channel_diff(&records[j].color) > cfg.merge.approx_color_tol {
                continue;
            }
            if records[j].is_line_kind() {
                if is_overlay(&records[i].path, &records[j].path, eps) {
                    let drop = if labeled_a { j } else { i };
                    records[drop].kind = PathKind::Unknown;
                }
            } else if records[j].is_bar_kind() {
                let (dst, src) = if labeled_a { (i, j) } else { (j, i) };
                let fragment = records[src].clone();
                append_path(&mut records[dst], &fragment);
                records[src].kind = PathKind::Unknown;
            }
        }
    }
}

/// Run the full merge pipeline and purge: stitch fragments, drop
/// boundary duplicates and annotations, re-validate unlabeled records,
/// reconcile near-miss colors, remove every `Unknown`, and downgrade a
/// non-pie chart left without records.
pub fn merge_fragments(chart: &mut Chart, cfg: &ClassifierConfig) {
    continuity_merge(&mut chart.path_infos, cfg);
    filter_invalid_pairs(&mut chart.path_infos, cfg);
    drop_text_covered_bars(chart, cfg);

    let snapshot = chart.clone();
    for info in chart.path_infos.iter_mut() {
        if info.kind == PathKind::Unknown || info.has_label() {
            continue;
        }
        if info.kind == PathKind::Line {
            validate_unlabeled_line(&snapshot, info, cfg);
        } else if info.is_bar_kind() {
            validate_unlabeled_bar(&snapshot, info, cfg);
        }
    }

    approximate_color_merge(&mut chart.path_infos, cfg);

    chart.path_infos.retain(|p| p.kind != PathKind::Unknown);
    if chart.kind != ChartType::Pie && chart.path_infos.is_empty() {
        chart.kind = ChartType::Unknown;
    }
}
