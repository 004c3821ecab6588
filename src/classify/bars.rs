//! Bar/column aggregation: rectangle extraction, direction, stacking,
//! table rejection, and deferred-candidate reconciliation.

use log::debug;

use crate::chart::{Chart, ChartPathInfo, ChartType, PathKind};
use crate::config::ClassifierConfig;
use crate::geometry::{Path, PathSegment, Rect};

/// One extracted bar rectangle: center plus extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// One aligned stack of rectangles: rectangles sharing a center
/// coordinate along the stacking axis.
#[derive(Debug, Clone)]
pub struct BarStack {
    /// Shared center coordinate.
    pub key: f64,
    /// Summed thickness along the value axis.
    pub len: f64,
    /// Member count.
    pub count: u32,
    /// Members matching the first member's color.
    pub same_color_count: u32,
    /// First member's color.
    pub color: crate::geometry::Color,
}

/// Extract the axis-aligned boxes of every rectangle run in a compound
/// bar path. A redrawn first corner is skipped; a run is flushed on
/// Close, on the MoveTo opening the next run, and at path end. Curves
/// end the walk with whatever was flushed so far.
pub fn column_boxes(path: &Path, eps: f64) -> Vec<Rect> {
    let mut out = Vec::new();
    let mut cxs: Vec<f64> = Vec::new();
    let mut cys: Vec<f64> = Vec::new();
    let mut flush = |cxs: &mut Vec<f64>, cys: &mut Vec<f64>, out: &mut Vec<Rect>| {
        if cxs.is_empty() {
            return;
        }
        let xmin = cxs.iter().cloned().fold(f64::INFINITY, f64::min);
        let xmax = cxs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let ymin = cys.iter().cloned().fold(f64::INFINITY, f64::min);
        let ymax = cys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        out.push(Rect::new(xmin, ymin, xmax - xmin, ymax - ymin));
        cxs.clear();
        cys.clear();
    };
    for seg in &path.segments {
        match seg {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => {
                if matches!(seg, PathSegment::MoveTo(_)) && cxs.len() == 4 {
                    flush(&mut cxs, &mut cys, &mut out);
                }
                let n = cxs.len();
                if n >= 4
                    && (cxs[n - 4] - p.x).abs() < eps
                    && (cys[n - 4] - p.y).abs() < eps
                {
                    continue;
                }
                cxs.push(p.x);
                cys.push(p.y);
            }
            PathSegment::Close => flush(&mut cxs, &mut cys, &mut out),
            PathSegment::CurveTo(..) => return out,
        }
    }
    if cxs.len() == 4 {
        flush(&mut cxs, &mut cys, &mut out);
    }
    out
}

/// Center/extent records of every rectangle in a bar path.
pub fn bar_center_records(path: &Path, eps: f64) -> Vec<BarRect> {
    column_boxes(path, eps)
        .iter()
        .map(|b| {
            let c = b.center();
            BarRect {
                cx: c.x,
                cy: c.y,
                w: b.width.abs(),
                h: b.height.abs(),
            }
        })
        .collect()
}

/// Are two rectangle sets stacked along the tested axis? A pair counts
/// when the tested-axis centers coincide, at least one extent matches,
/// and the center distance on the other axis equals half the summed
/// thickness (adjacency, not overlay).
pub fn records_stacked_along(a: &[BarRect], b: &[BarRect], test_x: bool, eps: f64) -> bool {
    for ra in a {
        for rb in b {
            let mut same_x = (ra.cx - rb.cx).abs() < eps;
            let mut same_y = (ra.cy - rb.cy).abs() < eps;
            if (ra.w - rb.w).abs() >= eps && (ra.h - rb.h).abs() >= eps {
                same_x = false;
                same_y = false;
            }
            let adjacent_y = (((ra.h + rb.h) / 2.0) - (ra.cy - rb.cy).abs()).abs() < eps;
            let adjacent_x = (((ra.w + rb.w) / 2.0) - (ra.cx - rb.cx).abs()).abs() < eps;
            if !adjacent_y && !adjacent_x {
                same_x = false;
                same_y = false;
            }
            if (test_x && same_x) || (!test_x && same_y) {
                return true;
            }
        }
    }
    false
}

/// Is the given deferred path stacked with any explicit bar record?
pub fn stacked_with_bars(chart: &Chart, path: &Path, eps: f64) -> bool {
    let imp = bar_center_records(path, eps);
    chart
        .path_infos
        .iter()
        .filter(|p| p.is_bar_kind())
        .any(|p| {
            let exp = bar_center_records(&p.path, eps);
            let test_x = p.kind == PathKind::Bar;
            records_stacked_along(&imp, &exp, test_x, eps)
        })
}

/// Direction vote by the largest rectangle: taller than wide means
/// vertical bars. Defaults to vertical when no rectangle is found.
fn max_area_vertical(records: &[ChartPathInfo], eps: f64) -> bool {
    let mut vertical = true;
    let mut area_max = -1.0;
    for info in records {
        if info.kind != PathKind::Columnar {
            continue;
        }
        for b in column_boxes(&info.path, eps) {
            let area = b.width * b.height;
            if area_max < area {
                area_max = area;
                vertical = b.width < b.height;
            }
        }
    }
    vertical
}

/// Direction vote by dimension spread: the value axis is the one whose
/// extents vary more, so a smaller width error means vertical bars.
fn vertical_by_dim_error(records: &[ChartPathInfo], eps: f64) -> bool {
    let mut widths = Vec::new();
    let mut heights = Vec::new();
    for info in records {
        if !info.is_bar_kind() {
            continue;
        }
        for r in bar_center_records(&info.path, eps) {
            widths.push(r.w);
            heights.push(r.h);
        }
    }
    let n = widths.len();
    if n <= 1 {
        return true;
    }
    let w_mean = widths.iter().sum::<f64>() / n as f64;
    let h_mean = heights.iter().sum::<f64>() / n as f64;
    let w_err: f64 = widths.iter().map(|w| (w - w_mean).abs()).sum();
    let h_err: f64 = heights.iter().map(|h| (h - h_mean).abs()).sum();
    w_err < h_err
}

/// Decide the bar direction over the record set.
pub fn bars_are_vertical(records: &[ChartPathInfo], eps: f64) -> bool {
    max_area_vertical(records, eps) || vertical_by_dim_error(records, eps)
}

/// Decide the direction and retype every `Columnar` record accordingly:
/// vertical sets become `Bar`, horizontal ones stay `Columnar`.
pub fn set_column_direction(records: &mut [ChartPathInfo], eps: f64) -> bool {
    let vertical = bars_are_vertical(records, eps);
    let kind = if vertical {
        PathKind::Bar
    } else {
        PathKind::Columnar
    };
    for info in records.iter_mut() {
        if info.kind == PathKind::Columnar {
            info.kind = kind;
        }
    }
    vertical
}

fn add_stack_info(
    stacks: &mut Vec<BarStack>,
    key: f64,
    len: f64,
    color: crate::geometry::Color,
    eps: f64,
) {
    for stack in stacks.iter_mut() {
        if (stack.key - key).abs() < eps {
            stack.len += len;
            stack.count += 1;
            if stack.color == color {
                stack.same_color_count += 1;
            }
            return;
        }
    }
    stacks.push(BarStack {
        key,
        len,
        count: 1,
        same_color_count: 0,
        color,
    });
}

/// Accumulate the per-orientation stacks over the bar records: vertical
/// bars stack by x-center weighted by height, horizontal ones by
/// y-center weighted by width.
pub fn build_stacks(
    records: &[ChartPathInfo],
    is_bar: bool,
    eps: f64,
) -> (Vec<BarStack>, Vec<BarStack>) {
    let mut v_stack: Vec<BarStack> = Vec::new();
    let mut h_stack: Vec<BarStack> = Vec::new();
    for info in records {
        if !info.is_bar_kind() {
            continue;
        }
        for r in bar_center_records(&info.path, eps) {
            if is_bar {
                add_stack_info(&mut h_stack, r.cx, r.h, info.color, eps);
            } else {
                add_stack_info(&mut v_stack, r.cy, r.w, info.color, eps);
            }
        }
    }
    (v_stack, h_stack)
}

/// Table rejection over an already bar/column-typed chart: a rectangle
/// grid masquerading as a bar chart fails one of the stack sanity tests.
pub fn stacking_invalid(chart: &Chart, cfg: &ClassifierConfig) -> bool {
    if chart.kind != ChartType::Bar && chart.kind != ChartType::Column {
        return false;
    }
    let is_bar = chart.kind == ChartType::Bar;
    let has_legend = !chart.legends.is_empty();
    let eps = cfg.eps.delta;
    let (v_stack, h_stack) = build_stacks(&chart.path_infos, is_bar, eps);

    if (is_bar && h_stack.len() <= 1) || (!is_bar && v_stack.len() <= 1) {
        return true;
    }
    let max_len_h = cfg.bar.stack_max_extent_frac * chart.height();
    let max_len_w = cfg.bar.stack_max_extent_frac * chart.width();
    let max_count = cfg.bar.stack_max_count;
    if h_stack.iter().any(|s| s.len > max_len_h || s.count >= max_count)
        || v_stack.iter().any(|s| s.len > max_len_w || s.count >= max_count)
    {
        debug!("bar stacks exceed the chart extent, rejecting as table");
        return true;
    }

    if !has_legend {
        let all_equal = |stacks: &[BarStack]| {
            stacks
                .first()
                .map_or(false, |f| stacks.iter().all(|s| (s.len - f.len).abs() < eps))
        };
        if all_equal(&v_stack) || all_equal(&h_stack) {
            return true;
        }
    }

    let mut n_bar = 0u32;
    let mut n_same = 0u32;
    let mut colors = Vec::new();
    for stack in v_stack.iter().chain(h_stack.iter()) {
        n_bar += stack.count;
        n_same += stack.same_color_count;
        if !colors.contains(&stack.color) {
            colors.push(stack.color);
        }
    }
    if n_bar == 0 {
        return false;
    }
    let coef = f64::from(n_same) / f64::from(n_bar);
    coef > cfg.bar.same_color_ratio
        || (colors.len() == 1
            && coef > cfg.bar.single_color_ratio
            && coef <= cfg.bar.same_color_ratio)
}

/// Do two boxes align edge to edge? Widths must agree within 0.2 and one
/// of the four horizontal edge pairs must coincide.
fn boxes_aligned(a: &Rect, b: &Rect, eps: f64) -> bool {
    if (a.width - b.width).abs() > 0.2 {
        return false;
    }
    let pairs = [
        a.top() - b.bottom(),
        a.top() - b.top(),
        a.bottom() - b.bottom(),
        a.bottom() - b.top(),
    ];
    pairs.iter().any(|d| d.abs() < eps)
}

/// Is the candidate's every consecutive rectangle edge-aligned with the
/// explicit bar set? Used to adopt deferred candidates that neither
/// touch an axis nor stack with an existing record.
pub fn aligned_with_bars(bars: &[ChartPathInfo], candidate: &ChartPathInfo, eps: f64) -> bool {
    if bars.is_empty() {
        return false;
    }
    let mut boxes: Vec<Rect> = Vec::new();
    for info in bars.iter().chain(std::iter::once(candidate)) {
        if !info.is_bar_kind() {
            return false;
        }
        boxes.extend(column_boxes(&info.path, eps));
    }
    if boxes.is_empty() {
        return false;
    }
    for pair in boxes.windows(2) {
        if !boxes_aligned(&pair[0], &pair[1], eps) {
            return false;
        }
    }
    true
}

/// Does any rectangle of the path sit flush against one of the chart's
/// axes (within 1% of the chart width)?
pub fn starts_from_axis(chart: &Chart, path: &Path, eps: f64) -> bool {
    let len_min = 0.01 * chart.width();
    let mut axes = Vec::new();
    if let Some(h) = &chart.h_axis {
        axes.push((h.p1.y, true));
    }
    if let Some(lv) = &chart.lv_axis {
        axes.push((lv.p1.x, false));
    }
    if let Some(rv) = &chart.rv_axis {
        axes.push((rv.p1.x, false));
    }
    if axes.is_empty() {
        return false;
    }
    for b in column_boxes(path, eps) {
        for &(pos, horizontal) in &axes {
            let (lo, hi) = if horizontal {
                (b.top(), b.bottom())
            } else {
                (b.left(), b.right())
            };
            if (lo - pos).abs() < len_min || (hi - pos).abs() < len_min {
                return true;
            }
        }
    }
    false
}

/// Do most explicit bar records start from an axis?
fn bars_start_from_axis(chart: &Chart, eps: f64) -> bool {
    let mut n_bar = 0u32;
    let mut n_axis = 0u32;
    for info in &chart.path_infos {
        if info.is_bar_kind() {
            n_bar += 1;
            if starts_from_axis(chart, &info.path, eps) {
                n_axis += 1;
            }
        }
    }
    n_bar > 0 && f64::from(n_axis) / f64::from(n_bar) > 0.1
}

/// Retag deferred single rectangles that mark line vertices (same color
/// as a line within 6 per channel, center within 1% of the chart height
/// of a vertex the rectangle contains).
fn mark_line_node_markers(chart: &mut Chart, eps: f64) {
    let zero = 0.01 * chart.height();
    let mut marked = Vec::new();
    for (i, bar) in chart.bars_infos.iter().enumerate() {
        let boxes = column_boxes(&bar.path, eps);
        if boxes.len() != 1 {
            continue;
        }
        let center = boxes[0].center();
        let bounds = match bar.path.bounds() {
            Some(b) => b,
            None => continue,
        };
        'lines: for info in &chart.path_infos {
            if !info.is_line_kind() {
                continue;
            }
            if bar.color.channel_max_diff(&info.color) > 6 {
                continue;
            }
            let pts = match super::scale::line_points(&info.path, chart.h_axis.as_ref(), eps) {
                Some(p) => p,
                None => continue,
            };
            for j in 0..pts.xs.len() {
                let dist = (pts.xs[j] - center.x).abs() + (pts.ys[j] - center.y).abs();
                if dist < zero
                    && bounds.contains_point(&crate::geometry::Point::new(pts.xs[j], pts.ys[j]))
                {
                    marked.push(i);
                    break 'lines;
                }
            }
        }
    }
    for i in marked {
        chart.bars_infos[i].kind = PathKind::LineNodeGraphicObj;
    }
}

/// Once the chart has settled, revisit the deferred small rectangles:
/// adopt the ones that touch an axis, stack with an explicit bar, or
/// align edge to edge with the bar set. Everything else is dropped.
pub fn reconfirm_deferred(chart: &mut Chart, cfg: &ClassifierConfig) {
    let eps = cfg.eps.delta;
    set_column_direction(&mut chart.path_infos, eps);
    if chart.bars_infos.is_empty() || chart.path_infos.is_empty() {
        chart.bars_infos.clear();
        return;
    }

    mark_line_node_markers(chart, eps);

    let bars: Vec<ChartPathInfo> = chart
        .path_infos
        .iter()
        .filter(|p| p.kind == PathKind::Bar)
        .cloned()
        .collect();
    let exp_start_axis = bars_start_from_axis(chart, eps);
    let mut adopted = Vec::new();
    for (i, info) in chart.bars_infos.iter().enumerate() {
        if info.kind == PathKind::LineNodeGraphicObj {
            continue;
        }
        if (exp_start_axis && starts_from_axis(chart, &info.path, eps))
            || stacked_with_bars(chart, &info.path, eps)
            || aligned_with_bars(&bars, info, eps)
        {
            adopted.push(i);
        }
    }

    let kind = if chart
        .path_infos
        .iter()
        .any(|p| p.kind == PathKind::Columnar)
    {
        PathKind::Columnar
    } else {
        PathKind::Bar
    };
    for &i in &adopted {
        let mut info = chart.bars_infos[i].clone();
        info.kind = kind;
        debug!("adopting deferred rectangle as {:?}", kind);
        chart.path_infos.push(info);
    }
    chart.bars_infos.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Line, Point};

    fn rect_path(x: f64, y: f64, w: f64, h: f64) -> Path {
        Path::new().rect(&Rect::new(x, y, w, h))
    }

    fn bar_info(x: f64, y: f64, w: f64, h: f64, color: Color, kind: PathKind) -> ChartPathInfo {
        ChartPathInfo::new(rect_path(x, y, w, h), kind, color)
    }

    // ==================== rectangle extraction ====================

    #[test]
    fn test_column_boxes_compound() {
        let mut path = rect_path(0.0, 0.0, 10.0, 40.0);
        path.extend(&rect_path(20.0, 0.0, 10.0, 30.0));
        let boxes = column_boxes(&path, 0.1);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].width, 10.0);
        assert_eq!(boxes[1].height, 30.0);
    }

    #[test]
    fn test_bar_center_records() {
        let recs = bar_center_records(&rect_path(10.0, 20.0, 4.0, 8.0), 0.1);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].cx, 12.0);
        assert_eq!(recs[0].cy, 24.0);
        assert_eq!(recs[0].w, 4.0);
        assert_eq!(recs[0].h, 8.0);
    }

    // ==================== stacking ====================

    #[test]
    fn test_records_stacked_vertically() {
        // two segments of one stacked bar: same x-center, adjacent in y
        let a = bar_center_records(&rect_path(10.0, 0.0, 8.0, 20.0), 0.1);
        let b = bar_center_records(&rect_path(10.0, 20.0, 8.0, 15.0), 0.1);
        assert!(records_stacked_along(&a, &b, true, 0.1));
    }

    #[test]
    fn test_records_overlaid_not_stacked() {
        let a = bar_center_records(&rect_path(10.0, 0.0, 8.0, 20.0), 0.1);
        let b = bar_center_records(&rect_path(10.0, 0.0, 8.0, 20.0), 0.1);
        assert!(!records_stacked_along(&a, &b, true, 0.1));
    }

    // ==================== direction ====================

    #[test]
    fn test_vertical_bars_detected() {
        let mut records = vec![
            bar_info(10.0, 10.0, 5.0, 40.0, Color::new(1, 2, 3), PathKind::Columnar),
            bar_info(20.0, 25.0, 5.0, 25.0, Color::new(1, 2, 3), PathKind::Columnar),
        ];
        assert!(set_column_direction(&mut records, 0.1));
        assert!(records.iter().all(|r| r.kind == PathKind::Bar));
    }

    #[test]
    fn test_horizontal_bars_detected() {
        // wide flat rects of varying width: width error dominates
        let mut records = vec![
            bar_info(0.0, 10.0, 40.0, 5.0, Color::new(1, 2, 3), PathKind::Columnar),
            bar_info(0.0, 20.0, 25.0, 5.0, Color::new(1, 2, 3), PathKind::Columnar),
            bar_info(0.0, 30.0, 55.0, 5.0, Color::new(1, 2, 3), PathKind::Columnar),
        ];
        assert!(!set_column_direction(&mut records, 0.1));
        assert!(records.iter().all(|r| r.kind == PathKind::Columnar));
    }

    // ==================== table rejection ====================

    fn chart_with_bars(infos: Vec<ChartPathInfo>) -> Chart {
        let mut chart = Chart::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        chart.path_infos = infos;
        chart.kind = ChartType::Bar;
        chart
    }

    #[test]
    fn test_varied_bars_not_table() {
        let c = Color::new(10, 90, 200);
        let chart = chart_with_bars(vec![
            bar_info(10.0, 100.0, 15.0, 80.0, c, PathKind::Bar),
            bar_info(30.0, 60.0, 15.0, 120.0, c, PathKind::Bar),
            bar_info(50.0, 140.0, 15.0, 40.0, c, PathKind::Bar),
            bar_info(70.0, 90.0, 15.0, 90.0, c, PathKind::Bar),
            bar_info(90.0, 120.0, 15.0, 60.0, c, PathKind::Bar),
        ]);
        assert!(!stacking_invalid(&chart, &ClassifierConfig::new()));
    }

    #[test]
    fn test_identical_grid_rejected_as_table() {
        // 25 equal cells, no legends: every stack has equal length
        let c = Color::new(230, 230, 230);
        let mut infos = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                infos.push(bar_info(
                    20.0 * i as f64,
                    30.0 * j as f64,
                    18.0,
                    28.0,
                    c,
                    PathKind::Bar,
                ));
            }
        }
        let chart = chart_with_bars(infos);
        assert!(stacking_invalid(&chart, &ClassifierConfig::new()));
    }

    #[test]
    fn test_single_stack_rejected() {
        let chart = chart_with_bars(vec![bar_info(
            10.0,
            10.0,
            15.0,
            80.0,
            Color::new(1, 2, 3),
            PathKind::Bar,
        )]);
        assert!(stacking_invalid(&chart, &ClassifierConfig::new()));
    }

    // ==================== deferred reconciliation ====================

    #[test]
    fn test_deferred_stacked_rect_adopted() {
        let c = Color::new(10, 90, 200);
        let mut chart = chart_with_bars(vec![
            bar_info(10.0, 100.0, 15.0, 80.0, c, PathKind::Bar),
            bar_info(40.0, 60.0, 15.0, 120.0, c, PathKind::Bar),
        ]);
        // small segment on top of the first bar
        chart.bars_infos.push(bar_info(
            10.0,
            92.0,
            15.0,
            8.0,
            Color::new(200, 30, 30),
            PathKind::Columnar,
        ));
        reconfirm_deferred(&mut chart, &ClassifierConfig::new());
        assert_eq!(chart.path_infos.len(), 3);
        assert!(chart.bars_infos.is_empty());
    }

    #[test]
    fn test_deferred_stray_rect_dropped() {
        let c = Color::new(10, 90, 200);
        let mut chart = chart_with_bars(vec![
            bar_info(10.0, 100.0, 15.0, 80.0, c, PathKind::Bar),
            bar_info(40.0, 60.0, 15.0, 120.0, c, PathKind::Bar),
        ]);
        chart.bars_infos.push(bar_info(
            300.0,
            7.0,
            4.0,
            4.0,
            Color::new(0, 0, 0),
            PathKind::Columnar,
        ));
        reconfirm_deferred(&mut chart, &ClassifierConfig::new());
        assert_eq!(chart.path_infos.len(), 2);
        assert!(chart.bars_infos.is_empty());
    }

    #[test]
    fn test_line_node_marker_not_adopted() {
        let c = Color::new(10, 90, 200);
        let line = Path::new()
            .move_to(Point::new(10.0, 50.0))
            .line_to(Point::new(50.0, 30.0))
            .line_to(Point::new(90.0, 40.0));
        let mut chart = chart_with_bars(vec![ChartPathInfo::new(line, PathKind::Line, c)]);
        chart.kind = ChartType::Line;
        chart.h_axis = Some(Line::from_coords(0.0, 100.0, 200.0, 100.0));
        // small square centered on the middle vertex, same color
        chart
            .bars_infos
            .push(bar_info(48.0, 28.0, 4.0, 4.0, c, PathKind::Columnar));
        reconfirm_deferred(&mut chart, &ClassifierConfig::new());
        assert_eq!(chart.path_infos.len(), 1);
        assert!(chart.bars_infos.is_empty());
    }
}
