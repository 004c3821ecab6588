//! Legend and axis resolution.
//!
//! Records are matched to legend swatches by paint color, with a
//! luminance-ranked reconciliation pass for gradient-shifted near
//! misses. Dual-axis charts assign each legend's records to the left or
//! right value axis, preferring explicit keywords in the caption (the
//! corpus is bilingual, so both `右` and `right` count).

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::chart::{AxisSideY, Chart, ChartPathInfo, ChartType, Legend, PathKind};
use crate::classify::scale::line_points;
use crate::config::ClassifierConfig;
use crate::geometry::Color;

lazy_static! {
    static ref LEFT_AXIS_RE: Regex = Regex::new(r"(?i)(左|\(L\)|lhs|left)").unwrap();
    static ref RIGHT_AXIS_RE: Regex = Regex::new(r"(?i)(右|\(R\)|rhs|right)").unwrap();
}

fn matches_axis_keyword(text: &str, left: bool) -> bool {
    let squeezed: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if squeezed.is_empty() {
        return false;
    }
    if left {
        LEFT_AXIS_RE.is_match(&squeezed)
    } else {
        RIGHT_AXIS_RE.is_match(&squeezed)
    }
}

/// Reconcile near-miss legend colors against the record colors.
///
/// When the unmatched subsets of both color sets have equal size (the
/// usual gradient-fill case), both are sorted by luminance and the
/// legend colors are replaced rank for rank.
pub fn reconcile_colors(chart: &mut Chart) {
    let mut record_colors: Vec<Color> = Vec::new();
    for info in &chart.path_infos {
        if !record_colors.contains(&info.color) {
            record_colors.push(info.color);
        }
    }
    let mut legend_colors: Vec<Color> = Vec::new();
    for legend in &chart.legends {
        if !legend_colors.contains(&legend.color) {
            legend_colors.push(legend.color);
        }
    }
    if legend_colors.is_empty() || legend_colors.len() != record_colors.len() {
        return;
    }

    let mut unmatched_legend: Vec<(Color, usize)> = legend_colors
        .iter()
        .enumerate()
        .filter(|(_, c)| !record_colors.contains(c))
        .map(|(i, c)| (*c, i))
        .collect();
    let mut unmatched_record: Vec<Color> = record_colors
        .iter()
        .filter(|c| !legend_colors.contains(c))
        .cloned()
        .collect();
    if unmatched_legend.is_empty() || unmatched_legend.len() != unmatched_record.len() {
        return;
    }

    unmatched_legend.sort_by_key(|(c, _)| c.luminance());
    unmatched_record.sort_by_key(|c| c.luminance());
    for (i, &(_, legend_idx)) in unmatched_legend.iter().enumerate() {
        let old = legend_colors[legend_idx];
        let new = unmatched_record[i];
        debug!("reconciling legend color {:?} -> {:?}", old, new);
        for legend in chart.legends.iter_mut() {
            if legend.color == old {
                legend.color = new;
            }
        }
    }
}

/// Index of the legend that should map to the right axis, decided by
/// swatch position and overridden by explicit caption keywords. Only
/// meaningful on dual-axis charts with exactly two legends.
fn right_axis_legend(legends: &[Legend]) -> Option<usize> {
    if legends.len() != 2 {
        return None;
    }
    let (a, b) = (&legends[0], &legends[1]);
    let mut idx = if a.swatch.left() < b.swatch.left() {
        1
    } else if a.swatch.center().y < b.swatch.center().y {
        1
    } else {
        0
    };
    if matches_axis_keyword(&a.text, false) {
        idx = 0;
    } else if matches_axis_keyword(&b.text, false) {
        idx = 1;
    }
    Some(idx)
}

/// Match records to legends by color, assign labels and axis sides, and
/// reorder matched records first. Each legend's `kind` is set from the
/// record it resolved to.
pub fn match_legends(chart: &mut Chart) {
    let n_legends = chart.legends.len();
    if n_legends == 0 || chart.path_infos.is_empty() {
        return;
    }
    let has_left = chart.lv_axis.is_some();
    let has_right = chart.rv_axis.is_some();
    let n_vertical = usize::from(has_left) + usize::from(has_right);
    let right_idx = if n_vertical == 2 {
        right_axis_legend(&chart.legends)
    } else {
        None
    };

    let records = std::mem::take(&mut chart.path_infos);
    let mut matched: Vec<ChartPathInfo> = Vec::new();
    let mut unmatched: Vec<ChartPathInfo> = Vec::new();
    let mut legend_used = vec![false; n_legends];
    let mut assigned_sides: Vec<AxisSideY> = Vec::new();
    for mut info in records {
        let candidates: Vec<usize> = chart
            .legends
            .iter()
            .enumerate()
            .filter(|(_, l)| l.color == info.color)
            .map(|(i, _)| i)
            .collect();
        let mut placed = false;
        let n_cand = candidates.len();
        for (rank, &i_legend) in candidates.iter().enumerate() {
            if legend_used[i_legend] || rank == n_cand - 1 {
                legend_used[i_legend] = true;
                let legend = &mut chart.legends[i_legend];
                let mut side = AxisSideY::Left;
                if matches_axis_keyword(&legend.text, false) {
                    side = if has_left && !has_right {
                        AxisSideY::Left
                    } else {
                        AxisSideY::Right
                    };
                    assigned_sides.push(side);
                } else if matches_axis_keyword(&legend.text, true) {
                    side = if !has_left && has_right {
                        AxisSideY::Right
                    } else {
                        AxisSideY::Left
                    };
                    assigned_sides.push(side);
                } else {
                    if Some(i_legend) == right_idx {
                        side = AxisSideY::Right;
                    }
                    if n_legends > 2
                        && n_vertical == 2
                        && chart.kind == ChartType::Combo
                        && info.is_line_kind()
                    {
                        side = if assigned_sides.contains(&AxisSideY::Right) {
                            AxisSideY::Left
                        } else {
                            AxisSideY::Right
                        };
                    }
                }
                info.label = legend.text.clone();
                info.side_y = side;
                legend.kind = info.kind;
                matched.push(info.clone());
                placed = true;
                break;
            }
        }
        if !placed {
            unmatched.push(info);
        }
    }
    matched.extend(unmatched);
    chart.path_infos = matched;
}

/// Demote axis calibration marks: unlabeled two-point `Line` records
/// that are short verticals sitting on the horizontal axis, or short
/// horizontals at a vertical axis x.
pub fn filter_axis_calibration(chart: &mut Chart, cfg: &ClassifierConfig) {
    let w = chart.width();
    let h = chart.height();
    let same_w = cfg.legend.calib_dx_frac * w;
    let same_h = cfg.legend.calib_dx_frac * h;
    let short_w = cfg.legend.calib_dy_frac * w;
    let short_h = cfg.legend.calib_dy_frac * h;
    let axis_tol = cfg.legend.calib_axis_frac * w;
    let h_axis = chart.h_axis;
    let lv_x = chart.lv_axis.map(|a| a.p1.x);
    let rv_x = chart.rv_axis.map(|a| a.p1.x);

    for info in chart.path_infos.iter_mut() {
        if info.kind != PathKind::Line || info.has_label() {
            continue;
        }
        let pts = match line_points(&info.path, h_axis.as_ref(), cfg.eps.delta) {
            Some(p) => p,
            None => continue,
        };
        if pts.xs.len() >= 3 {
            continue;
        }
        let dx = (pts.xs[0] - pts.xs[1]).abs();
        let dy = (pts.ys[0] - pts.ys[1]).abs();
        let vertical = dx < same_w && dy < short_h;
        let horizontal = dy < same_h && dx < short_w;
        if let Some(axis) = &h_axis {
            let on_axis = (axis.p1.y - pts.ys[0]).abs() < same_h
                || (axis.p1.y - pts.ys[1]).abs() < same_h;
            if on_axis && vertical {
                info.kind = PathKind::Unknown;
                continue;
            }
        }
        for axis_x in [lv_x, rv_x].into_iter().flatten() {
            let on_axis =
                (axis_x - pts.xs[0]).abs() < axis_tol || (axis_x - pts.xs[1]).abs() < axis_tol;
            if on_axis && horizontal {
                info.kind = PathKind::Unknown;
                break;
            }
        }
    }
}

/// Combo charts never carry horizontal bars: when line/curve/area
/// records coexist with `Columnar` ones, force the bars vertical and
/// re-derive the chart type.
pub fn reset_combo_direction(chart: &mut Chart) {
    let has_other = chart
        .path_infos
        .iter()
        .any(|p| p.is_line_kind() || p.kind == PathKind::Area);
    let has_columnar = chart.path_infos.iter().any(|p| p.kind == PathKind::Columnar);
    if !has_other || !has_columnar {
        return;
    }
    for info in chart.path_infos.iter_mut() {
        if info.kind == PathKind::Columnar {
            info.kind = PathKind::Bar;
        }
    }
    chart.derive_type();
}

/// Run the resolver: color reconciliation, legend matching, calibration
/// filtering, and the combo direction reset.
pub fn resolve(chart: &mut Chart, cfg: &ClassifierConfig) {
    reconcile_colors(chart);
    match_legends(chart);
    filter_axis_calibration(chart, cfg);
    reset_combo_direction(chart);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Line, Path, Point, Rect};

    fn polyline(pts: &[(f64, f64)]) -> Path {
        let mut path = Path::new().move_to(Point::new(pts[0].0, pts[0].1));
        for &(x, y) in &pts[1..] {
            path = path.line_to(Point::new(x, y));
        }
        path
    }

    fn line_record(color: Color) -> ChartPathInfo {
        ChartPathInfo::new(
            polyline(&[(10.0, 50.0), (100.0, 40.0), (200.0, 60.0)]),
            PathKind::Line,
            color,
        )
    }

    fn legend(color: Color, x: f64, text: &str) -> Legend {
        Legend::new(color, Rect::new(x, 10.0, 12.0, 6.0), text)
    }

    fn chart() -> Chart {
        let mut c = Chart::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        c.kind = ChartType::Line;
        c
    }

    #[test]
    fn test_exact_color_match_assigns_label() {
        let blue = Color::new(10, 90, 200);
        let mut ch = chart();
        ch.path_infos.push(line_record(Color::new(99, 99, 99)));
        ch.path_infos.push(line_record(blue));
        ch.legends.push(legend(blue, 100.0, "revenue"));
        match_legends(&mut ch);
        // matched record reordered first
        assert_eq!(ch.path_infos[0].label, "revenue");
        assert_eq!(ch.path_infos[0].color, blue);
        assert!(!ch.path_infos[1].has_label());
        assert_eq!(ch.legends[0].kind, PathKind::Line);
    }

    #[test]
    fn test_luminance_rank_reconciliation() {
        let mut ch = chart();
        // record colors shifted slightly off the legend swatches
        ch.path_infos.push(line_record(Color::new(30, 30, 30)));
        ch.path_infos.push(line_record(Color::new(220, 220, 220)));
        ch.legends.push(legend(Color::new(215, 215, 215), 100.0, "a"));
        ch.legends.push(legend(Color::new(25, 25, 25), 140.0, "b"));
        reconcile_colors(&mut ch);
        assert_eq!(ch.legends[0].color, Color::new(220, 220, 220));
        assert_eq!(ch.legends[1].color, Color::new(30, 30, 30));
    }

    #[test]
    fn test_right_keyword_overrides_position() {
        let blue = Color::new(10, 90, 200);
        let red = Color::new(200, 30, 30);
        let mut ch = chart();
        ch.lv_axis = Some(Line::from_coords(40.0, 20.0, 40.0, 280.0));
        ch.rv_axis = Some(Line::from_coords(360.0, 20.0, 360.0, 280.0));
        ch.path_infos.push(line_record(blue));
        ch.path_infos.push(line_record(red));
        ch.legends.push(legend(blue, 100.0, "sales (右)"));
        ch.legends.push(legend(red, 140.0, "volume"));
        match_legends(&mut ch);
        let blue_rec = ch.path_infos.iter().find(|p| p.color == blue).unwrap();
        assert_eq!(blue_rec.side_y, AxisSideY::Right);
        let red_rec = ch.path_infos.iter().find(|p| p.color == red).unwrap();
        assert_eq!(red_rec.side_y, AxisSideY::Left);
    }

    #[test]
    fn test_calibration_tick_demoted() {
        let mut ch = chart();
        ch.h_axis = Some(Line::from_coords(0.0, 280.0, 400.0, 280.0));
        let tick = ChartPathInfo::new(
            polyline(&[(120.0, 280.0), (120.0, 285.0)]),
            PathKind::Line,
            Color::new(0, 0, 0),
        );
        ch.path_infos.push(tick);
        filter_axis_calibration(&mut ch, &ClassifierConfig::new());
        assert_eq!(ch.path_infos[0].kind, PathKind::Unknown);
    }

    #[test]
    fn test_combo_direction_reset() {
        let mut ch = chart();
        ch.path_infos.push(line_record(Color::new(10, 90, 200)));
        ch.path_infos.push(ChartPathInfo::new(
            Path::new().rect(&Rect::new(20.0, 100.0, 15.0, 80.0)),
            PathKind::Columnar,
            Color::new(200, 30, 30),
        ));
        reset_combo_direction(&mut ch);
        assert!(ch.path_infos.iter().any(|p| p.kind == PathKind::Bar));
        assert_eq!(ch.kind, ChartType::Combo);
    }
}
