//! Configuration for the chart path classification engine.
//!
//! Every empirically calibrated threshold lives here as a named field so the
//! engine can be re-tuned without code changes. Fractions are relative to the
//! owning chart's width/height unless a field name says otherwise; absolute
//! values are in page points.

/// Coordinate-equality tolerances shared across the engine.
#[derive(Debug, Clone)]
pub struct Epsilons {
    /// General coordinate comparison tolerance.
    pub delta: f64,
    /// Tight tolerance for path closure and rectangle corner tests.
    pub snap: f64,
}

impl Default for Epsilons {
    fn default() -> Self {
        Self {
            delta: 0.1,
            snap: 1e-2,
        }
    }
}

/// Thresholds for arc, ring, and pie reconstruction.
#[derive(Debug, Clone)]
pub struct ArcConfig {
    /// Tolerance (radians) for accepting a wedge-angle sum as a full pie.
    pub pie_completion_tol: f64,
    /// Relative rim-distance error allowed around the mean radius.
    pub radius_rel_tol: f64,
    /// Center-fit coefficient for standalone ring paths.
    pub ring_center_coef: f64,
    /// Minimum mean radius for a ring center candidate.
    pub ring_min_radius: f64,
    /// Center-fit coefficient when searching among grouped wedge points.
    pub grouped_center_coef: f64,
    /// Minimum bounding-box extent (one dimension) for a ring path.
    pub ring_min_box: f64,
    /// Bounding-box range for a circular legend icon.
    pub legend_ring_box: (f64, f64),
    /// Center-fit coefficient for circular legend icons.
    pub legend_ring_center_coef: f64,
    /// Minimum mean radius for a circular legend icon.
    pub legend_ring_min_radius: f64,
    /// Wedge centers must lie within this fraction of the mean radius of
    /// each other to form one pie.
    pub center_cluster_coef: f64,
    /// Maximum radius standard deviation, as a fraction of the mean radius.
    pub radius_stddev_coef: f64,
    /// Triangle slivers join a pie when their radius ratio is in this range.
    pub triangle_radius_ratio: (f64, f64),
    /// A previously saved pie is a duplicate when its center lies within
    /// this fraction of the radius of a newly completed one.
    pub duplicate_pie_coef: f64,
    /// Donut-hole centroid distance limit, as a fraction of (width+height).
    pub donut_centroid_coef: f64,
    /// Rim distances below this are treated as the center point itself.
    pub min_center_dist: f64,
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            pie_completion_tol: 0.1,
            radius_rel_tol: 0.2,
            ring_center_coef: 0.3,
            ring_min_radius: 20.0,
            grouped_center_coef: 0.2,
            ring_min_box: 20.0,
            legend_ring_box: (5.0, 20.0),
            legend_ring_center_coef: 0.3,
            legend_ring_min_radius: 2.5,
            center_cluster_coef: 0.5,
            radius_stddev_coef: 0.2,
            triangle_radius_ratio: (0.3, 1.5),
            duplicate_pie_coef: 0.5,
            donut_centroid_coef: 0.1,
            min_center_dist: 0.5,
        }
    }
}

/// Thresholds for bar/column extraction, stacking, and table rejection.
#[derive(Debug, Clone)]
pub struct BarConfig {
    /// Rectangles at or below this fraction of both chart dimensions are
    /// stashed as deferred candidates rather than classified.
    pub small_rect_frac: f64,
    /// A single rectangle covering at least this (width, height) fraction of
    /// the chart is background, not a bar.
    pub single_rect_max: (f64, f64),
    /// A single rectangle thinner than this (width, height) in points is a
    /// stray mark, not a bar.
    pub single_rect_min: (f64, f64),
    /// With at least this many rectangles, each must reach the paired
    /// minimum (width, height) in points.
    pub many_rect_count: usize,
    /// Minimum (width, height) in points applied at `many_rect_count`.
    pub many_rect_min: (f64, f64),
    /// Flat-thin set detection: mean height fraction and width-error
    /// fraction below which a set looks like gridwork.
    pub flat_mean_h_frac: f64,
    /// Width mean-error fraction for the flat-thin test.
    pub flat_w_err_frac: f64,
    /// Flat-thin sets spanning more than this height fraction are rejected.
    pub flat_max_h_frac: f64,
    /// Flat-thin sets with at least this many rectangles are rejected.
    pub flat_max_count: usize,
    /// Single wide rectangle acceptance: minimum mean-width fraction.
    pub wide_single_min_w_frac: f64,
    /// Single wide rectangle acceptance: minimum area fraction.
    pub wide_single_min_area_frac: f64,
    /// A stack longer than this fraction of the chart extent is a table.
    pub stack_max_extent_frac: f64,
    /// A stack with at least this many rectangles is a table.
    pub stack_max_count: u32,
    /// More than this ratio of same-colored rectangles is a table.
    pub same_color_ratio: f64,
    /// Lower same-color ratio bound applied when only one color is present.
    pub single_color_ratio: f64,
    /// Adjacent rectangles differing by more than this factor in both
    /// dimensions disqualify a bar run.
    pub adjacent_dim_ratio: f64,
    /// Unlabeled single bars thinner than this chart fraction are dropped.
    pub unlabeled_min_frac: f64,
    /// Same-width/height tolerance (chart fraction) for unlabeled sets.
    pub unlabeled_same_dim_frac: f64,
    /// Distance (points) within which a bar edge counts as axis-flush.
    pub axis_touch_tol: f64,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            small_rect_frac: 0.05,
            single_rect_max: (0.5, 0.45),
            single_rect_min: (0.4, 0.35),
            many_rect_count: 8,
            many_rect_min: (2.0, 1.0),
            flat_mean_h_frac: 0.025,
            flat_w_err_frac: 0.02,
            flat_max_h_frac: 0.5,
            flat_max_count: 60,
            wide_single_min_w_frac: 0.1,
            wide_single_min_area_frac: 0.001,
            stack_max_extent_frac: 0.95,
            stack_max_count: 20,
            same_color_ratio: 0.2,
            single_color_ratio: 0.1,
            adjacent_dim_ratio: 2.0,
            unlabeled_min_frac: 0.002,
            unlabeled_same_dim_frac: 0.002,
            axis_touch_tol: 0.5,
        }
    }
}

/// Thresholds for line, curve, ribbon, and dash classification.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Minimum bounding-box width fraction for a trend line.
    pub min_w_frac: f64,
    /// Minimum bounding-box height fraction for a trend line.
    pub min_h_frac: f64,
    /// Spike exception: a line thinner than this fraction on one axis…
    pub spike_thin_frac: f64,
    /// …qualifies when it spans at least this fraction on the other.
    pub spike_long_frac: f64,
    /// A single segment jumping this fraction of the chart width rejects.
    pub max_x_jump_frac: f64,
    /// Horizontal long line: minimum length as a chart-width fraction.
    pub horizon_min_len_frac: f64,
    /// Horizontal long line: minimum absolute length in points.
    pub horizon_min_len_abs: f64,
    /// Dashed stroke line: minimum point count.
    pub dash_min_points: u32,
    /// Dashed stroke line: thin-axis fraction limit.
    pub dash_thin_frac: f64,
    /// Dashed stroke line: long-axis fraction minimum.
    pub dash_long_frac: f64,
    /// Filled ribbon: minimum bounding-box width fraction.
    pub filled_min_w_frac: f64,
    /// Filled ribbon: minimum point count.
    pub filled_min_points: usize,
    /// Filled ribbon: enclosed area limit as a fraction of the chart area.
    pub filled_max_area_frac: f64,
    /// Centerline smoothing: a vertex survives when its x advances past the
    /// previous kept vertex by this step.
    pub smooth_step: f64,
    /// Filled dash line: minimum bounding-box width fraction.
    pub filled_dash_min_w_frac: f64,
    /// Filled dash line: minimum bounding-box height fraction.
    pub filled_dash_min_h_frac: f64,
    /// Filled dash line: the lowest dash band must span less than this
    /// fraction of the bbox width (otherwise the blobs are a grid).
    pub filled_dash_spread: f64,
    /// Unlabeled lines smaller than this chart fraction are dropped.
    pub unlabeled_min_frac: f64,
    /// Unlabeled lines whose summed |dx| exceeds this multiple of the bbox
    /// width double back on themselves and are dropped.
    pub unlabeled_fold_ratio: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            min_w_frac: 0.05,
            min_h_frac: 0.01,
            spike_thin_frac: 0.01,
            spike_long_frac: 0.05,
            max_x_jump_frac: 0.75,
            horizon_min_len_frac: 0.15,
            horizon_min_len_abs: 10.0,
            dash_min_points: 50,
            dash_thin_frac: 0.001,
            dash_long_frac: 0.6,
            filled_min_w_frac: 0.05,
            filled_min_points: 12,
            filled_max_area_frac: 0.02,
            smooth_step: 1.03,
            filled_dash_min_w_frac: 0.5,
            filled_dash_min_h_frac: 0.05,
            filled_dash_spread: 0.9,
            unlabeled_min_frac: 0.01,
            unlabeled_fold_ratio: 2.0,
        }
    }
}

/// Thresholds for area-fill classification.
#[derive(Debug, Clone)]
pub struct AreaConfig {
    /// Minimum bounding-box width fraction.
    pub min_w_frac: f64,
    /// Minimum bounding-box height fraction.
    pub min_h_frac: f64,
    /// Minimum point count.
    pub min_points: u32,
    /// Minimum enclosed area as a fraction of the chart area.
    pub min_area_frac: f64,
    /// Minimum band thickness as a fraction of the chart height.
    pub min_band_frac: f64,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            min_w_frac: 0.002,
            min_h_frac: 0.05,
            min_points: 10,
            min_area_frac: 0.01,
            min_band_frac: 0.001,
        }
    }
}

/// Thresholds for legend-swatch detection and legend/axis resolution.
#[derive(Debug, Clone)]
pub struct LegendConfig {
    /// Rectangular swatch width range as chart-width fractions.
    pub rect_w_frac: (f64, f64),
    /// Rectangular swatch maximum height as a chart-height fraction.
    pub rect_max_h_frac: f64,
    /// Non-rectangular icon maximum width fraction.
    pub icon_max_w_frac: f64,
    /// Non-rectangular icon maximum height fraction.
    pub icon_max_h_frac: f64,
    /// Dash blob maximum oriented-bbox area as a chart-area fraction.
    pub dash_blob_max_area_frac: f64,
    /// Dash centroids must stay within this fraction of the path height.
    pub dash_band_coef: f64,
    /// At most this many dash blobs still count as a legend line.
    pub dash_legend_max_blobs: usize,
    /// At least this many dash blobs form a candidate dashed series line.
    pub dash_line_min_blobs: usize,
    /// Calibration mark: maximum dx as a chart-width fraction.
    pub calib_dx_frac: f64,
    /// Calibration mark: maximum dy as a chart-height fraction.
    pub calib_dy_frac: f64,
    /// Calibration mark: distance to a vertical axis as a width fraction.
    pub calib_axis_frac: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            rect_w_frac: (0.01, 0.15),
            rect_max_h_frac: 0.1,
            icon_max_w_frac: 0.1,
            icon_max_h_frac: 0.075,
            dash_blob_max_area_frac: 0.002,
            dash_band_coef: 0.2,
            dash_legend_max_blobs: 3,
            dash_line_min_blobs: 20,
            calib_dx_frac: 0.01,
            calib_dy_frac: 0.1,
            calib_axis_frac: 0.001,
        }
    }
}

/// Thresholds for grid and axis-tick recognition.
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Grid paths must span at least this fraction of both chart dimensions.
    pub grid_min_span_frac: f64,
    /// Tick paths must be thinner than this fraction on exactly one axis.
    pub tick_max_dim_frac: f64,
    /// Each tick segment must be shorter than this fraction of (cw + ch).
    pub tick_max_len_frac: f64,
    /// Minimum segment length (points) for standalone grid-line sets.
    pub segment_min_len: f64,
    /// Rectangles thinner than this (points) degrade to grid segments.
    pub degenerate_rect_dim: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_min_span_frac: 0.3,
            tick_max_dim_frac: 0.1,
            tick_max_len_frac: 0.1,
            segment_min_len: 10.0,
            degenerate_rect_dim: 2.0,
        }
    }
}

/// Thresholds for fragment merging and duplicate suppression.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Maximum L1 endpoint gap for continuity merges.
    pub continuity_gap: f64,
    /// X-overlap ratio above which two lines are parallel series, not
    /// fragments of one.
    pub overlap_x_coef: f64,
    /// Maximum summed RGB channel difference for approximate-color merges.
    pub approx_color_tol: u32,
    /// Point-count difference tolerated by the duplicate pair test.
    pub point_count_diff: u32,
    /// A labeled bar whose rectangles are covered by text beyond this ratio
    /// is an annotation box.
    pub text_cover_ratio: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            continuity_gap: 1.0,
            overlap_x_coef: 0.7,
            approx_color_tol: 10,
            point_count_diff: 2,
            text_cover_ratio: 0.4,
        }
    }
}

/// Complete engine configuration.
///
/// Construct with [`ClassifierConfig::new`] and adjust groups with the
/// builder methods, or mutate fields directly.
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    /// Shared comparison tolerances.
    pub eps: Epsilons,
    /// Arc/ring/pie thresholds.
    pub arc: ArcConfig,
    /// Bar/column thresholds.
    pub bar: BarConfig,
    /// Line/curve/ribbon/dash thresholds.
    pub line: LineConfig,
    /// Area-fill thresholds.
    pub area: AreaConfig,
    /// Legend-swatch and resolver thresholds.
    pub legend: LegendConfig,
    /// Grid/tick thresholds.
    pub grid: GridConfig,
    /// Fragment-merger thresholds.
    pub merge: MergeConfig,
}

impl ClassifierConfig {
    /// Create a configuration with the calibrated defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the arc/pie thresholds.
    pub fn with_arc(mut self, arc: ArcConfig) -> Self {
        self.arc = arc;
        self
    }

    /// Replace the bar/column thresholds.
    pub fn with_bar(mut self, bar: BarConfig) -> Self {
        self.bar = bar;
        self
    }

    /// Replace the line thresholds.
    pub fn with_line(mut self, line: LineConfig) -> Self {
        self.line = line;
        self
    }

    /// Replace the area thresholds.
    pub fn with_area(mut self, area: AreaConfig) -> Self {
        self.area = area;
        self
    }

    /// Replace the legend thresholds.
    pub fn with_legend(mut self, legend: LegendConfig) -> Self {
        self.legend = legend;
        self
    }

    /// Replace the grid thresholds.
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Replace the merge thresholds.
    pub fn with_merge(mut self, merge: MergeConfig) -> Self {
        self.merge = merge;
        self
    }

    /// Replace the comparison tolerances.
    pub fn with_eps(mut self, eps: Epsilons) -> Self {
        self.eps = eps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerances() {
        let config = ClassifierConfig::new();
        assert_eq!(config.eps.delta, 0.1);
        assert_eq!(config.arc.pie_completion_tol, 0.1);
        assert_eq!(config.bar.stack_max_count, 20);
        assert_eq!(config.merge.approx_color_tol, 10);
    }

    #[test]
    fn test_builder_replaces_group() {
        let arc = ArcConfig {
            pie_completion_tol: 0.2,
            ..ArcConfig::default()
        };
        let config = ClassifierConfig::new().with_arc(arc);
        assert_eq!(config.arc.pie_completion_tol, 0.2);
        // untouched groups keep defaults
        assert_eq!(config.line.min_w_frac, 0.05);
    }
}
