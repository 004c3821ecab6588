//! Chart aggregate and output data model.
//!
//! A [`Chart`] owns everything the engine knows about one chart region:
//! the classified shape records, deferred bar candidates, completed pies,
//! axis lines, legends, and the text boxes used for annotation filtering.

pub mod path_info;
pub mod pie;

pub use path_info::{AxisSideX, AxisSideY, ChartPathInfo, Legend, PathKind};
pub use pie::{ArcObject, Pie};

use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Rect};

/// Overall chart type, derived from the surviving records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    /// Undetermined or empty after purge.
    Unknown,
    /// Polyline series chart.
    Line,
    /// Smooth-curve series chart.
    Curve,
    /// Vertical bar chart.
    Bar,
    /// Horizontal bar chart.
    Column,
    /// Filled area chart.
    Area,
    /// Overlapping filled areas.
    AreaOverlap,
    /// Pie or donut chart.
    Pie,
    /// Mixed bar/line chart.
    Combo,
}

impl Default for ChartType {
    fn default() -> Self {
        ChartType::Unknown
    }
}

/// One chart region under reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    /// Chart bounding box on the page.
    pub area: Rect,
    /// Current chart type.
    pub kind: ChartType,
    /// Classified shape records.
    pub path_infos: Vec<ChartPathInfo>,
    /// Deferred small-rectangle candidates, revisited when the chart type
    /// settles.
    pub bars_infos: Vec<ChartPathInfo>,
    /// Most recently completed pie.
    pub pie: Option<Pie>,
    /// All completed pies.
    pub pies: Vec<Pie>,
    /// Horizontal (category) axis.
    pub h_axis: Option<Line>,
    /// Left vertical axis.
    pub lv_axis: Option<Line>,
    /// Right vertical axis.
    pub rv_axis: Option<Line>,
    /// Tick segments collected from scale paths.
    pub axis_scale_lines: Vec<Line>,
    /// Legend entries awaiting or carrying resolution.
    pub legends: Vec<Legend>,
    /// Bounding boxes of text chunks inside the chart area.
    pub text_boxes: Vec<Rect>,
    /// Set by the OCR collaborator when tick labels are rotated; consumed
    /// only by downstream tick-band search.
    pub has_rotated_tick_text: bool,
}

impl Chart {
    /// Create an empty chart over the given region.
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            kind: ChartType::Unknown,
            path_infos: Vec::new(),
            bars_infos: Vec::new(),
            pie: None,
            pies: Vec::new(),
            h_axis: None,
            lv_axis: None,
            rv_axis: None,
            axis_scale_lines: Vec::new(),
            legends: Vec::new(),
            text_boxes: Vec::new(),
            has_rotated_tick_text: false,
        }
    }

    /// Chart width.
    pub fn width(&self) -> f64 {
        self.area.width
    }

    /// Chart height.
    pub fn height(&self) -> f64 {
        self.area.height
    }

    /// True when any record of one of the given kinds survives.
    pub fn has_kind(&self, kinds: &[PathKind]) -> bool {
        self.path_infos.iter().any(|p| kinds.contains(&p.kind))
    }

    /// Derive the chart type from the surviving records and pies.
    ///
    /// Pies win outright; mixed bar/line sets become `Combo`; otherwise
    /// the dominant record kind decides.
    pub fn derive_type(&mut self) {
        if !self.pies.is_empty() || self.pie.is_some() {
            self.kind = ChartType::Pie;
            return;
        }
        let has_bar = self.has_kind(&[PathKind::Bar]);
        let has_col = self.has_kind(&[PathKind::Columnar]);
        let has_line = self.has_kind(&[PathKind::Line, PathKind::Curve, PathKind::DashLine]);
        let has_area = self.has_kind(&[PathKind::Area]);
        self.kind = if (has_bar || has_col) && (has_line || has_area) {
            ChartType::Combo
        } else if has_bar {
            ChartType::Bar
        } else if has_col {
            ChartType::Column
        } else if has_area {
            let areas = self
                .path_infos
                .iter()
                .filter(|p| p.kind == PathKind::Area)
                .count();
            if areas > 1 {
                ChartType::AreaOverlap
            } else {
                ChartType::Area
            }
        } else if self.has_kind(&[PathKind::Curve]) && !self.has_kind(&[PathKind::Line]) {
            ChartType::Curve
        } else if has_line {
            ChartType::Line
        } else {
            ChartType::Unknown
        };
    }
}
