//! Classified path records and legend entries.

use serde::{Deserialize, Serialize};

use crate::geometry::{Color, Path, Rect};

/// Shape class assigned to a path by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathKind {
    /// Not yet classified, or rejected; purged before output.
    Unknown,
    /// Polyline trend series.
    Line,
    /// Smooth (Bézier) trend series.
    Curve,
    /// Vertical bar.
    Bar,
    /// Horizontal bar.
    Columnar,
    /// Filled area band.
    Area,
    /// Pie/donut wedge.
    Arc,
    /// Long horizontal rule (baseline or marker line).
    HorizonLongLine,
    /// Dashed series line reassembled from dash blobs.
    DashLine,
    /// Graphic node marker sitting on a line series.
    LineNodeGraphicObj,
}

/// Which horizontal axis a record reads against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSideX {
    /// Top edge axis.
    Top,
    /// Bottom edge axis (default).
    Bottom,
}

/// Which vertical axis a record reads against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSideY {
    /// Left edge axis (default).
    Left,
    /// Right edge axis.
    Right,
}

/// One classified, chart-owned shape record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPathInfo {
    /// The owned geometry.
    pub path: Path,
    /// Shape class.
    pub kind: PathKind,
    /// Paint color.
    pub color: Color,
    /// Series label, empty until legend resolution.
    pub label: String,
    /// Horizontal axis assignment.
    pub side_x: AxisSideX,
    /// Vertical axis assignment.
    pub side_y: AxisSideY,
    /// Value interpolation along x subdivides rather than snapping.
    pub subdivide_x: bool,
    /// Value interpolation along y subdivides rather than snapping.
    pub subdivide_y: bool,
}

impl ChartPathInfo {
    /// Create a record with default axis sides and no label.
    pub fn new(path: Path, kind: PathKind, color: Color) -> Self {
        Self {
            path,
            kind,
            color,
            label: String::new(),
            side_x: AxisSideX::Bottom,
            side_y: AxisSideY::Left,
            subdivide_x: false,
            subdivide_y: false,
        }
    }

    /// True when a legend label has been resolved.
    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }

    /// True for the two stroke-series kinds merged by continuity.
    pub fn is_line_kind(&self) -> bool {
        matches!(self.kind, PathKind::Line | PathKind::Curve)
    }

    /// True for the two rectangle-series kinds.
    pub fn is_bar_kind(&self) -> bool {
        matches!(self.kind, PathKind::Bar | PathKind::Columnar)
    }
}

/// One legend entry: a color swatch and its caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Legend {
    /// Swatch color, the key used to match records.
    pub color: Color,
    /// Swatch bounding box on the page.
    pub swatch: Rect,
    /// Caption text.
    pub text: String,
    /// Kind of the record this legend resolved to.
    pub kind: PathKind,
}

impl Legend {
    /// Create an unresolved legend entry.
    pub fn new(color: Color, swatch: Rect, text: impl Into<String>) -> Self {
        Self {
            color,
            swatch,
            text: text.into(),
            kind: PathKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_record_defaults() {
        let path = Path::new().move_to(Point::new(0.0, 0.0));
        let info = ChartPathInfo::new(path, PathKind::Line, Color::new(1, 2, 3));
        assert_eq!(info.side_x, AxisSideX::Bottom);
        assert_eq!(info.side_y, AxisSideY::Left);
        assert!(!info.has_label());
        assert!(info.is_line_kind());
        assert!(!info.is_bar_kind());
    }

    #[test]
    fn test_legend_starts_unresolved() {
        let legend = Legend::new(Color::new(9, 9, 9), Rect::new(0.0, 0.0, 10.0, 5.0), "sales");
        assert_eq!(legend.kind, PathKind::Unknown);
        assert_eq!(legend.text, "sales");
    }
}
