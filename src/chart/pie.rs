//! Pie wedges and assembled pies.

use serde::{Deserialize, Serialize};

use crate::geometry::{Color, Path, Point};

/// One reconstructed arc wedge (a pie or donut slice, or a ring segment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcObject {
    /// Implied circle center.
    pub center: Point,
    /// Mean rim radius.
    pub radius: f64,
    /// Angular span in radians, always positive.
    pub angle: f64,
    /// Absolute start angle in `(-pi, pi]`.
    pub start_angle: f64,
    /// Absolute end angle in `(-pi, pi]`.
    pub end_angle: f64,
    /// True for a filled slice, false once relabeled as a donut ring part.
    pub is_pie_slice: bool,
    /// Paint color.
    pub color: Color,
    /// The originating geometry.
    pub path: Path,
    /// Fraction of the full circle, set when the owning pie completes.
    pub weight: f64,
}

impl ArcObject {
    /// Create a wedge with the slice flag set and no weight yet.
    pub fn new(
        center: Point,
        radius: f64,
        angle: f64,
        start_angle: f64,
        end_angle: f64,
        color: Color,
        path: Path,
    ) -> Self {
        Self {
            center,
            radius,
            angle,
            start_angle,
            end_angle,
            is_pie_slice: true,
            color,
            path,
            weight: 0.0,
        }
    }
}

/// A completed pie: the wedge set whose spans sum to a full circle.
///
/// Immutable once snapshotted, except for the ring relabeling that clears
/// `is_pie_slice` on donut parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pie {
    /// The member wedges, weights populated.
    pub parts: Vec<ArcObject>,
}

impl Pie {
    /// Mean center of the member wedges.
    pub fn center(&self) -> Option<Point> {
        if self.parts.is_empty() {
            return None;
        }
        let n = self.parts.len() as f64;
        let sx: f64 = self.parts.iter().map(|a| a.center.x).sum();
        let sy: f64 = self.parts.iter().map(|a| a.center.y).sum();
        Some(Point::new(sx / n, sy / n))
    }

    /// Mean radius of the member wedges.
    pub fn radius(&self) -> f64 {
        if self.parts.is_empty() {
            return 0.0;
        }
        self.parts.iter().map(|a| a.radius).sum::<f64>() / self.parts.len() as f64
    }

    /// Sum of the member spans in radians.
    pub fn total_angle(&self) -> f64 {
        self.parts.iter().map(|a| a.angle).sum()
    }
}
