// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::match_like_matches_macro)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Chart Oxide
//!
//! Chart-structure reconstruction from PDF vector paths.
//!
//! PDF charts arrive as anonymous move/line/curve/close primitives with a
//! paint mode and a color. This crate classifies those raw paths into
//! typed chart records — bars, columns, trend lines, Bézier curves, area
//! bands, pie wedges — reassembles fragments, reconstructs pies and
//! donuts from wedge sets, filters out gridwork and tick marks, and
//! resolves legends and value-axis sides.
//!
//! ## Pipeline
//!
//! 1. **Geometry** ([`geometry`]): paths, rectangles, colors, oriented
//!    bounding boxes, shoelace areas.
//! 2. **Classification** ([`classify`]): per-path shape tests in a fixed
//!    decision order, wedge accumulation, deferred bar candidates.
//! 3. **Reconstruction** ([`chart`]): the chart aggregate — records,
//!    pies, axis metadata, legends — and the derived chart type.
//! 4. **Resolution**: legend/axis matching, calibration filtering, and
//!    fragment merging until the record set is stable.
//!
//! An optional statistical fallback classifier ([`ml`], behind the `ml`
//! feature) refines paths the geometric rules cannot place.
//!
//! ## Quick Start
//!
//! ```
//! use chart_oxide::{Chart, ClassifierConfig, PathClassifier};
//! use chart_oxide::geometry::{Color, PaintMode, Path, Point, RawPath, Rect};
//!
//! let mut chart = Chart::new(Rect::new(0.0, 0.0, 400.0, 300.0));
//! let series = RawPath::new(
//!     Path::new()
//!         .move_to(Point::new(20.0, 200.0))
//!         .line_to(Point::new(160.0, 120.0))
//!         .line_to(Point::new(320.0, 170.0)),
//!     PaintMode::Stroke,
//!     Color::new(30, 90, 200),
//! );
//!
//! let classifier = PathClassifier::new(ClassifierConfig::new());
//! classifier.classify_chart(&mut chart, &[series]);
//! assert_eq!(chart.path_infos.len(), 1);
//! ```

pub mod chart;
pub mod classify;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ml;

pub use chart::{
    ArcObject, AxisSideX, AxisSideY, Chart, ChartPathInfo, ChartType, Legend, PathKind, Pie,
};
pub use classify::PathClassifier;
pub use config::ClassifierConfig;
pub use error::{Error, Result};
pub use geometry::{Color, PaintMode, Path, PathSegment, Point, RawPath, Rect};
pub use ml::FallbackClassifier;
