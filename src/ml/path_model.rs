//! ONNX path-model wrapper.
//!
//! Loads the exported path classifier with tract and serves single-path
//! predictions through [`FallbackClassifier`]. A missing artifact is not
//! an error: the model slot stays empty and every query answers `None`,
//! leaving the orchestrator with the geometric verdict.

use crate::error::{Error, Result};
use crate::ml::{remap_label, FallbackClassifier, FeatureScaler, FEATURE_DIM};
use std::path::Path;
use tract_onnx::prelude::*;

type TractPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// The fallback path classifier: a tract-onnx ensemble plus the min-max
/// feature scaler exported with it.
pub struct PathModel {
    model: Option<TractPlan>,
    scaler: Option<FeatureScaler>,
}

impl PathModel {
    /// Load the model artifact and its feature-range table.
    ///
    /// A missing model file yields a degraded instance that classifies
    /// nothing; a present-but-corrupt file or table is an error.
    pub fn load(model_path: &Path, range_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            log::warn!(
                "path model not found at {}, fallback classification disabled",
                model_path.display()
            );
            return Ok(Self {
                model: None,
                scaler: None,
            });
        }

        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .map_err(|e| Error::Model(format!("failed to load path model: {}", e)))?
            .into_optimized()
            .map_err(|e| Error::Model(format!("failed to optimize path model: {}", e)))?
            .into_runnable()
            .map_err(|e| Error::Model(format!("failed to plan path model: {}", e)))?;
        let scaler = FeatureScaler::load_from_file(range_path)?;
        log::info!("path model loaded from {}", model_path.display());

        Ok(Self {
            model: Some(model),
            scaler: Some(scaler),
        })
    }

    /// True when a model is loaded and queries can be answered.
    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    fn run(&self, features: &[f64; FEATURE_DIM]) -> Result<i32> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::ModelUnavailable("path model not loaded".into()))?;
        let scaler = self
            .scaler
            .as_ref()
            .ok_or_else(|| Error::ModelUnavailable("feature scaler not loaded".into()))?;

        let mut scaled = *features;
        scaler.scale(&mut scaled);
        let input = tract_ndarray::Array2::from_shape_fn((1, FEATURE_DIM), |(_, j)| {
            scaled[j] as f32
        });
        let outputs = model
            .run(tvec!(Tensor::from(input).into()))
            .map_err(|e| Error::Model(format!("path model inference failed: {}", e)))?;

        // output 0 is the predicted class, either as an int label or as
        // per-class scores to argmax
        let first = &outputs[0];
        if let Ok(view) = first.to_array_view::<i64>() {
            return view
                .iter()
                .next()
                .map(|&l| l as i32)
                .ok_or_else(|| Error::Model("empty model output".into()));
        }
        let scores = first
            .to_array_view::<f32>()
            .map_err(|e| Error::Model(format!("unexpected output type: {}", e)))?;
        let best = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i as i32)
            .ok_or_else(|| Error::Model("empty model output".into()))?;
        Ok(best)
    }
}

impl FallbackClassifier for PathModel {
    fn classify(&self, features: &[f64; FEATURE_DIM]) -> Option<i32> {
        if self.model.is_none() {
            return None;
        }
        match self.run(features) {
            Ok(raw) => Some(remap_label(raw)),
            Err(e) => {
                log::warn!("path model degraded: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_degrades() {
        let model = PathModel::load(
            Path::new("nonexistent/path_model.onnx"),
            Path::new("nonexistent/feature_range.json"),
        )
        .unwrap();
        assert!(!model.is_available());
        assert!(model.classify(&[0.0; FEATURE_DIM]).is_none());
    }
}
