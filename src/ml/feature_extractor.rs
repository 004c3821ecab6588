//! Min-max feature scaling for the path model.
//!
//! The model was trained on features normalized per dimension with a
//! min-max table exported alongside the artifact. The table is JSON:
//! `{"feature_num": 28, "featrue_range": [min0, max0, min1, max1, ...]}`
//! (the key is misspelled in the shipped artifacts and kept as-is).

use crate::error::{Error, Result};
use crate::ml::FEATURE_DIM;
use ndarray::Array2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RangeTable {
    feature_num: usize,
    #[serde(rename = "featrue_range")]
    feature_range: Vec<f64>,
}

/// Per-dimension min-max scaler loaded from the exported range table.
#[derive(Debug, Clone)]
pub struct FeatureScaler {
    ranges: Vec<(f64, f64)>,
}

impl FeatureScaler {
    /// Load the range table from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a range table from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let table: RangeTable = serde_json::from_str(text)?;
        if table.feature_num != FEATURE_DIM || table.feature_range.len() != 2 * FEATURE_DIM {
            return Err(Error::Model(format!(
                "feature-range table has {} features, expected {}",
                table.feature_num, FEATURE_DIM
            )));
        }
        let ranges = table
            .feature_range
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        Ok(Self { ranges })
    }

    /// Scale one feature vector in place, clamping each dimension to
    /// `[0, 1]`. Degenerate ranges widen to 1e-2 as at training time.
    pub fn scale(&self, features: &mut [f64; FEATURE_DIM]) {
        for (x, &(min, max)) in features.iter_mut().zip(&self.ranges) {
            let span = if max - min <= 1e-6 { 1e-2 } else { max - min };
            *x = ((*x - min) / span).clamp(0.0, 1.0);
        }
    }

    /// Scale a batch of feature vectors into an `(n, 28)` f32 array
    /// ready for the tract input tensor.
    pub fn scale_batch(&self, batch: &[[f64; FEATURE_DIM]]) -> Array2<f32> {
        let mut out = Array2::zeros((batch.len(), FEATURE_DIM));
        for (i, features) in batch.iter().enumerate() {
            let mut row = *features;
            self.scale(&mut row);
            for (j, x) in row.iter().enumerate() {
                out[[i, j]] = *x as f32;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table_json() -> String {
        let mut ranges = Vec::new();
        for i in 0..FEATURE_DIM {
            ranges.push(format!("{}.0, {}.0", 0, (i + 1) * 2));
        }
        format!(
            "{{\"feature_num\": {}, \"featrue_range\": [{}]}}",
            FEATURE_DIM,
            ranges.join(", ")
        )
    }

    #[test]
    fn test_scale_clamps_and_normalizes() {
        let scaler = FeatureScaler::from_json(&table_json()).unwrap();
        let mut features = [0.0; FEATURE_DIM];
        features[0] = 1.0; // range (0, 2) -> 0.5
        features[1] = 8.0; // range (0, 4) -> clamped to 1.0
        features[2] = -3.0; // clamped to 0.0
        scaler.scale(&mut features);
        assert_eq!(features[0], 0.5);
        assert_eq!(features[1], 1.0);
        assert_eq!(features[2], 0.0);
    }

    #[test]
    fn test_wrong_dimension_rejected() {
        let bad = "{\"feature_num\": 4, \"featrue_range\": [0.0, 1.0]}";
        assert!(FeatureScaler::from_json(bad).is_err());
    }

    #[test]
    fn test_load_from_tempfile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(table_json().as_bytes()).unwrap();
        let scaler = FeatureScaler::load_from_file(file.path()).unwrap();
        assert_eq!(scaler.ranges.len(), FEATURE_DIM);
    }

    #[test]
    fn test_scale_batch_shape() {
        let scaler = FeatureScaler::from_json(&table_json()).unwrap();
        let batch = [[1.0; FEATURE_DIM], [2.0; FEATURE_DIM]];
        let scaled = scaler.scale_batch(&batch);
        assert_eq!(scaled.shape(), &[2, FEATURE_DIM]);
    }
}
