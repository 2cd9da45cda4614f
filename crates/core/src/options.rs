//! Processing parameters sent alongside an upload.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default page rasterisation resolution.
pub const DEFAULT_DPI: u32 = 150;
/// Default delay between page classifications, in seconds.
pub const DEFAULT_SLEEP_SEC: f64 = 3.0;
/// Default vision model used by the classifier.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Upper bound accepted for `dpi`. Higher values make page images too
/// large for the classifier.
pub const MAX_DPI: u32 = 600;

/// Per-job parameters forwarded to the backend as multipart form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    /// Resolution at which PDF pages are rendered before classification.
    pub dpi: u32,
    /// Throttle delay the backend sleeps after each page (rate limiting).
    pub sleep_sec: f64,
    /// Model identifier passed through to the inference provider.
    pub model: String,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            sleep_sec: DEFAULT_SLEEP_SEC,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ProcessingOptions {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(CoreError::Validation(format!(
                "dpi must be between 1 and {MAX_DPI}, got {}",
                self.dpi
            )));
        }
        if !self.sleep_sec.is_finite() || self.sleep_sec < 0.0 {
            return Err(CoreError::Validation(format!(
                "sleep_sec must be a non-negative number, got {}",
                self.sleep_sec
            )));
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::Validation(
                "model must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Form fields in the order the backend documents them.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("dpi", self.dpi.to_string()),
            ("sleep_sec", self.sleep_sec.to_string()),
            ("model", self.model.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let opts = ProcessingOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.dpi, 150);
        assert_eq!(opts.model, DEFAULT_MODEL);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let zero_dpi = ProcessingOptions {
            dpi: 0,
            ..Default::default()
        };
        assert_matches!(zero_dpi.validate(), Err(CoreError::Validation(_)));

        let negative_sleep = ProcessingOptions {
            sleep_sec: -1.0,
            ..Default::default()
        };
        assert_matches!(negative_sleep.validate(), Err(CoreError::Validation(_)));

        let blank_model = ProcessingOptions {
            model: " ".into(),
            ..Default::default()
        };
        assert_matches!(blank_model.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn form_fields_render_plain_numbers() {
        let opts = ProcessingOptions {
            dpi: 200,
            sleep_sec: 0.5,
            model: "m".into(),
        };
        let fields = opts.form_fields();
        assert_eq!(fields[0], ("dpi", "200".to_string()));
        assert_eq!(fields[1], ("sleep_sec", "0.5".to_string()));
        assert_eq!(fields[2], ("model", "m".to_string()));
    }
}
