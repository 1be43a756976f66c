//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::FichasError;
use crate::extract::rules::{default_rules, KeywordRule};

/// Main configuration for the fichas pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FichasConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Counter-clockwise rotation applied to every image before recognition
    /// (0, 90, 180 or 270).
    pub rotate_degrees: u32,

    /// Maximum image dimension (longer side) for processing.
    pub max_image_size: u32,

    /// Keep `[UNK]` tokens emitted by the recognizer.
    pub keep_unk: bool,

    /// Extension of sidecar transcript files.
    pub sidecar_extension: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            rotate_degrees: 90,
            max_image_size: 2048,
            keep_unk: false,
            sidecar_extension: "txt".to_string(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Keyword rules, evaluated in ascending priority.
    pub rules: Vec<KeywordRule>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File stem used for the three artifacts.
    pub output_stem: String,

    /// Placeholder shown in the report for unset fields.
    pub missing_placeholder: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_stem: "personas_extraidas".to_string(),
            missing_placeholder: "N/A".to_string(),
        }
    }
}

impl FichasConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check settings that serde cannot enforce.
    pub fn validate(&self) -> crate::Result<()> {
        if self.ocr.rotate_degrees % 90 != 0 {
            return Err(FichasError::Config(format!(
                "ocr.rotate_degrees must be a multiple of 90, got {}",
                self.ocr.rotate_degrees
            )));
        }

        if let Some(rule) = self
            .extraction
            .rules
            .iter()
            .find(|r| r.keywords.iter().all(|k| k.trim().is_empty()))
        {
            return Err(FichasError::Config(format!(
                "extraction rule for {} has no keywords",
                rule.kind
            )));
        }

        if self.export.output_stem.trim().is_empty() {
            return Err(FichasError::Config("export.output_stem is empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::FieldKind;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: FichasConfig =
            serde_json::from_str(r#"{"export": {"output_stem": "fichas"}}"#).unwrap();

        assert_eq!(config.export.output_stem, "fichas");
        assert_eq!(config.export.missing_placeholder, "N/A");
        assert_eq!(config.ocr.rotate_degrees, 90);
        assert_eq!(config.extraction.rules.len(), FieldKind::ALL.len());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = FichasConfig::default();
        config.ocr.rotate_degrees = 0;
        config.save(&path).unwrap();

        let loaded = FichasConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.rotate_degrees, 0);
        assert_eq!(loaded.extraction.rules, config.extraction.rules);
    }

    #[test]
    fn test_validate() {
        assert!(FichasConfig::default().validate().is_ok());

        let mut config = FichasConfig::default();
        config.ocr.rotate_degrees = 45;
        assert!(matches!(config.validate(), Err(FichasError::Config(_))));

        let mut config = FichasConfig::default();
        config.extraction.rules[0].keywords = vec!["  ".to_string()];
        assert!(matches!(config.validate(), Err(FichasError::Config(_))));

        let mut config = FichasConfig::default();
        config.export.output_stem = String::new();
        assert!(matches!(config.validate(), Err(FichasError::Config(_))));
    }
}
