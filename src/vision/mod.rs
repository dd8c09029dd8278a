//! Skin-lesion image assessment.
//!
//! Inference itself happens behind [`SkinClassifier`]; this module owns the image
//! handle, label parsing, and the patient-facing wording of a result.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{AdvisorError, Result};

/// Raw image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinImage {
    bytes: Vec<u8>,
    mime_type: String,
}

impl SkinImage {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Result<Self> {
        let bytes = bytes.into();
        let mime_type = mime_type.into();
        if bytes.is_empty() {
            return Err(AdvisorError::ClassifierError("image data cannot be empty".to_string()));
        }
        if !mime_type.starts_with("image/") {
            return Err(AdvisorError::ClassifierError(format!(
                "expected an image MIME type, got '{}'",
                mime_type
            )));
        }
        Ok(Self { bytes, mime_type })
    }

    /// Read an image file, taking the MIME type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let mime_type = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            other => {
                return Err(AdvisorError::ClassifierError(format!(
                    "unsupported image extension '{}'",
                    other
                )));
            }
        };
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), size = bytes.len(), mime_type, "Read skin image");
        Self::from_bytes(bytes, mime_type)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// Binary lesion label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinLabel {
    Abnormal,
    Normal,
}

impl SkinLabel {
    /// Class names in model output order.
    pub const CLASS_NAMES: [&'static str; 2] = ["Abnormal(Ulcer)", "Normal(Healthy skin)"];

    pub fn class_name(&self) -> &'static str {
        match self {
            SkinLabel::Abnormal => Self::CLASS_NAMES[0],
            SkinLabel::Normal => Self::CLASS_NAMES[1],
        }
    }
}

impl fmt::Display for SkinLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for SkinLabel {
    type Err = AdvisorError;

    /// Accepts the model class names as well as plain `normal`/`abnormal`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if lower.starts_with("abnormal") {
            Ok(SkinLabel::Abnormal)
        } else if lower.starts_with("normal") {
            Ok(SkinLabel::Normal)
        } else {
            Err(AdvisorError::ClassifierError(format!("unknown skin label '{}'", s)))
        }
    }
}

/// A label and the classifier's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkinClassification {
    pub label: SkinLabel,
    pub confidence: f64,
}

impl SkinClassification {
    pub fn new(label: SkinLabel, confidence: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(AdvisorError::ClassifierError(format!(
                "confidence must be within 0-1, got {}",
                confidence
            )));
        }
        Ok(Self { label, confidence })
    }

    /// Take the arg-max of a probability vector ordered like [`SkinLabel::CLASS_NAMES`].
    pub fn from_probabilities(probabilities: &[f64]) -> Result<Self> {
        let [abnormal, normal] = probabilities else {
            return Err(AdvisorError::ClassifierError(format!(
                "expected 2 class probabilities, got {}",
                probabilities.len()
            )));
        };
        if abnormal >= normal {
            Self::new(SkinLabel::Abnormal, *abnormal)
        } else {
            Self::new(SkinLabel::Normal, *normal)
        }
    }

    /// Patient-facing explanation of the result.
    pub fn describe(&self) -> String {
        let percent = self.confidence * 100.0;
        match self.label {
            SkinLabel::Abnormal => format!(
                "🔍 The image shows an abnormality that may be an ulcer, such as one caused by diabetes \
                 (confidence {:.2}%).\n\n📌 Please see a specialist or a dermatology clinic for a proper examination.",
                percent
            ),
            SkinLabel::Normal => format!(
                "✅ No abnormality was found in this image (confidence {:.2}%).\n\n📌 If you still have \
                 symptoms, please consult a doctor to be sure.",
                percent
            ),
        }
    }
}

/// Image classification service (a CNN in practice).
pub trait SkinClassifier: Send + Sync {
    fn classify(&self, image: &SkinImage) -> Result<SkinClassification>;
}

/// Reply used when an image could not be assessed.
pub const UNASSESSABLE_IMAGE_REPLY: &str =
    "I couldn't assess this image. Please try again or use a different photo.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_validation() {
        assert!(SkinImage::from_bytes(vec![1, 2, 3], "image/png").is_ok());
        assert!(SkinImage::from_bytes(Vec::new(), "image/png").is_err());
        assert!(SkinImage::from_bytes(vec![1], "text/plain").is_err());
        assert!(SkinImage::from_path("lesion.gif").is_err());
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("Abnormal(Ulcer)".parse::<SkinLabel>().unwrap(), SkinLabel::Abnormal);
        assert_eq!("Normal(Healthy skin)".parse::<SkinLabel>().unwrap(), SkinLabel::Normal);
        assert_eq!(" normal ".parse::<SkinLabel>().unwrap(), SkinLabel::Normal);
        assert!("benign".parse::<SkinLabel>().is_err());
        assert_eq!(SkinLabel::Abnormal.to_string(), "Abnormal(Ulcer)");
    }

    #[test]
    fn test_from_probabilities() {
        let result = SkinClassification::from_probabilities(&[0.2, 0.8]).unwrap();
        assert_eq!(result.label, SkinLabel::Normal);
        assert_eq!(result.confidence, 0.8);

        assert!(SkinClassification::from_probabilities(&[1.0]).is_err());
        assert!(SkinClassification::from_probabilities(&[1.5, 0.1]).is_err());
    }

    #[test]
    fn test_describe_includes_confidence() {
        let abnormal = SkinClassification::new(SkinLabel::Abnormal, 0.9234).unwrap();
        assert!(abnormal.describe().contains("92.34%"));
        assert!(abnormal.describe().contains("specialist"));

        let normal = SkinClassification::new(SkinLabel::Normal, 0.5).unwrap();
        assert!(normal.describe().contains("50.00%"));
        assert!(normal.describe().contains("consult a doctor"));
    }
}
