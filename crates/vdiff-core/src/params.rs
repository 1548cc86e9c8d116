//! Persisted comparison parameters.
//!
//! The same field names are used in page URLs and in exported JSON, so the
//! loose value forms those carry (flags as strings or numbers, `corr_pts`
//! as embedded JSON text) are accepted on input. Output is always the
//! canonical form.

use std::path::Path;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::correspondence::{CorrespondenceHint, CorrespondencePointSet};
use crate::error::Result;
use crate::pipeline::config::{CompareMode, PipelineConfig};

/// The `corr_pts` value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CorrPts {
    Corners,
    #[default]
    Auto,
    Points(CorrespondencePointSet),
}

impl CorrPts {
    pub fn to_hint(&self) -> CorrespondenceHint {
        match self {
            Self::Corners => CorrespondenceHint::Corners,
            Self::Auto => CorrespondenceHint::Auto,
            Self::Points(set) => CorrespondenceHint::Points(set.clone()),
        }
    }

    /// Read a value given as a token, as JSON text or as a JSON object.
    /// Anything unreadable is treated as absent, which resolves to `auto`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => match s.trim() {
                "corners" => Self::Corners,
                "auto" | "" => Self::Auto,
                text => match serde_json::from_str::<Value>(text) {
                    Ok(inner @ Value::Object(_)) => Self::from_value(inner),
                    _ => {
                        warn!("Unreadable corr_pts text, using auto");
                        Self::Auto
                    }
                },
            },
            value @ Value::Object(_) => match serde_json::from_value(value) {
                Ok(set) => Self::Points(set),
                Err(e) => {
                    warn!(error = %e, "Malformed corr_pts object, using auto");
                    Self::Auto
                }
            },
            _ => Self::Auto,
        }
    }
}

impl Serialize for CorrPts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Corners => serializer.serialize_str("corners"),
            Self::Auto => serializer.serialize_str("auto"),
            Self::Points(set) => set.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CorrPts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::from_value(Value::deserialize(deserializer)?))
    }
}

impl From<&CorrespondenceHint> for CorrPts {
    fn from(hint: &CorrespondenceHint) -> Self {
        match hint {
            CorrespondenceHint::Corners => Self::Corners,
            CorrespondenceHint::Auto => Self::Auto,
            CorrespondenceHint::Points(set) => Self::Points(set.clone()),
        }
    }
}

/// `"false"`, `"0"` and `""` are false; any other string is true.
pub fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !matches!(s.as_str(), "false" | "0" | ""),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(parse_flag(&Value::deserialize(deserializer)?))
}

/// Only `"1"` and `"true"` (or their typed equivalents) enable.
fn strict_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<bool>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Bool(b) => Some(b),
        Value::Number(n) => Some(n.as_f64() == Some(1.0)),
        Value::String(s) => Some(matches!(s.as_str(), "1" | "true")),
        _ => Some(false),
    })
}

/// Everything needed to reproduce a comparison.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonParameters {
    /// Image 1 reference: path, URL or data URI.
    #[serde(default)]
    pub img1: String,
    #[serde(default)]
    pub img2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img1_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img2_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corr_pts: Option<CorrPts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img1_roi_xywh: Option<String>,
    /// True for global dissolve, false for local highlight.
    #[serde(default, deserialize_with = "flag")]
    pub mode: bool,
    #[serde(default, deserialize_with = "flag")]
    pub show_img1_right: bool,
    /// Noise reduction using binarized input.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "strict_flag")]
    pub nrbi: Option<bool>,
}

impl ComparisonParameters {
    pub fn new(img1: impl Into<String>, img2: impl Into<String>) -> Self {
        Self {
            img1: img1.into(),
            img2: img2.into(),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// The correspondence hint; absent `corr_pts` means `auto`.
    pub fn hint(&self) -> CorrespondenceHint {
        self.corr_pts
            .as_ref()
            .map(CorrPts::to_hint)
            .unwrap_or_default()
    }

    pub fn compare_mode(&self) -> CompareMode {
        CompareMode::from_global_flag(self.mode)
    }

    /// Override the options these parameters carry.
    pub fn apply_to(&self, config: &mut PipelineConfig) {
        config.mode = self.compare_mode();
        config.show_first_on_right = self.show_img1_right;
        if let Some(roi) = self.img1_roi_xywh.as_ref().filter(|s| !s.is_empty()) {
            config.roi = Some(roi.clone());
        }
        if let Some(nrbi) = self.nrbi {
            config.noise_reduction = nrbi;
        }
    }
}
