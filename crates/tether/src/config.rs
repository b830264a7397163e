use crate::error::Result;
use crate::layout::{LayoutMode, LayoutOptions};
use crate::physics::{Constraints, Preset};
use serde::{Deserialize, Serialize};

/// Everything a host can tune, loadable from one JSON document.
///
/// ```json
/// {
///   "mode": "byTags",
///   "layout": { "gridSize": 20, "columnSpacing": 260 },
///   "physics": { "preset": "storm", "maxOffset": 80 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub mode: LayoutMode,
    pub layout: LayoutOptions,
    pub physics: Constraints,
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Like [`EngineConfig::from_json_str`], but `preset` replaces any preset named in the
    /// `physics` section and acts as the base for the fields that section sets explicitly.
    pub fn from_json_with_preset(text: &str, preset: Option<Preset>) -> Result<Self> {
        let mut doc: serde_json::Value = serde_json::from_str(text)?;
        if let (Some(preset), Some(root)) = (preset, doc.as_object_mut()) {
            let physics = root
                .entry("physics")
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            if let Some(physics) = physics.as_object_mut() {
                physics.insert("preset".to_string(), preset.as_str().into());
            }
        }
        Ok(serde_json::from_value(doc)?)
    }
}
