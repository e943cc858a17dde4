//! Gesture control state: the on/off + intensity signal derived from each
//! classification.

use serde::Serialize;

use crate::material::UNKNOWN_LABEL;

/// Default threshold carried on the state for material-change detection.
pub const DEFAULT_CHANGE_THRESHOLD: f32 = 0.3;

/// A detected switch from one material label to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialChange {
    pub from: String,
    pub to: String,
}

/// Control state, mutated exactly once per classification cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureControlState {
    /// Sound is on while a recognizable material is in frame.
    pub on_off: bool,
    /// Intensity in `[0, 1]`. Mirrors `confidence` today but is tracked
    /// separately so another input can drive it later.
    pub range: f32,
    pub current_material: String,
    pub last_material: String,
    /// Top classification confidence in `[0, 1]`.
    pub confidence: f32,
    pub material_change_threshold: f32,
}

impl GestureControlState {
    pub fn new(material_change_threshold: f32) -> Self {
        Self {
            on_off: false,
            range: 0.5,
            current_material: String::new(),
            last_material: String::new(),
            confidence: 0.0,
            material_change_threshold,
        }
    }

    /// Apply one classification.
    ///
    /// Returns the change when `label` differs from the last material seen.
    /// Repeating the same input leaves the state untouched and reports no
    /// change.
    pub fn update(&mut self, label: &str, confidence: f32) -> Option<MaterialChange> {
        self.current_material.clear();
        self.current_material.push_str(label);
        self.on_off = is_sounding_label(label);
        self.confidence = confidence;
        self.range = confidence;

        if self.current_material != self.last_material {
            let change = MaterialChange {
                from: std::mem::replace(&mut self.last_material, self.current_material.clone()),
                to: self.current_material.clone(),
            };
            Some(change)
        } else {
            None
        }
    }

    /// Confidence scaled to a 0–255 display intensity.
    pub fn display_intensity(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 255.0) as u8
    }
}

impl Default for GestureControlState {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGE_THRESHOLD)
    }
}

/// A label turns sound on unless it is empty or the unknown sentinel.
pub fn is_sounding_label(label: &str) -> bool {
    !label.is_empty() && label != UNKNOWN_LABEL
}
