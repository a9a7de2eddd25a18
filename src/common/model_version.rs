use serde::{Deserialize, Serialize};

/// Model selectors the service knows how to serve.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVersion {
    Yolo9,
    #[default] Yolo11,
}

impl ModelVersion {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Yolo9 => "yolo9",
            Self::Yolo11 => "yolo11",
        }
    }

    /// Resolves a request selector. Unlike a config default, an unrecognized
    /// name is reported rather than silently mapped.
    pub fn from_name(name: &str) -> Option<ModelVersion> {
        match name.trim().to_lowercase().as_str() {
            "yolo9" | "yolov9" => Some(ModelVersion::Yolo9),
            "yolo11" | "yolov11" => Some(ModelVersion::Yolo11),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Arrangement of the rows in a raw detection head output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredsLayout {
    /// `(1, boxes, 5 + nc)`: `cx, cy, w, h, objectness, class scores...`
    #[default]
    AnchorsFirst,
    /// `(1, 4 + nc, boxes)`: `cx, cy, w, h, class scores...`, no objectness.
    AnchorsLast,
}

impl PredsLayout {
    pub fn has_objectness(&self) -> bool {
        matches!(self, PredsLayout::AnchorsFirst)
    }

    /// Column where class scores begin.
    pub fn class_offset(&self) -> usize {
        if self.has_objectness() { 5 } else { 4 }
    }
}
