use serde::Deserialize;
use std::{fs, path::Path};

/// Which of the two item sets is currently shown.
///
/// Written as a string in RON (`"Main"` / `"Secondary"`) so it survives layered config merging.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String")]
pub enum Mode {
    #[default]
    Main,
    Secondary,
}

impl TryFrom<String> for Mode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "main" => Ok(Mode::Main),
            "secondary" => Ok(Mode::Secondary),
            _ => Err(format!("unknown mode {value:?} (expected \"Main\" or \"Secondary\")")),
        }
    }
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Main => Mode::Secondary,
            Mode::Secondary => Mode::Main,
        }
    }
}

/// Stable identity of an item across the main and secondary lists.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Presentation data carried alongside an item. The simulation never reads it.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ItemPayload {
    pub title: Option<String>,
    pub image: Option<String>,
    /// Linear RGBA fill color.
    pub color: Option<[f32; 4]>,
    pub text_color: Option<[f32; 4]>,
    pub border_color: Option<[f32; 4]>,
}

/// One selectable entry supplied by the presentation layer.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PickerItem {
    pub id: ItemId,
    /// Primary size driver; expected to be non-negative.
    pub value: f32,
    #[serde(default)]
    pub secondary_value: Option<f32>,
    #[serde(default)]
    pub is_secondary: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default)]
    pub is_view_border_selected: bool,
    #[serde(default)]
    pub payload: ItemPayload,
}

impl PickerItem {
    pub fn new(id: impl Into<String>, value: f32) -> Self {
        Self {
            id: ItemId::new(id),
            value,
            secondary_value: None,
            is_secondary: false,
            is_selected: false,
            is_view_border_selected: false,
            payload: ItemPayload::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.payload.title = Some(title.into());
        self
    }

    pub fn with_secondary_value(mut self, value: f32) -> Self {
        self.secondary_value = Some(value);
        self
    }

    pub fn secondary(mut self) -> Self {
        self.is_secondary = true;
        self
    }

    pub fn selected(mut self) -> Self {
        self.is_selected = true;
        self
    }

    /// Items carrying a secondary value belong to both views.
    pub fn is_dual(&self) -> bool {
        self.secondary_value.is_some()
    }

    pub fn is_shown_in(&self, mode: Mode) -> bool {
        match mode {
            Mode::Main => !self.is_secondary,
            Mode::Secondary => self.is_secondary || self.is_dual(),
        }
    }

    /// Value driving size in the given mode.
    pub fn value_for(&self, mode: Mode) -> f32 {
        match (mode, self.secondary_value) {
            (Mode::Secondary, Some(v)) => v,
            _ => self.value,
        }
    }
}

/// On-disk item set: two independent lists, merged by [`crate::core::adapter::merge_item_sets`].
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ItemSetFile {
    pub main: Vec<PickerItem>,
    pub secondary: Vec<PickerItem>,
}

impl ItemSetFile {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read items: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }
}
