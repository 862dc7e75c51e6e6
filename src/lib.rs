pub mod app;
pub mod core;
pub mod interaction;
pub mod physics;
pub mod rendering;

// Curated re-exports
pub use app::picker::{
    BubbleDeselected, BubblePickerAppPlugin, BubblePickerPlugin, BubbleSelected, Picker, PickerItems,
    RebuildPicker, SetPickerMode,
};
pub use core::config::PickerConfig;
pub use core::item::{ItemId, Mode, PickerItem};
pub use physics::engine::PickerEngine;
pub use physics::events::{BubbleId, BubblePickerListener, SelectionEvent, TouchListener};
