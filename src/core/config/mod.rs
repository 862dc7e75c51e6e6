pub mod config;

pub use config::{
    BubbleSizeConfig, DragConfig, GestureConfig, GravityConfig, LayoutConfig, PickerConfig,
    SelectionConfig, SimulationConfig, SizingMode, WindowConfig,
};
