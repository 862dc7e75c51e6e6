pub mod bubbles;
pub mod camera;
pub mod palette;
