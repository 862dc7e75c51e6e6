pub mod gesture;
pub mod input;
pub mod viewport;
