pub mod adapter;
pub mod components;
pub mod config;
pub mod item;
pub mod system;
