//! Backend-agnostic bubble simulation.

pub mod backend;
pub mod body;
pub mod engine;
pub mod events;
pub mod inbox;
pub mod layout;
pub mod rapier_backend;
pub mod sizing;
pub mod walls;

pub use backend::{BodyDesc, PhysicsBackend, PointConstraintDesc};
pub use body::{Body, Motion, PhysicalHandle, Settled};
pub use engine::{Bubble, BubbleView, ModeChange, PickerEngine, StepReport, TapOutcome};
pub use events::{BubbleId, BubblePickerListener, SelectionEvent, TouchListener};
pub use inbox::{PickerCommand, PickerInbox};
pub use rapier_backend::RapierBackend;
