use crate::core::item::ItemId;

/// Index of a bubble inside the engine's current build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(pub usize);

/// Emitted once per completed enlarge / shrink transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Selected { bubble: BubbleId, item: ItemId },
    Deselected { bubble: BubbleId, item: ItemId },
}

impl SelectionEvent {
    pub fn item(&self) -> &ItemId {
        match self {
            SelectionEvent::Selected { item, .. } | SelectionEvent::Deselected { item, .. } => item,
        }
    }
}

/// Callbacks for selection transitions; invoked from `step()` as transitions settle.
pub trait BubblePickerListener: Send + Sync {
    fn on_bubble_selected(&mut self, item: &ItemId);
    fn on_bubble_deselected(&mut self, item: &ItemId);
    /// A press held on a bubble without moving.
    fn on_bubble_long_pressed(&mut self, _item: &ItemId) {}
}

/// Callbacks for raw pointer activity on the picker, fed by the gesture layer.
pub trait TouchListener: Send + Sync {
    fn on_touch_down(&mut self) {}
    fn on_touch_move(&mut self) {}
    fn on_touch_up(&mut self) {}
}
