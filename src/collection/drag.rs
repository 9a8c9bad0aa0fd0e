//! Pointer-driven drag and drop as an explicit state machine.
//!
//! A drag only starts once the pointer has travelled past an activation
//! distance, so a plain click or tap on an item never reorders anything.
//! Releasing over a different item yields a [`DropIntent`] that the
//! collection manager turns into a remove-and-reinsert permutation.

use serde::{Deserialize, Serialize};

use super::item::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Activation distances in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragThresholds {
    pub mouse: f64,
    pub touch: f64,
}

impl Default for DragThresholds {
    fn default() -> Self {
        Self {
            mouse: 8.0,
            touch: 12.0,
        }
    }
}

impl DragThresholds {
    pub fn for_pointer(&self, pointer: PointerKind) -> f64 {
        match pointer {
            PointerKind::Mouse => self.mouse,
            PointerKind::Touch => self.touch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Move `active` to the slot currently held by `over`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIntent {
    pub active: ItemId,
    pub over: ItemId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer is down on an item but has not moved far enough yet.
    Armed {
        active: ItemId,
        origin: Point,
        pointer: PointerKind,
    },
    Dragging {
        active: ItemId,
        over: Option<ItemId>,
        pointer: PointerKind,
    },
}

impl DragState {
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Armed { .. } => "Armed",
            Self::Dragging { .. } => "Dragging",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragSession {
    thresholds: DragThresholds,
    state: DragState,
}

impl DragSession {
    pub fn new(thresholds: DragThresholds) -> Self {
        Self {
            thresholds,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The item being dragged, once the drag has activated.
    pub fn active(&self) -> Option<&ItemId> {
        match &self.state {
            DragState::Dragging { active, .. } => Some(active),
            _ => None,
        }
    }

    pub fn over(&self) -> Option<&ItemId> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            _ => None,
        }
    }

    /// Pointer pressed on `item`. Ignored unless idle.
    pub fn pointer_down(&mut self, item: ItemId, at: Point, pointer: PointerKind) {
        if self.state != DragState::Idle {
            tracing::debug!(
                "Ignoring pointer down while {}",
                self.state.state_name()
            );
            return;
        }
        self.state = DragState::Armed {
            active: item,
            origin: at,
            pointer,
        };
    }

    /// Pointer moved to `at`, currently above `hovered` (if any item).
    pub fn pointer_move(&mut self, at: Point, hovered: Option<ItemId>) {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        self.state = match state {
            DragState::Armed {
                active,
                origin,
                pointer,
            } => {
                if origin.distance(&at) >= self.thresholds.for_pointer(pointer) {
                    DragState::Dragging {
                        active,
                        over: hovered,
                        pointer,
                    }
                } else {
                    DragState::Armed {
                        active,
                        origin,
                        pointer,
                    }
                }
            }
            DragState::Dragging {
                active, pointer, ..
            } => DragState::Dragging {
                active,
                over: hovered,
                pointer,
            },
            DragState::Idle => DragState::Idle,
        };
    }

    /// Pointer released. Always returns to idle.
    pub fn pointer_up(&mut self) -> Option<DropIntent> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging {
                active,
                over: Some(over),
                ..
            } if over != active => Some(DropIntent { active, over }),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
