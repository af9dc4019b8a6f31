//! DOM events routed to the widgets.

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Escape,
    Enter,
    Other(String),
}

impl Key {
    /// Maps a `KeyboardEvent.key` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowDown" => Self::ArrowDown,
            "ArrowUp" => Self::ArrowUp,
            "Escape" => Self::Escape,
            "Enter" => Self::Enter,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Input,
    Change,
    Click,
    KeyDown(Key),
    MouseDown,
    Focus,
    Blur,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
}

impl Event {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self { kind, target }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub default_prevented: bool,
}
