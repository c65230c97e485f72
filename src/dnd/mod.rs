//! Drag-and-drop contract between list surfaces and the form builder
//!
//! A finished gesture is reported as a `DropEvent` carrying the source and,
//! if the item landed on a valid target, the destination. `DragTracker`
//! turns pointer and keyboard gestures into those events.

use serde::{Deserialize, Serialize};

/// Identifier of a droppable container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerId {
    Catalog,
    Canvas,
    /// Any container the builder does not know about
    Other(String),
}

impl ContainerId {
    /// Whether items may be dropped into this container
    pub fn accepts_drops(&self) -> bool {
        matches!(self, ContainerId::Canvas)
    }
}

impl From<String> for ContainerId {
    fn from(s: String) -> Self {
        match s.as_str() {
            "catalog" => ContainerId::Catalog,
            "canvas" => ContainerId::Canvas,
            _ => ContainerId::Other(s),
        }
    }
}

impl From<ContainerId> for String {
    fn from(id: ContainerId) -> Self {
        id.to_string()
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerId::Catalog => write!(f, "catalog"),
            ContainerId::Canvas => write!(f, "canvas"),
            ContainerId::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A slot inside a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragLocation {
    pub container: ContainerId,
    pub index: usize,
}

impl DragLocation {
    pub fn new(container: ContainerId, index: usize) -> Self {
        Self { container, index }
    }

    pub fn catalog(index: usize) -> Self {
        Self::new(ContainerId::Catalog, index)
    }

    pub fn canvas(index: usize) -> Self {
        Self::new(ContainerId::Canvas, index)
    }
}

/// Completed drag gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
}

impl DropEvent {
    pub fn new(source: DragLocation, destination: Option<DragLocation>) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// Tracks a single in-flight drag gesture
#[derive(Debug, Default, Clone)]
pub struct DragTracker {
    source: Option<DragLocation>,
    target: Option<DragLocation>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up the item at `source`, replacing any gesture in flight
    pub fn begin(&mut self, source: DragLocation) {
        self.target = Some(source.clone());
        self.source = Some(source);
    }

    pub fn is_dragging(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<&DragLocation> {
        self.source.as_ref()
    }

    pub fn target(&self) -> Option<&DragLocation> {
        self.target.as_ref()
    }

    /// Update the slot under the pointer; `None` means outside every container
    pub fn hover(&mut self, target: Option<DragLocation>) {
        if self.source.is_some() {
            self.target = target;
        }
    }

    /// Shift the keyboard target by `delta` slots within its container.
    /// `len` is the number of items in that container; the slot past the
    /// last item is a valid drop position.
    pub fn nudge(&mut self, delta: isize, len: usize) {
        if let Some(target) = self.target.as_mut() {
            let max = len as isize;
            let next = (target.index as isize + delta).clamp(0, max.max(0));
            target.index = next as usize;
        }
    }

    /// Move the keyboard target to another container, keeping the slot in range
    pub fn retarget(&mut self, container: ContainerId, len: usize) {
        if self.source.is_none() {
            return;
        }
        let index = self.target.as_ref().map(|t| t.index).unwrap_or(0).min(len);
        self.target = Some(DragLocation::new(container, index));
    }

    /// Release the item. Targets that refuse drops resolve to no destination.
    pub fn finish(&mut self) -> Option<DropEvent> {
        let source = self.source.take()?;
        let destination = self
            .target
            .take()
            .filter(|target| target.container.accepts_drops());
        Some(DropEvent::new(source, destination))
    }

    pub fn cancel(&mut self) {
        self.source = None;
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_id_round_trips_through_strings() {
        assert_eq!(ContainerId::from("catalog".to_string()), ContainerId::Catalog);
        assert_eq!(ContainerId::from("canvas".to_string()), ContainerId::Canvas);
        assert_eq!(
            ContainerId::from("trash".to_string()),
            ContainerId::Other("trash".to_string())
        );
        assert_eq!(String::from(ContainerId::Canvas), "canvas");
    }

    #[test]
    fn test_drop_event_deserializes_null_destination() {
        let json = r#"{"source":{"container":"catalog","index":2},"destination":null}"#;
        let event: DropEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.source, DragLocation::catalog(2));
        assert!(event.destination.is_none());
    }

    #[test]
    fn test_finish_without_begin_yields_nothing() {
        let mut tracker = DragTracker::new();
        assert!(tracker.finish().is_none());
    }

    #[test]
    fn test_drop_on_catalog_has_no_destination() {
        let mut tracker = DragTracker::new();
        tracker.begin(DragLocation::catalog(1));
        tracker.hover(Some(DragLocation::catalog(3)));
        let event = tracker.finish().unwrap();
        assert_eq!(event.source, DragLocation::catalog(1));
        assert!(event.destination.is_none());
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn test_keyboard_drag_onto_canvas() {
        let mut tracker = DragTracker::new();
        tracker.begin(DragLocation::catalog(0));
        tracker.retarget(ContainerId::Canvas, 2);
        tracker.nudge(5, 2);
        let event = tracker.finish().unwrap();
        assert_eq!(event.destination, Some(DragLocation::canvas(2)));
    }

    #[test]
    fn test_nudge_clamps_at_zero() {
        let mut tracker = DragTracker::new();
        tracker.begin(DragLocation::canvas(1));
        tracker.nudge(-4, 3);
        assert_eq!(tracker.target(), Some(&DragLocation::canvas(0)));
    }

    #[test]
    fn test_hover_outside_and_cancel() {
        let mut tracker = DragTracker::new();
        tracker.begin(DragLocation::canvas(0));
        tracker.hover(None);
        assert!(tracker.target().is_none());
        tracker.cancel();
        assert!(tracker.finish().is_none());
    }
}
