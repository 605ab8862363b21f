//! Session-scoped notifications from the picker core to the host.
//!
//! Each [`PickerContext`](crate::context::PickerContext) owns one bus.
//! Hosts subscribe for as long as they care and unsubscribe by dropping
//! the receiver.

use tokio::sync::broadcast;

use crate::picker::Asset;

/// Assets inserted into and removed from one album by a library change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumChange {
    pub album_identifier: String,
    pub assets_removed: Vec<Asset>,
    /// Positions the removed assets held in the album before the reload.
    pub indexes_removed: Vec<usize>,
    pub assets_inserted: Vec<Asset>,
}

impl AlbumChange {
    pub fn is_empty(&self) -> bool {
        self.assets_removed.is_empty() && self.assets_inserted.is_empty()
    }
}

/// A newly listed album and its position in the manager's album list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumAddition {
    pub album_identifier: String,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    Selected,
    Deselected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub direction: SelectionDirection,
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    /// Albums whose contents changed; all of them have finished reloading.
    AlbumsUpdated(Vec<AlbumChange>),
    AlbumsAdded(Vec<AlbumAddition>),
    SelectionChanged(SelectionChange),
}

/// Broadcast fan-out for [`PickerEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PickerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn emit(&self, event: PickerEvent) {
        // No receivers is fine: nobody is looking at the picker.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PickerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
