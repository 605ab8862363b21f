//! Registry of the assets the user has picked during one session.

use tracing::debug;

use crate::events::{EventBus, PickerEvent, SelectionChange, SelectionDirection};
use crate::picker::{Album, Asset};

/// Selected assets in selection order, keyed by asset identifier.
///
/// Per-album counts are computed from the selection every time so they can
/// never drift from it.
#[derive(Debug)]
pub struct SelectionTracker {
    selected: Vec<Asset>,
    events: EventBus,
}

impl SelectionTracker {
    pub fn new(events: EventBus) -> Self {
        Self {
            selected: Vec::new(),
            events,
        }
    }

    pub fn select(&mut self, asset: &Asset) {
        self.select_all(std::slice::from_ref(asset));
    }

    /// Add every asset not already selected; emits one `Selected` event
    /// with the assets that were actually added.
    pub fn select_all(&mut self, assets: &[Asset]) {
        let mut added = Vec::new();
        for asset in assets {
            if self.is_selected(asset) || added.iter().any(|a: &Asset| a.identifier() == asset.identifier()) {
                continue;
            }
            added.push(asset.clone());
        }
        if added.is_empty() {
            return;
        }
        debug!("Selected {} asset(s)", added.len());
        self.selected.extend(added.iter().cloned());
        self.notify(SelectionDirection::Selected, added);
    }

    pub fn deselect(&mut self, asset: &Asset) {
        self.deselect_all(std::slice::from_ref(asset));
    }

    pub fn deselect_all(&mut self, assets: &[Asset]) {
        let mut removed = Vec::new();
        for asset in assets {
            if let Some(pos) = self
                .selected
                .iter()
                .position(|a| a.identifier() == asset.identifier())
            {
                removed.push(self.selected.remove(pos));
            }
        }
        if removed.is_empty() {
            return;
        }
        debug!("Deselected {} asset(s)", removed.len());
        self.notify(SelectionDirection::Deselected, removed);
    }

    /// Drop the whole selection, e.g. when the picker is dismissed.
    pub fn clear(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        let removed = std::mem::take(&mut self.selected);
        self.notify(SelectionDirection::Deselected, removed);
    }

    pub fn is_selected(&self, asset: &Asset) -> bool {
        self.selected
            .iter()
            .any(|a| a.identifier() == asset.identifier())
    }

    pub fn count_for(&self, album: &dyn Album) -> usize {
        self.count_for_identifier(album.identifier())
    }

    pub fn count_for_identifier(&self, album_identifier: &str) -> usize {
        self.selected
            .iter()
            .filter(|a| a.album_identifier() == album_identifier)
            .count()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Snapshot of the selection in the order it was made.
    pub fn selected_assets(&self) -> Vec<Asset> {
        self.selected.clone()
    }

    fn notify(&self, direction: SelectionDirection, assets: Vec<Asset>) {
        self.events
            .emit(PickerEvent::SelectionChanged(SelectionChange { direction, assets }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::{PixelSize, Representation};

    fn asset(id: &str, album: &str) -> Asset {
        Asset::new(
            id,
            album,
            vec![Representation::url(format!("https://x/{id}.jpg"), PixelSize::new(10, 10))],
        )
        .unwrap()
    }

    fn tracker() -> (SelectionTracker, tokio::sync::broadcast::Receiver<PickerEvent>) {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        (SelectionTracker::new(bus), rx)
    }

    #[test]
    fn test_counts_follow_selection() {
        let (mut sel, _rx) = tracker();
        let a1 = asset("1", "A");
        let a2 = asset("2", "A");
        let b1 = asset("3", "B");

        sel.select(&a1);
        sel.select(&a2);
        sel.select(&b1);
        assert_eq!(sel.count_for_identifier("A"), 2);
        assert_eq!(sel.count_for_identifier("B"), 1);
        assert_eq!(sel.count_for_identifier("C"), 0);

        sel.deselect(&a1);
        assert_eq!(sel.count_for_identifier("A"), 1);
        sel.deselect(&a1);
        assert_eq!(sel.count_for_identifier("A"), 1);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_counts_match_projection_over_sequences() {
        let (mut sel, _rx) = tracker();
        let pool: Vec<Asset> = (0..12)
            .map(|i| asset(&i.to_string(), if i % 3 == 0 { "A" } else { "B" }))
            .collect();

        // Deterministic pseudo-random op sequence.
        let mut state: u32 = 7;
        for _ in 0..200 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let asset = &pool[(state >> 16) as usize % pool.len()];
            if (state >> 8) % 2 == 0 {
                sel.select(asset);
            } else {
                sel.deselect(asset);
            }
            for album in ["A", "B"] {
                let expected = sel
                    .selected_assets()
                    .iter()
                    .filter(|a| a.album_identifier() == album)
                    .count();
                assert_eq!(sel.count_for_identifier(album), expected);
            }
        }
    }

    #[test]
    fn test_selection_order_preserved() {
        let (mut sel, _rx) = tracker();
        sel.select(&asset("b", "A"));
        sel.select(&asset("a", "A"));
        sel.select(&asset("c", "B"));
        let ids: Vec<String> = sel
            .selected_assets()
            .iter()
            .map(|a| a.identifier().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_events_carry_direction_and_assets() {
        let (mut sel, mut rx) = tracker();
        let a1 = asset("1", "A");
        sel.select(&a1);
        sel.select(&a1); // duplicate, no event
        sel.deselect(&a1);

        match rx.try_recv().unwrap() {
            PickerEvent::SelectionChanged(change) => {
                assert_eq!(change.direction, SelectionDirection::Selected);
                assert_eq!(change.assets, vec![a1.clone()]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.try_recv().unwrap() {
            PickerEvent::SelectionChanged(change) => {
                assert_eq!(change.direction, SelectionDirection::Deselected);
                assert_eq!(change.assets, vec![a1]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_select_all_dedupes_within_batch() {
        let (mut sel, mut rx) = tracker();
        let a1 = asset("1", "A");
        sel.select_all(&[a1.clone(), a1.clone(), asset("2", "A")]);
        assert_eq!(sel.len(), 2);
        match rx.try_recv().unwrap() {
            PickerEvent::SelectionChanged(change) => assert_eq!(change.assets.len(), 2),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_clear_emits_deselected() {
        let (mut sel, mut rx) = tracker();
        sel.select_all(&[asset("1", "A"), asset("2", "B")]);
        let _ = rx.try_recv();
        sel.clear();
        assert!(sel.is_empty());
        match rx.try_recv().unwrap() {
            PickerEvent::SelectionChanged(change) => {
                assert_eq!(change.direction, SelectionDirection::Deselected);
                assert_eq!(change.assets.len(), 2);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        sel.clear();
        assert!(rx.try_recv().is_err());
    }
}
