use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::debug;

use super::backend::PhotoLibrary;
use super::types::{
    AuthorizationStatus, ChangeDetails, Collection, FetchOptions, FetchResult, LibraryChange,
    LibraryError, LibraryItem, SmartAlbumKind,
};

#[derive(Debug)]
struct StoredCollection {
    title: Option<String>,
    smart: Option<SmartAlbumKind>,
    /// Overrides the item count as the estimate when set.
    estimated_count: Option<Option<usize>>,
    items: Vec<LibraryItem>,
}

#[derive(Debug)]
struct LibraryState {
    authorization: AuthorizationStatus,
    /// Insertion order is listing order for user albums.
    order: Vec<String>,
    collections: HashMap<String, StoredCollection>,
    failing: HashSet<String>,
    sequence: u64,
    next_id: u64,
}

/// A photo library held entirely in memory.
///
/// Every mutation broadcasts a [`LibraryChange`] to subscribers.
#[derive(Debug)]
pub struct MemoryLibrary {
    state: Mutex<LibraryState>,
    changes: broadcast::Sender<LibraryChange>,
}

impl MemoryLibrary {
    pub fn new(authorization: AuthorizationStatus) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(LibraryState {
                authorization,
                order: Vec::new(),
                collections: HashMap::new(),
                failing: HashSet::new(),
                sequence: 0,
                next_id: 0,
            }),
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LibraryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_authorization(&self, status: AuthorizationStatus) {
        self.lock().authorization = status;
    }

    /// Add a built-in album; returns its identifier.
    pub fn add_smart_album(
        &self,
        kind: SmartAlbumKind,
        title: &str,
        items: Vec<LibraryItem>,
    ) -> String {
        self.insert_collection(Some(kind), title, items)
    }

    /// Add a user album; returns its identifier.
    pub fn add_user_album(&self, title: &str, items: Vec<LibraryItem>) -> String {
        self.insert_collection(None, title, items)
    }

    fn insert_collection(
        &self,
        smart: Option<SmartAlbumKind>,
        title: &str,
        items: Vec<LibraryItem>,
    ) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("collection-{}", state.next_id);
        state.order.push(id.clone());
        state.collections.insert(
            id.clone(),
            StoredCollection {
                title: Some(title.to_string()),
                smart,
                estimated_count: None,
                items,
            },
        );
        id
    }

    /// Report `count` as the estimate for a collection instead of its
    /// real size, the way platform libraries sometimes do.
    pub fn set_estimated_count(&self, collection: &str, count: Option<usize>) {
        if let Some(stored) = self.lock().collections.get_mut(collection) {
            stored.estimated_count = Some(count);
        }
    }

    /// Make fetches of `collection` fail until cleared.
    pub fn set_failing(&self, collection: &str, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing.insert(collection.to_string());
        } else {
            state.failing.remove(collection);
        }
    }

    /// Add an item to the given collections and notify subscribers.
    pub fn insert_item(&self, collections: &[&str], item: LibraryItem) {
        {
            let mut state = self.lock();
            for id in collections {
                if let Some(stored) = state.collections.get_mut(*id) {
                    stored.items.push(item.clone());
                }
            }
        }
        self.notify();
    }

    /// Remove an item from every collection and notify subscribers.
    pub fn remove_item(&self, local_identifier: &str) {
        {
            let mut state = self.lock();
            for stored in state.collections.values_mut() {
                stored.items.retain(|i| i.local_identifier != local_identifier);
            }
        }
        self.notify();
    }

    fn notify(&self) {
        let change = {
            let mut state = self.lock();
            state.sequence += 1;
            LibraryChange {
                sequence: state.sequence,
            }
        };
        debug!("Library change {}", change.sequence);
        let _ = self.changes.send(change);
    }

    fn describe(id: &str, stored: &StoredCollection) -> Collection {
        Collection {
            local_identifier: id.to_string(),
            title: stored.title.clone(),
            estimated_count: stored
                .estimated_count
                .unwrap_or(Some(stored.items.len())),
        }
    }

    fn visible_items(stored: &StoredCollection, options: &FetchOptions) -> Vec<LibraryItem> {
        let mut items: Vec<LibraryItem> = stored
            .items
            .iter()
            .filter(|i| i.is_visible(options))
            .cloned()
            .collect();
        if options.newest_first {
            // Undated items sort last; ties keep insertion order.
            items.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));
        }
        items
    }
}

impl PhotoLibrary for MemoryLibrary {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.lock().authorization
    }

    fn smart_album(&self, kind: SmartAlbumKind) -> Option<Collection> {
        let state = self.lock();
        state.order.iter().find_map(|id| {
            let stored = state.collections.get(id)?;
            (stored.smart == Some(kind)).then(|| Self::describe(id, stored))
        })
    }

    fn user_albums(&self) -> Vec<Collection> {
        let state = self.lock();
        state
            .order
            .iter()
            .filter_map(|id| {
                let stored = state.collections.get(id)?;
                stored.smart.is_none().then(|| Self::describe(id, stored))
            })
            .collect()
    }

    fn fetch_assets(
        &self,
        collection: &Collection,
        options: &FetchOptions,
    ) -> Result<FetchResult, LibraryError> {
        let state = self.lock();
        let id = &collection.local_identifier;
        if state.failing.contains(id) {
            return Err(LibraryError::Unavailable(format!("fetch of {id} failed")));
        }
        let stored = state
            .collections
            .get(id)
            .ok_or_else(|| LibraryError::CollectionNotFound(id.clone()))?;
        Ok(FetchResult {
            collection_identifier: id.clone(),
            options: *options,
            items: Self::visible_items(stored, options),
        })
    }

    fn change_details(
        &self,
        previous: &FetchResult,
        _change: &LibraryChange,
    ) -> Option<ChangeDetails> {
        if !previous.options.wants_change_details {
            return None;
        }
        let state = self.lock();
        let current = match state.collections.get(&previous.collection_identifier) {
            Some(stored) => Self::visible_items(stored, &previous.options),
            None => Vec::new(),
        };

        let before: HashSet<&str> = previous
            .items
            .iter()
            .map(|i| i.local_identifier.as_str())
            .collect();
        let after: HashSet<&str> = current.iter().map(|i| i.local_identifier.as_str()).collect();

        let details = ChangeDetails {
            inserted: current
                .iter()
                .filter(|i| !before.contains(i.local_identifier.as_str()))
                .cloned()
                .collect(),
            removed: previous
                .items
                .iter()
                .filter(|i| !after.contains(i.local_identifier.as_str()))
                .cloned()
                .collect(),
        };
        if details.inserted.is_empty() && details.removed.is_empty() {
            None
        } else {
            Some(details)
        }
    }

    fn key_item(&self, collection: &Collection) -> Option<LibraryItem> {
        let state = self.lock();
        let stored = state.collections.get(&collection.local_identifier)?;
        Self::visible_items(stored, &FetchOptions::album())
            .into_iter()
            .next()
    }

    fn subscribe(&self) -> broadcast::Receiver<LibraryChange> {
        self.changes.subscribe()
    }
}
