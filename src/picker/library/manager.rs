use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::album::LibraryAlbum;
use super::backend::PhotoLibrary;
use super::types::{AuthorizationStatus, LibraryChange, LibraryError, SmartAlbumKind};
use crate::error::PickerError;
use crate::events::{AlbumChange, EventBus, PickerEvent};
use crate::picker::album::Album;
use crate::picker::manager::AlbumManager;

/// Albums of the device photo library.
///
/// Subscribes to library changes on construction; the subscription ends
/// when the manager is dropped.
pub struct LibraryAlbumManager {
    library: Arc<dyn PhotoLibrary>,
    albums: Vec<LibraryAlbum>,
    events: EventBus,
    changes: broadcast::Receiver<LibraryChange>,
}

impl LibraryAlbumManager {
    pub fn new(library: Arc<dyn PhotoLibrary>, events: EventBus) -> Self {
        let changes = library.subscribe();
        Self {
            library,
            albums: Vec::new(),
            events,
            changes,
        }
    }

    /// Build the album list. Smart albums are fetched in full so empty
    /// ones can be left out; user albums are trusted on their estimate.
    /// A smart album that fails to fetch is left out of the list.
    fn list_albums_blocking(library: Arc<dyn PhotoLibrary>) -> Vec<LibraryAlbum> {
        let mut albums = Vec::new();

        for kind in SmartAlbumKind::LISTING_ORDER {
            let Some(collection) = library.smart_album(kind) else {
                debug!("No {:?} album on this device", kind);
                continue;
            };
            let result = match LibraryAlbum::fetch_blocking(library.as_ref(), &collection) {
                Ok(result) => result,
                Err(e) => {
                    warn!("Skipping {:?} album: {}", kind, e);
                    continue;
                }
            };
            if result.items.is_empty() {
                debug!("Skipping empty {:?} album", kind);
                continue;
            }
            let mut album = LibraryAlbum::new(collection, Arc::clone(&library));
            album.apply_fetch(result);
            albums.push(album);
        }

        for collection in library.user_albums() {
            if collection.estimated_count == Some(0) {
                continue;
            }
            albums.push(LibraryAlbum::new(collection, Arc::clone(&library)));
        }

        albums
    }

    /// Work out what `change` did to each album, reload the affected ones
    /// and report them in a single `AlbumsUpdated` event once every reload
    /// has finished, successful or not.
    pub async fn apply_library_change(&mut self, change: &LibraryChange) -> Vec<AlbumChange> {
        let mut changes = Vec::new();
        for album in &self.albums {
            let Some((inserted, removed)) = album.changed_assets(change) else {
                continue;
            };
            if inserted.is_empty() && removed.is_empty() {
                continue;
            }
            let indexes_removed = removed
                .iter()
                .filter_map(|r| {
                    album
                        .assets()
                        .iter()
                        .position(|a| a.identifier() == r.identifier())
                })
                .collect();
            changes.push(AlbumChange {
                album_identifier: album.identifier().to_string(),
                assets_removed: removed,
                indexes_removed,
                assets_inserted: inserted,
            });
        }

        if changes.is_empty() {
            return changes;
        }

        let reloads = self
            .albums
            .iter_mut()
            .filter(|album| {
                changes
                    .iter()
                    .any(|c| c.album_identifier == album.identifier())
            })
            .map(|album| async move {
                if let Err(e) = album.load_assets().await {
                    warn!("Reload of {:?} after library change failed: {}", album, e);
                }
            });
        join_all(reloads).await;

        info!("Library change touched {} album(s)", changes.len());
        self.events.emit(PickerEvent::AlbumsUpdated(changes.clone()));
        changes
    }

    /// Wait for the next library change notification.
    ///
    /// Cancel-safe, so a host can `select!` it next to its own commands and
    /// pass the result to [`apply_library_change`](Self::apply_library_change).
    /// Missed notifications collapse into one change. `None` once the library
    /// has closed its change feed.
    pub async fn next_library_change(&mut self) -> Option<LibraryChange> {
        match self.changes.recv().await {
            Ok(change) => Some(change),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                debug!("Missed {} library change notification(s)", missed);
                Some(LibraryChange::default())
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Photo library closed its change feed");
                None
            }
        }
    }

    /// Apply library changes as they arrive until `cancel` fires or the
    /// library goes away.
    pub async fn watch_library_changes(&mut self, cancel: &CancellationToken) {
        loop {
            let change = tokio::select! {
                _ = cancel.cancelled() => break,
                change = self.next_library_change() => change,
            };
            let Some(change) = change else {
                break;
            };
            self.apply_library_change(&change).await;
        }
    }
}

#[async_trait]
impl AlbumManager for LibraryAlbumManager {
    fn title(&self) -> &str {
        "Albums"
    }

    fn albums(&self) -> Vec<&dyn Album> {
        self.albums.iter().map(|a| a as &dyn Album).collect()
    }

    fn album_mut(&mut self, identifier: &str) -> Option<&mut dyn Album> {
        self.albums
            .iter_mut()
            .find(|a| a.identifier() == identifier)
            .map(|a| a as &mut dyn Album)
    }

    fn has_more_albums_to_load(&self) -> bool {
        false
    }

    async fn load_albums(&mut self) -> Result<(), PickerError> {
        if !self.albums.is_empty() {
            return Ok(());
        }
        if self.library.authorization_status() != AuthorizationStatus::Authorized {
            return Err(PickerError::library_permission_denied());
        }

        let library = Arc::clone(&self.library);
        let albums = tokio::task::spawn_blocking(move || Self::list_albums_blocking(library))
            .await
            .map_err(LibraryError::from)?;
        info!("Listed {} library album(s)", albums.len());
        self.albums = albums;
        Ok(())
    }

    async fn load_next_batch_of_albums(&mut self) -> Result<(), PickerError> {
        Ok(())
    }
}
