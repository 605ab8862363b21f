use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::backend::PhotoLibrary;
use super::types::{
    Collection, FetchOptions, FetchResult, LibraryChange, LibraryError, LibraryItem,
};
use crate::error::PickerError;
use crate::picker::album::Album;
use crate::picker::asset::Asset;

/// One collection of the device photo library.
///
/// Loads everything in one go; there is never a next page.
pub struct LibraryAlbum {
    collection: Collection,
    library: Arc<dyn PhotoLibrary>,
    assets: Vec<Asset>,
    /// Baseline for change details, set by the last successful load.
    fetch_result: Option<FetchResult>,
}

impl LibraryAlbum {
    pub fn new(collection: Collection, library: Arc<dyn PhotoLibrary>) -> Self {
        Self {
            collection,
            library,
            assets: Vec::new(),
            fetch_result: None,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Blocking fetch of the whole collection.
    pub(crate) fn fetch_blocking(
        library: &dyn PhotoLibrary,
        collection: &Collection,
    ) -> Result<FetchResult, LibraryError> {
        library.fetch_assets(collection, &FetchOptions::album())
    }

    /// Take a finished fetch as the album's contents and change baseline.
    pub(crate) fn apply_fetch(&mut self, result: FetchResult) {
        self.assets = assets_from(&result.items, &self.collection.local_identifier);
        debug!(
            "Library album {} holds {} assets",
            self.collection.local_identifier,
            self.assets.len()
        );
        self.fetch_result = Some(result);
    }

    /// Assets `change` inserted into and removed from this album since the
    /// last load, as `(inserted, removed)`.
    ///
    /// `None` if the album was never loaded or the library has nothing to
    /// report for it.
    pub fn changed_assets(&self, change: &LibraryChange) -> Option<(Vec<Asset>, Vec<Asset>)> {
        let previous = self.fetch_result.as_ref()?;
        let details = self.library.change_details(previous, change)?;
        let id = &self.collection.local_identifier;
        Some((
            assets_from(&details.inserted, id),
            assets_from(&details.removed, id),
        ))
    }
}

fn assets_from(items: &[LibraryItem], album_identifier: &str) -> Vec<Asset> {
    items
        .iter()
        .filter_map(|item| item.to_asset(album_identifier))
        .collect()
}

#[async_trait]
impl Album for LibraryAlbum {
    fn identifier(&self) -> &str {
        &self.collection.local_identifier
    }

    fn localized_name(&self) -> Option<&str> {
        self.collection.title.as_deref()
    }

    fn number_of_assets(&self) -> Option<usize> {
        if self.fetch_result.is_none() {
            self.collection.estimated_count
        } else {
            Some(self.assets.len())
        }
    }

    fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn has_more_assets_to_load(&self) -> bool {
        false
    }

    async fn load_assets(&mut self) -> Result<(), PickerError> {
        let library = Arc::clone(&self.library);
        let collection = self.collection.clone();
        let result = tokio::task::spawn_blocking(move || {
            Self::fetch_blocking(library.as_ref(), &collection)
        })
        .await
        .map_err(LibraryError::from)??;
        self.apply_fetch(result);
        Ok(())
    }

    async fn load_next_batch_of_assets(&mut self) -> Result<(), PickerError> {
        Ok(())
    }

    async fn cover_asset(&self) -> Result<Option<Asset>, PickerError> {
        let library = Arc::clone(&self.library);
        let collection = self.collection.clone();
        let item = tokio::task::spawn_blocking(move || library.key_item(&collection))
            .await
            .map_err(LibraryError::from)?;
        Ok(item.and_then(|i| i.to_asset(&self.collection.local_identifier)))
    }
}

impl std::fmt::Debug for LibraryAlbum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<LibraryAlbum: '{}'>", self.collection.local_identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::library::memory::MemoryLibrary;
    use crate::picker::library::types::{AuthorizationStatus, SmartAlbumKind};
    use crate::picker::types::PixelSize;

    fn item(id: &str) -> LibraryItem {
        LibraryItem::new(id, PixelSize::new(300, 200))
    }

    fn roll(library: &Arc<MemoryLibrary>) -> LibraryAlbum {
        let collection = library.smart_album(SmartAlbumKind::CameraRoll).unwrap();
        LibraryAlbum::new(collection, library.clone())
    }

    #[tokio::test]
    async fn test_load_assets_and_counts() {
        let library = Arc::new(MemoryLibrary::new(AuthorizationStatus::Authorized));
        let id = library.add_smart_album(
            SmartAlbumKind::CameraRoll,
            "Recents",
            vec![item("a"), item("b"), item("h").hidden()],
        );
        let mut album = roll(&library);

        // Before loading, the estimate (which counts the hidden item) is used.
        assert_eq!(album.number_of_assets(), Some(3));
        assert_eq!(album.localized_name(), Some("Recents"));

        album.load_assets().await.unwrap();
        assert_eq!(album.identifier(), id);
        assert_eq!(album.number_of_assets(), Some(2));
        assert!(!album.has_more_assets_to_load());
        assert!(album.assets().iter().all(|a| a.album_identifier() == id));
    }

    #[tokio::test]
    async fn test_emptied_album_counts_zero() {
        let library = Arc::new(MemoryLibrary::new(AuthorizationStatus::Authorized));
        library.add_smart_album(SmartAlbumKind::CameraRoll, "Recents", vec![item("a")]);
        let mut album = roll(&library);
        album.load_assets().await.unwrap();
        assert_eq!(album.number_of_assets(), Some(1));

        library.remove_item("a");
        album.load_assets().await.unwrap();
        assert!(album.assets().is_empty());
        assert_eq!(album.number_of_assets(), Some(0));
    }

    #[tokio::test]
    async fn test_next_batch_is_noop() {
        let library = Arc::new(MemoryLibrary::new(AuthorizationStatus::Authorized));
        library.add_smart_album(SmartAlbumKind::CameraRoll, "Recents", vec![item("a")]);
        let mut album = roll(&library);
        album.load_assets().await.unwrap();
        album.load_next_batch_of_assets().await.unwrap();
        assert_eq!(album.assets().len(), 1);
        assert!(!album.has_more_assets_to_load());
    }

    #[tokio::test]
    async fn test_load_failure_is_service_access() {
        let library = Arc::new(MemoryLibrary::new(AuthorizationStatus::Authorized));
        let id = library.add_smart_album(SmartAlbumKind::CameraRoll, "Recents", vec![item("a")]);
        library.set_failing(&id, true);
        let mut album = roll(&library);
        assert_eq!(
            album.load_assets().await.unwrap_err(),
            PickerError::service_access(crate::types::Provider::Library)
        );
    }

    #[tokio::test]
    async fn test_changed_assets() {
        let library = Arc::new(MemoryLibrary::new(AuthorizationStatus::Authorized));
        let id = library.add_smart_album(
            SmartAlbumKind::CameraRoll,
            "Recents",
            vec![item("a"), item("b")],
        );
        let mut album = roll(&library);
        let change = LibraryChange::default();
        assert!(album.changed_assets(&change).is_none());

        album.load_assets().await.unwrap();
        assert!(album.changed_assets(&change).is_none());

        library.insert_item(&[&id], item("c"));
        library.remove_item("a");
        let (inserted, removed) = album.changed_assets(&change).unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].identifier(), "c");
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].identifier(), "a");
        assert_eq!(removed[0].album_identifier(), id);
    }

    #[tokio::test]
    async fn test_cover_asset_without_load() {
        let library = Arc::new(MemoryLibrary::new(AuthorizationStatus::Authorized));
        library.add_smart_album(SmartAlbumKind::CameraRoll, "Recents", vec![item("a")]);
        let album = roll(&library);
        let first = album.cover_asset().await.unwrap().unwrap();
        let second = album.cover_asset().await.unwrap().unwrap();
        assert_eq!(first.identifier(), "a");
        assert_eq!(first, second);
        assert!(album.assets().is_empty());
    }
}
