use async_trait::async_trait;

use super::album::Album;
use crate::error::PickerError;

/// Owns every album of one provider for the length of a picker session.
///
/// Album order is display order and identifiers never repeat.
#[async_trait]
pub trait AlbumManager: Send + Sync {
    fn title(&self) -> &str;

    fn albums(&self) -> Vec<&dyn Album>;

    fn album_mut(&mut self, identifier: &str) -> Option<&mut dyn Album>;

    fn has_more_albums_to_load(&self) -> bool;

    /// Load the first page of albums. Returns immediately if albums are
    /// already loaded.
    async fn load_albums(&mut self) -> Result<(), PickerError>;

    /// Append the next page of albums; a no-op for providers without
    /// album-list paging.
    async fn load_next_batch_of_albums(&mut self) -> Result<(), PickerError>;

    fn album(&self, identifier: &str) -> Option<&dyn Album> {
        self.albums()
            .into_iter()
            .find(|a| a.identifier() == identifier)
    }

    fn index_of(&self, identifier: &str) -> Option<usize> {
        self.albums()
            .iter()
            .position(|a| a.identifier() == identifier)
    }
}
