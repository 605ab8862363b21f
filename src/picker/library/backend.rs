use tokio::sync::broadcast;

use super::types::{
    AuthorizationStatus, ChangeDetails, Collection, FetchOptions, FetchResult, LibraryChange,
    LibraryError, LibraryItem, SmartAlbumKind,
};

/// The device photo library.
///
/// All methods may block on platform I/O; call them from a blocking
/// worker.
pub trait PhotoLibrary: Send + Sync + 'static {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// `None` when the platform has no such album.
    fn smart_album(&self, kind: SmartAlbumKind) -> Option<Collection>;

    fn user_albums(&self) -> Vec<Collection>;

    fn fetch_assets(
        &self,
        collection: &Collection,
        options: &FetchOptions,
    ) -> Result<FetchResult, LibraryError>;

    /// What `change` did to the contents of `previous`, or `None` if it
    /// did not touch them or `previous` was fetched without change details.
    fn change_details(&self, previous: &FetchResult, change: &LibraryChange)
        -> Option<ChangeDetails>;

    /// The item the library uses to represent `collection`.
    fn key_item(&self, collection: &Collection) -> Option<LibraryItem>;

    fn subscribe(&self) -> broadcast::Receiver<LibraryChange>;
}
