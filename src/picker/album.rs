use async_trait::async_trait;

use super::asset::Asset;
use crate::error::PickerError;

/// A named, ordered collection of assets from one provider.
///
/// Pagination state is private to each implementation; callers only decide
/// *when* to ask for the next batch. Paging calls on one album are
/// serialized by `&mut self`.
#[async_trait]
pub trait Album: Send + Sync {
    /// Unique within the owning [`AlbumManager`](super::AlbumManager).
    fn identifier(&self) -> &str;

    fn localized_name(&self) -> Option<&str>;

    /// Best-effort asset count; `None` while it is not known yet.
    fn number_of_assets(&self) -> Option<usize>;

    /// Assets loaded so far, in provider order.
    fn assets(&self) -> &[Asset];

    fn has_more_assets_to_load(&self) -> bool;

    /// (Re)load the first page, replacing `assets` and the cursor.
    async fn load_assets(&mut self) -> Result<(), PickerError>;

    /// Append the next page. Does nothing when there is no next page.
    async fn load_next_batch_of_assets(&mut self) -> Result<(), PickerError>;

    /// A representative asset for thumbnails, without a full load.
    async fn cover_asset(&self) -> Result<Option<Asset>, PickerError>;
}

impl std::fmt::Debug for dyn Album + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Album: '{}'>", self.identifier())
    }
}
