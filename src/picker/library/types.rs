//! Value types exchanged with a [`PhotoLibrary`](super::PhotoLibrary).

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::PickerError;
use crate::picker::types::{PixelSize, Representation};
use crate::picker::Asset;
use crate::types::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

/// Built-in albums the picker lists ahead of user albums, in listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SmartAlbumKind {
    CameraRoll,
    Favorites,
    Selfies,
    DepthEffect,
    Panoramas,
}

impl SmartAlbumKind {
    pub const LISTING_ORDER: [SmartAlbumKind; 5] = [
        SmartAlbumKind::CameraRoll,
        SmartAlbumKind::Favorites,
        SmartAlbumKind::Selfies,
        SmartAlbumKind::DepthEffect,
        SmartAlbumKind::Panoramas,
    ];
}

/// An album as the library describes it, before any of its items are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub local_identifier: String,
    pub title: Option<String>,
    /// `None` when the library cannot tell without fetching.
    pub estimated_count: Option<usize>,
}

/// One photo in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryItem {
    pub local_identifier: String,
    pub pixel_size: PixelSize,
    pub creation_date: Option<DateTime<Utc>>,
    pub hidden: bool,
    /// Set on every member of a burst.
    pub burst_identifier: Option<String>,
    /// The member of a burst shown when bursts are collapsed.
    pub represents_burst: bool,
}

impl LibraryItem {
    pub fn new(local_identifier: impl Into<String>, pixel_size: PixelSize) -> Self {
        Self {
            local_identifier: local_identifier.into(),
            pixel_size,
            creation_date: None,
            hidden: false,
            burst_identifier: None,
            represents_burst: false,
        }
    }

    pub fn created_at(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn in_burst(mut self, burst: impl Into<String>, representative: bool) -> Self {
        self.burst_identifier = Some(burst.into());
        self.represents_burst = representative;
        self
    }

    /// Whether `options` let this item through.
    pub fn is_visible(&self, options: &FetchOptions) -> bool {
        if self.hidden && !options.include_hidden {
            return false;
        }
        if self.burst_identifier.is_some() && !self.represents_burst && !options.include_all_bursts
        {
            return false;
        }
        true
    }

    /// The picker's view of this item inside album `album_identifier`.
    pub fn to_asset(&self, album_identifier: &str) -> Option<Asset> {
        Asset::new(
            self.local_identifier.clone(),
            album_identifier,
            vec![Representation::library(
                self.local_identifier.clone(),
                self.pixel_size,
            )],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub newest_first: bool,
    pub include_hidden: bool,
    pub include_all_bursts: bool,
    pub wants_change_details: bool,
}

impl FetchOptions {
    /// Options every library album fetches with.
    pub fn album() -> Self {
        Self {
            newest_first: true,
            include_hidden: false,
            include_all_bursts: false,
            wants_change_details: true,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::album()
    }
}

/// The items of one collection at fetch time. Kept by an album as the
/// baseline later changes are described against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub collection_identifier: String,
    pub options: FetchOptions,
    pub items: Vec<LibraryItem>,
}

/// Notification that something in the library changed.
///
/// Carries no payload; what changed for a given fetch is asked of the
/// library through [`PhotoLibrary::change_details`](super::PhotoLibrary::change_details).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryChange {
    pub sequence: u64,
}

/// How a [`FetchResult`] differs from the library's current contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeDetails {
    pub inserted: Vec<LibraryItem>,
    pub removed: Vec<LibraryItem>,
}

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Collection {0} not found")]
    CollectionNotFound(String),

    #[error("Photo library unavailable: {0}")]
    Unavailable(String),

    #[error("Library task failed: {0}")]
    Spawn(#[from] tokio::task::JoinError),
}

impl From<LibraryError> for PickerError {
    fn from(e: LibraryError) -> Self {
        tracing::warn!("Photo library error: {}", e);
        PickerError::service_access(Provider::Library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_options() {
        let options = FetchOptions::album();
        assert!(options.newest_first);
        assert!(!options.include_hidden);
        assert!(!options.include_all_bursts);
        assert!(options.wants_change_details);
    }

    #[test]
    fn test_visibility() {
        let options = FetchOptions::album();
        let size = PixelSize::new(10, 10);
        assert!(LibraryItem::new("a", size).is_visible(&options));
        assert!(!LibraryItem::new("b", size).hidden().is_visible(&options));
        assert!(LibraryItem::new("c", size)
            .in_burst("B", true)
            .is_visible(&options));
        assert!(!LibraryItem::new("d", size)
            .in_burst("B", false)
            .is_visible(&options));

        let all = FetchOptions {
            include_hidden: true,
            include_all_bursts: true,
            ..options
        };
        assert!(LibraryItem::new("b", size).hidden().is_visible(&all));
        assert!(LibraryItem::new("d", size).in_burst("B", false).is_visible(&all));
    }

    #[test]
    fn test_to_asset_uses_library_locator() {
        let item = LibraryItem::new("L1", PixelSize::new(4032, 3024));
        let asset = item.to_asset("ALB").unwrap();
        assert_eq!(asset.identifier(), "L1");
        assert_eq!(asset.album_identifier(), "ALB");
        assert_eq!(
            asset.representations(),
            &[Representation::library("L1", PixelSize::new(4032, 3024))]
        );
    }

    #[test]
    fn test_library_error_maps_to_service_access() {
        let err: PickerError = LibraryError::Unavailable("offline".into()).into();
        assert_eq!(err, PickerError::service_access(Provider::Library));
    }
}
