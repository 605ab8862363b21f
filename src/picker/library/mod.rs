//! Albums backed by the device photo library.
//!
//! The platform library sits behind the [`PhotoLibrary`] trait. Every call
//! on it may block, so albums and the manager only reach it through
//! `spawn_blocking`. [`MemoryLibrary`] is a complete in-process library
//! for hosts without a platform backend and for tests.

pub mod album;
pub mod backend;
pub mod manager;
pub mod memory;
pub mod types;

pub use album::LibraryAlbum;
pub use backend::PhotoLibrary;
pub use manager::LibraryAlbumManager;
pub use memory::MemoryLibrary;
pub use types::{
    AuthorizationStatus, ChangeDetails, Collection, FetchOptions, FetchResult, LibraryChange,
    LibraryError, LibraryItem, SmartAlbumKind,
};
