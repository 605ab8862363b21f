//! Albums and assets from every photo source behind one set of traits.

pub mod album;
pub mod asset;
pub mod facebook;
pub mod instagram;
pub mod library;
pub mod manager;
pub mod remote;
pub mod session;
pub mod types;

pub use album::Album;
pub use asset::Asset;
pub use facebook::{FacebookAlbum, FacebookAlbumManager};
pub use instagram::{InstagramAlbum, InstagramAlbumManager};
pub use library::{LibraryAlbum, LibraryAlbumManager, MemoryLibrary, PhotoLibrary};
pub use manager::AlbumManager;
pub use remote::ProviderClient;
pub use session::{HttpSession, ProviderSession, SessionResponse, TransportError};
pub use types::{Locator, PixelSize, Representation};
