//! photopicker-core: albums and assets from the device photo library,
//! Facebook and Instagram behind one set of async traits.
//!
//! Each provider has an [`AlbumManager`](picker::AlbumManager) that lists
//! [`Album`](picker::Album)s, which in turn page in their
//! [`Asset`](picker::Asset)s on demand. A [`PickerContext`](context::PickerContext)
//! ties a session together: credentials, the event bus and the selection.

#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod events;
pub mod picker;
pub mod retry;
pub mod selection;
pub mod types;

pub use context::PickerContext;
pub use error::{PickerError, RemedialAction};
pub use events::{EventBus, PickerEvent};
pub use selection::SelectionTracker;
pub use types::Provider;
