//! One picker session: configuration, credentials, events and the
//! current selection, handed to every manager it creates.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::PickerConfig;
use crate::credentials::CredentialStore;
use crate::events::{EventBus, PickerEvent};
use crate::picker::{
    AlbumManager, FacebookAlbumManager, HttpSession, InstagramAlbumManager, LibraryAlbumManager,
    PhotoLibrary, ProviderClient, ProviderSession,
};
use crate::selection::SelectionTracker;
use crate::types::Provider;

pub struct PickerContext {
    config: PickerConfig,
    credentials: Arc<dyn CredentialStore>,
    session: Box<dyn ProviderSession>,
    events: EventBus,
    selection: SelectionTracker,
}

impl PickerContext {
    pub fn new(
        config: PickerConfig,
        credentials: Arc<dyn CredentialStore>,
        session: Box<dyn ProviderSession>,
    ) -> Self {
        let events = EventBus::default();
        Self {
            config,
            credentials,
            session,
            selection: SelectionTracker::new(events.clone()),
            events,
        }
    }

    /// Context talking to the real provider endpoints over HTTP.
    pub fn with_http(
        config: PickerConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, reqwest::Error> {
        let session = HttpSession::new(config.timeout, config.retry.clone())?;
        Ok(Self::new(config, credentials, Box::new(session)))
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PickerEvent> {
        self.events.subscribe()
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionTracker {
        &mut self.selection
    }

    /// Client for a remote provider; `None` for the device library.
    pub fn client(&self, provider: Provider) -> Option<ProviderClient> {
        let base_url = match provider {
            Provider::Facebook => &self.config.facebook_url,
            Provider::Instagram => &self.config.instagram_url,
            Provider::Library => return None,
        };
        Some(
            ProviderClient::new(
                provider,
                base_url.as_str(),
                self.session.clone_box(),
                Arc::clone(&self.credentials),
            )
            .with_page_size(self.config.page_size)
            .with_paging_error_suppression(self.config.suppress_paging_errors),
        )
    }

    pub fn facebook_manager(&self) -> Option<FacebookAlbumManager> {
        let client = self.client(Provider::Facebook)?;
        Some(FacebookAlbumManager::new(client, self.events.clone()))
    }

    pub fn instagram_manager(&self) -> Option<InstagramAlbumManager> {
        self.client(Provider::Instagram).map(InstagramAlbumManager::new)
    }

    pub fn library_manager(&self, library: Arc<dyn PhotoLibrary>) -> LibraryAlbumManager {
        LibraryAlbumManager::new(library, self.events.clone())
    }

    /// Manager for a remote provider behind the common trait.
    pub fn remote_manager(&self, provider: Provider) -> Option<Box<dyn AlbumManager>> {
        match provider {
            Provider::Facebook => self
                .facebook_manager()
                .map(|m| Box::new(m) as Box<dyn AlbumManager>),
            Provider::Instagram => self
                .instagram_manager()
                .map(|m| Box::new(m) as Box<dyn AlbumManager>),
            Provider::Library => None,
        }
    }
}

impl std::fmt::Debug for PickerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickerContext")
            .field("config", &self.config)
            .field("selected", &self.selection.len())
            .finish_non_exhaustive()
    }
}
