//! Facebook Graph API albums.
//!
//! The album list comes from `me/albums` and each album pages its photos
//! with the Graph `paging.cursors.after` token.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::album::Album;
use super::asset::Asset;
use super::manager::AlbumManager;
use super::remote::{encode_params, json_u32, ProviderClient};
use super::session::TransportError;
use super::types::{PixelSize, Representation};
use crate::error::PickerError;
use crate::events::{AlbumAddition, EventBus, PickerEvent};

const PHOTO_FIELDS: &str = "picture,source,id,images";
const ALBUM_FIELDS: &str = "id,name,count,cover_photo{source}";

/// Graph error codes for an invalid/expired token and an expired session.
const AUTH_ERROR_CODES: &[i64] = &[190, 102];

pub struct FacebookAlbum {
    identifier: String,
    localized_name: Option<String>,
    number_of_assets: Option<usize>,
    cover_photo_url: String,
    assets: Vec<Asset>,
    after: Option<String>,
    client: ProviderClient,
}

impl FacebookAlbum {
    pub fn new(
        identifier: impl Into<String>,
        localized_name: Option<String>,
        number_of_assets: Option<usize>,
        cover_photo_url: impl Into<String>,
        client: ProviderClient,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            localized_name,
            number_of_assets,
            cover_photo_url: cover_photo_url.into(),
            assets: Vec::new(),
            after: None,
            client,
        }
    }

    pub fn cover_photo_url(&self) -> &str {
        &self.cover_photo_url
    }

    fn photos_url(&self, token: &str, after: Option<&str>) -> String {
        let limit = self.client.page_size().to_string();
        let mut params = vec![
            ("fields", PHOTO_FIELDS),
            ("limit", limit.as_str()),
            ("access_token", token),
        ];
        if let Some(after) = after {
            params.push(("after", after));
        }
        format!(
            "{}/{}/photos?{}",
            self.client.base_url(),
            self.identifier,
            encode_params(&params)
        )
    }

    async fn fetch_page(&mut self, after: Option<String>) -> Result<(), PickerError> {
        let token = self.client.require_token()?;
        let url = self.photos_url(&token, after.as_deref());

        let body = match self.client.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                return self
                    .client
                    .page_failure(e, !self.assets.is_empty(), is_auth_failure)
            }
        };

        let (new_assets, next) =
            parse_photos_page(&body, &self.identifier).ok_or_else(|| self.client.malformed_page())?;
        debug!(
            "Facebook album '{}': {} assets, more={}",
            self.identifier,
            new_assets.len(),
            next.is_some()
        );

        if after.is_none() {
            self.assets = new_assets;
        } else {
            self.assets.extend(new_assets);
        }
        self.after = next;
        Ok(())
    }
}

#[async_trait]
impl Album for FacebookAlbum {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn localized_name(&self) -> Option<&str> {
        self.localized_name.as_deref()
    }

    fn number_of_assets(&self) -> Option<usize> {
        self.number_of_assets
    }

    fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn has_more_assets_to_load(&self) -> bool {
        self.after.is_some()
    }

    async fn load_assets(&mut self) -> Result<(), PickerError> {
        self.fetch_page(None).await
    }

    async fn load_next_batch_of_assets(&mut self) -> Result<(), PickerError> {
        let Some(after) = self.after.clone() else {
            return Ok(());
        };
        self.fetch_page(Some(after)).await
    }

    async fn cover_asset(&self) -> Result<Option<Asset>, PickerError> {
        Ok(Asset::new(
            self.cover_photo_url.clone(),
            self.identifier.clone(),
            vec![Representation::url(
                self.cover_photo_url.clone(),
                PixelSize::ZERO,
            )],
        ))
    }
}

impl std::fmt::Debug for FacebookAlbum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<FacebookAlbum: '{}'>", self.identifier)
    }
}

/// Every album of the logged-in Facebook account, paged from `me/albums`.
pub struct FacebookAlbumManager {
    albums: Vec<FacebookAlbum>,
    after: Option<String>,
    client: ProviderClient,
    events: EventBus,
}

impl FacebookAlbumManager {
    pub fn new(client: ProviderClient, events: EventBus) -> Self {
        Self {
            albums: Vec::new(),
            after: None,
            client,
            events,
        }
    }

    fn albums_url(&self, token: &str, after: Option<&str>) -> String {
        let limit = self.client.page_size().to_string();
        let mut params = vec![
            ("fields", ALBUM_FIELDS),
            ("limit", limit.as_str()),
            ("access_token", token),
        ];
        if let Some(after) = after {
            params.push(("after", after));
        }
        format!("{}/me/albums?{}", self.client.base_url(), encode_params(&params))
    }

    /// Fetch one page of albums and append the ones not seen yet.
    /// Returns the indexes of the appended albums.
    async fn fetch_albums(&mut self, after: Option<String>) -> Result<Vec<usize>, PickerError> {
        let token = self.client.require_token()?;
        let url = self.albums_url(&token, after.as_deref());

        let body = match self.client.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                return self
                    .client
                    .page_failure(e, !self.albums.is_empty(), is_auth_failure)
                    .map(|()| Vec::new())
            }
        };

        let (entries, next) = parse_albums_page(&body).ok_or_else(|| self.client.malformed_page())?;

        let mut added = Vec::new();
        for entry in entries {
            if self.albums.iter().any(|a| a.identifier == entry.identifier) {
                continue;
            }
            added.push(self.albums.len());
            self.albums.push(FacebookAlbum::new(
                entry.identifier,
                entry.name,
                entry.count,
                entry.cover_url,
                self.client.clone(),
            ));
        }
        self.after = next;
        Ok(added)
    }
}

#[async_trait]
impl AlbumManager for FacebookAlbumManager {
    fn title(&self) -> &str {
        "Facebook"
    }

    fn albums(&self) -> Vec<&dyn Album> {
        self.albums.iter().map(|a| a as &dyn Album).collect()
    }

    fn album_mut(&mut self, identifier: &str) -> Option<&mut dyn Album> {
        self.albums
            .iter_mut()
            .find(|a| a.identifier == identifier)
            .map(|a| a as &mut dyn Album)
    }

    fn has_more_albums_to_load(&self) -> bool {
        self.after.is_some()
    }

    async fn load_albums(&mut self) -> Result<(), PickerError> {
        if !self.albums.is_empty() {
            return Ok(());
        }
        let added = self.fetch_albums(None).await?;
        info!("Loaded {} Facebook albums", added.len());
        Ok(())
    }

    async fn load_next_batch_of_albums(&mut self) -> Result<(), PickerError> {
        let Some(after) = self.after.clone() else {
            return Ok(());
        };
        let added = self.fetch_albums(Some(after)).await?;
        if !added.is_empty() {
            let additions = added
                .into_iter()
                .map(|index| AlbumAddition {
                    album_identifier: self.albums[index].identifier.clone(),
                    index,
                })
                .collect();
            self.events.emit(PickerEvent::AlbumsAdded(additions));
        }
        Ok(())
    }
}

/// Graph reports a dead token as an `error` object with code 190 (or 102
/// for an expired session).
pub(crate) fn is_auth_failure(err: &TransportError) -> bool {
    let Some(body) = err.body() else {
        return false;
    };
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return false;
    };
    json["error"]["code"]
        .as_i64()
        .is_some_and(|code| AUTH_ERROR_CODES.contains(&code))
}

/// The `after` cursor, present only while Graph advertises a next page.
fn next_cursor(body: &Value) -> Option<String> {
    let paging = body.get("paging")?;
    paging.get("next")?;
    paging["cursors"]["after"].as_str().map(str::to_string)
}

/// Parse a `{album}/photos` page. `None` means the page itself is unusable;
/// photos missing required fields are skipped.
pub(crate) fn parse_photos_page(
    body: &Value,
    album_identifier: &str,
) -> Option<(Vec<Asset>, Option<String>)> {
    let data = body.get("data")?.as_array()?;

    let mut assets = Vec::with_capacity(data.len());
    for photo in data {
        let (Some(id), Some(images)) = (photo["id"].as_str(), photo["images"].as_array()) else {
            debug!("Skipping Facebook photo without id/images");
            continue;
        };
        let representations = images
            .iter()
            .filter_map(|image| {
                let source = image["source"].as_str()?;
                let width = json_u32(&image["width"])?;
                let height = json_u32(&image["height"])?;
                Some(Representation::url(source, PixelSize::new(width, height)))
            })
            .collect();
        if let Some(asset) = Asset::new(id, album_identifier, representations) {
            assets.push(asset);
        }
    }

    Some((assets, next_cursor(body)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AlbumEntry {
    pub identifier: String,
    pub name: Option<String>,
    pub count: Option<usize>,
    pub cover_url: String,
}

/// Parse a `me/albums` page. Albums without an id or cover are skipped.
pub(crate) fn parse_albums_page(body: &Value) -> Option<(Vec<AlbumEntry>, Option<String>)> {
    let data = body.get("data")?.as_array()?;

    let entries = data
        .iter()
        .filter_map(|album| {
            let identifier = album["id"].as_str()?.to_string();
            let cover_url = album["cover_photo"]["source"].as_str()?.to_string();
            Some(AlbumEntry {
                identifier,
                name: album["name"].as_str().map(str::to_string),
                count: album["count"].as_u64().map(|c| c as usize),
                cover_url,
            })
        })
        .collect();

    Some((entries, next_cursor(body)))
}
