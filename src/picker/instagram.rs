//! Instagram media feed, presented as a single timeline album.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use super::album::Album;
use super::asset::Asset;
use super::manager::AlbumManager;
use super::remote::{json_u32, ProviderClient};
use super::session::TransportError;
use super::types::{PixelSize, Representation};
use crate::error::PickerError;

/// Resolutions Instagram reports per media item.
const RESOLUTION_KEYS: &[&str] = &["standard_resolution", "low_resolution", "thumbnail"];

const AUTH_FAILURE_SIGNATURE: &str = "OAuthAccessTokenException";

/// The user's own media, newest first.
///
/// Instagram has no album entities, so the identifier is generated once
/// per session.
pub struct InstagramAlbum {
    identifier: String,
    assets: Vec<Asset>,
    next_url: Option<String>,
    client: ProviderClient,
}

impl InstagramAlbum {
    pub fn new(client: ProviderClient) -> Self {
        Self {
            identifier: Uuid::new_v4().to_string(),
            assets: Vec::new(),
            next_url: None,
            client,
        }
    }

    /// Add the token (unless the URL already carries one) and page size.
    fn request_url(&self, url: &str, token: &str) -> Result<String, PickerError> {
        let mut parsed = Url::parse(url).map_err(|e| {
            debug!("Bad Instagram URL {}: {}", url, e);
            PickerError::service_access(self.client.provider())
        })?;
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(k, _)| k != "count")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let has_token = pairs.iter().any(|(k, _)| k == "access_token");
        {
            let mut query = parsed.query_pairs_mut();
            query.clear().extend_pairs(&pairs);
            if !has_token {
                query.append_pair("access_token", token);
            }
            query.append_pair("count", &self.client.page_size().to_string());
        }
        Ok(parsed.into())
    }

    async fn fetch_page(&mut self, url: &str, replace: bool) -> Result<(), PickerError> {
        let token = self.client.require_token()?;
        let url = self.request_url(url, &token)?;

        let body = match self.client.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                return self
                    .client
                    .page_failure(e, !self.assets.is_empty(), is_auth_failure)
            }
        };

        let (new_assets, next_url) = parse_media_page(&body, &self.identifier)
            .ok_or_else(|| self.client.malformed_page())?;
        debug!(
            "Instagram page: {} assets, more={}",
            new_assets.len(),
            next_url.is_some()
        );

        if replace {
            self.assets = new_assets;
        } else {
            self.assets.extend(new_assets);
        }
        self.next_url = next_url;
        Ok(())
    }
}

#[async_trait]
impl Album for InstagramAlbum {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn localized_name(&self) -> Option<&str> {
        Some("Instagram")
    }

    fn number_of_assets(&self) -> Option<usize> {
        Some(self.assets.len())
    }

    fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn has_more_assets_to_load(&self) -> bool {
        self.next_url.is_some()
    }

    async fn load_assets(&mut self) -> Result<(), PickerError> {
        let url = self.client.base_url().to_string();
        self.fetch_page(&url, true).await
    }

    async fn load_next_batch_of_assets(&mut self) -> Result<(), PickerError> {
        let Some(url) = self.next_url.clone() else {
            return Ok(());
        };
        self.fetch_page(&url, false).await
    }

    async fn cover_asset(&self) -> Result<Option<Asset>, PickerError> {
        Ok(self.assets.first().cloned())
    }
}

impl std::fmt::Debug for InstagramAlbum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<InstagramAlbum: '{}'>", self.identifier)
    }
}

/// Manager holding the single Instagram timeline album.
pub struct InstagramAlbumManager {
    albums: Vec<InstagramAlbum>,
    client: ProviderClient,
}

impl InstagramAlbumManager {
    pub fn new(client: ProviderClient) -> Self {
        Self {
            albums: Vec::new(),
            client,
        }
    }
}

#[async_trait]
impl AlbumManager for InstagramAlbumManager {
    fn title(&self) -> &str {
        "Instagram"
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
        false
    }

    /// Creates the timeline album and loads its first page, so a dead
    /// token is reported here rather than on first scroll.
    async fn load_albums(&mut self) -> Result<(), PickerError> {
        if !self.albums.is_empty() {
            return Ok(());
        }
        let mut album = InstagramAlbum::new(self.client.clone());
        album.load_assets().await?;
        info!("Loaded Instagram timeline with {} assets", album.assets.len());
        self.albums.push(album);
        Ok(())
    }

    async fn load_next_batch_of_albums(&mut self) -> Result<(), PickerError> {
        Ok(())
    }
}

pub(crate) fn is_auth_failure(err: &TransportError) -> bool {
    err.body()
        .is_some_and(|body| body.contains(AUTH_FAILURE_SIGNATURE))
}

/// Representations of one `images` object, skipping incomplete entries.
fn representations(images: &Value) -> Vec<Representation> {
    RESOLUTION_KEYS
        .iter()
        .filter_map(|key| {
            let image = &images[*key];
            let width = json_u32(&image["width"])?;
            let height = json_u32(&image["height"])?;
            let url = image["url"].as_str()?;
            Url::parse(url).ok()?;
            Some(Representation::url(url, PixelSize::new(width, height)))
        })
        .collect()
}

/// Parse a media page. Carousel posts expand into one asset per item,
/// identified as `{id}-{index}`.
pub(crate) fn parse_media_page(
    body: &Value,
    album_identifier: &str,
) -> Option<(Vec<Asset>, Option<String>)> {
    let pagination = body.get("pagination")?.as_object()?;
    let data = body.get("data")?.as_array()?;
    let next_url = pagination
        .get("next_url")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut assets = Vec::new();
    for item in data {
        let media: Vec<&Value> = match item["carousel_media"].as_array() {
            Some(carousel) => carousel
                .iter()
                .map(|m| &m["images"])
                .filter(|images| images.is_object())
                .collect(),
            None if item["images"].is_object() => vec![&item["images"]],
            None => Vec::new(),
        };
        let Some(id) = item["id"].as_str() else {
            debug!("Skipping Instagram media without id");
            continue;
        };
        for (i, images) in media.into_iter().enumerate() {
            let asset = Asset::new(format!("{id}-{i}"), album_identifier, representations(images));
            assets.extend(asset);
        }
    }

    Some((assets, next_url))
}
