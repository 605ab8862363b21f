//! photopicker: drive the picker's remote providers from a terminal.
//!
//! Lists albums and pages through assets exactly the way an embedding host
//! would, using tokens stored with `photopicker login`.

#![warn(clippy::all)]

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use photopicker_core::cli::{Cli, Command};
use photopicker_core::config::Config;
use photopicker_core::credentials::{CredentialStore, FileCredentialStore};
use photopicker_core::picker::{AlbumManager, PixelSize};
use photopicker_core::{PickerContext, PickerError, Provider};

/// Add a login hint to errors that need one.
fn explain(provider: Provider, err: PickerError) -> anyhow::Error {
    if err.requires_login() {
        anyhow::anyhow!("{err}\nRun `photopicker login --provider {provider}` with a fresh token.")
    } else {
        anyhow::Error::new(err)
    }
}

async fn load_manager(
    ctx: &PickerContext,
    provider: Provider,
) -> anyhow::Result<Box<dyn AlbumManager>> {
    let mut manager = ctx
        .remote_manager(provider)
        .ok_or_else(|| anyhow::anyhow!("{provider} is not available from the command line"))?;
    manager
        .load_albums()
        .await
        .map_err(|e| explain(provider, e))?;
    Ok(manager)
}

async fn run_albums(ctx: &PickerContext, provider: Provider, all: bool) -> anyhow::Result<()> {
    let mut manager = load_manager(ctx, provider).await?;
    while all && manager.has_more_albums_to_load() {
        manager
            .load_next_batch_of_albums()
            .await
            .map_err(|e| explain(provider, e))?;
    }

    println!("{} ({} albums)", manager.title(), manager.albums().len());
    for album in manager.albums() {
        let count = album
            .number_of_assets()
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        let cover = match album.cover_asset().await {
            Ok(Some(asset)) => asset
                .best_representation_for_size(PixelSize::ZERO)
                .locator
                .to_string(),
            Ok(None) => "-".to_string(),
            Err(e) => {
                tracing::warn!("No cover for {:?}: {}", album, e);
                "-".to_string()
            }
        };
        println!(
            "  {}  {}  [{}]  {}",
            album.identifier(),
            album.localized_name().unwrap_or("(untitled)"),
            count,
            cover
        );
    }
    if manager.has_more_albums_to_load() {
        println!("  ... more albums available (use --all)");
    }
    Ok(())
}

async fn run_assets(
    ctx: &PickerContext,
    provider: Provider,
    album_id: Option<String>,
    pages: u32,
    size: PixelSize,
) -> anyhow::Result<()> {
    let mut manager = load_manager(ctx, provider).await?;
    let album_id = match album_id {
        Some(id) => id,
        None => manager
            .albums()
            .first()
            .map(|a| a.identifier().to_string())
            .ok_or_else(|| anyhow::anyhow!("{provider} has no albums"))?,
    };
    let album = manager
        .album_mut(&album_id)
        .ok_or_else(|| anyhow::anyhow!("No album '{album_id}' on {provider}"))?;

    // Instagram's timeline arrives with its first page already loaded.
    if album.assets().is_empty() {
        album.load_assets().await.map_err(|e| explain(provider, e))?;
    }
    for _ in 1..pages.max(1) {
        if !album.has_more_assets_to_load() {
            break;
        }
        album
            .load_next_batch_of_assets()
            .await
            .map_err(|e| explain(provider, e))?;
    }

    println!(
        "{} ({} assets loaded{})",
        album.localized_name().unwrap_or(&album_id),
        album.assets().len(),
        if album.has_more_assets_to_load() {
            ", more available"
        } else {
            ""
        }
    );
    for asset in album.assets() {
        let rep = asset.best_representation_for_size(size);
        println!("  {}  {}  {}", asset.identifier(), rep.size, rep.locator);
    }
    Ok(())
}

fn run_login(store: &dyn CredentialStore, provider: Provider, token: String) -> anyhow::Result<()> {
    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("Refusing to store an empty token");
    }
    store.set_token(provider, Some(token))?;
    println!("Stored {} token", provider.service_name());
    Ok(())
}

fn run_logout(store: &dyn CredentialStore, provider: Provider) -> anyhow::Result<()> {
    store.set_token(provider, None)?;
    println!("Removed {} token", provider.service_name());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.global.log_level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_cli(&cli.global)?;
    tracing::debug!(?config, "Starting photopicker");

    let store = Arc::new(
        FileCredentialStore::open(&config.credentials_dir).with_context(|| {
            format!(
                "Failed to open credential store in {}",
                config.credentials_dir.display()
            )
        })?,
    );

    match cli.command {
        Command::Login { provider, token } => run_login(store.as_ref(), provider.into(), token),
        Command::Logout { provider } => run_logout(store.as_ref(), provider.into()),
        Command::Albums { provider, all } => {
            let ctx = PickerContext::with_http(config.picker, store)?;
            run_albums(&ctx, provider.into(), all).await
        }
        Command::Assets {
            provider,
            album,
            pages,
            size,
        } => {
            let ctx = PickerContext::with_http(config.picker, store)?;
            run_assets(&ctx, provider.into(), album, pages, size).await
        }
    }
}
