use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::picker::PixelSize;
use crate::types::{LogLevel, Provider};

#[derive(Parser, Debug)]
#[command(
    name = "photopicker",
    about = "Browse Facebook and Instagram albums the way the photo picker sees them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Directory holding the stored provider tokens
    #[arg(
        long,
        env = "PHOTOPICKER_CREDENTIALS_DIR",
        default_value = "~/.photopicker",
        global = true
    )]
    pub credentials_dir: String,

    /// Assets or albums requested per page
    #[arg(long, default_value_t = 100, global = true)]
    pub page_size: usize,

    /// Retries for transient HTTP failures (0 disables)
    #[arg(long, default_value_t = 2, global = true)]
    pub max_retries: u32,

    /// Base delay in milliseconds between retries
    #[arg(long, default_value_t = 500, global = true)]
    pub retry_delay: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Fail on a paging error even when earlier pages loaded
    #[arg(long, global = true)]
    pub strict_paging_errors: bool,

    /// Override the Facebook Graph API base URL
    #[arg(long, env = "PHOTOPICKER_FACEBOOK_URL", global = true)]
    pub facebook_url: Option<String>,

    /// Override the Instagram recent-media URL
    #[arg(long, env = "PHOTOPICKER_INSTAGRAM_URL", global = true)]
    pub instagram_url: Option<String>,
}

/// Providers reachable from a terminal. The device library needs a
/// platform backend and is only available to embedding hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoteProvider {
    Facebook,
    Instagram,
}

impl From<RemoteProvider> for Provider {
    fn from(p: RemoteProvider) -> Self {
        match p {
            RemoteProvider::Facebook => Provider::Facebook,
            RemoteProvider::Instagram => Provider::Instagram,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a provider's albums
    Albums {
        #[arg(short, long, value_enum)]
        provider: RemoteProvider,

        /// Keep loading album pages until there are none left
        #[arg(long)]
        all: bool,
    },

    /// Load an album and print its assets
    Assets {
        #[arg(short, long, value_enum)]
        provider: RemoteProvider,

        /// Album identifier (default: the provider's first album)
        #[arg(short, long)]
        album: Option<String>,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Target display size used to pick a representation, as WxH
        #[arg(long, default_value = "300x300", value_parser = parse_pixel_size)]
        size: PixelSize,
    },

    /// Store an access token for a provider
    Login {
        #[arg(short, long, value_enum)]
        provider: RemoteProvider,

        /// Access token (prefer the environment variable over the flag)
        #[arg(long, env = "PHOTOPICKER_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Forget the stored token for a provider
    Logout {
        #[arg(short, long, value_enum)]
        provider: RemoteProvider,
    },
}

pub(crate) fn parse_pixel_size(s: &str) -> Result<PixelSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let width = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let height = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    Ok(PixelSize::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pixel_size() {
        assert_eq!(parse_pixel_size("640x480").unwrap(), PixelSize::new(640, 480));
        assert_eq!(parse_pixel_size("10X20").unwrap(), PixelSize::new(10, 20));
        assert!(parse_pixel_size("640").is_err());
        assert!(parse_pixel_size("ax1").is_err());
    }

    #[test]
    fn test_parse_assets_command() {
        let cli = Cli::try_parse_from([
            "photopicker",
            "assets",
            "--provider",
            "facebook",
            "--album",
            "A1",
            "--pages",
            "3",
            "--page-size",
            "25",
        ])
        .unwrap();
        assert_eq!(cli.global.page_size, 25);
        match cli.command {
            Command::Assets {
                provider,
                album,
                pages,
                size,
            } => {
                assert_eq!(provider, RemoteProvider::Facebook);
                assert_eq!(album.as_deref(), Some("A1"));
                assert_eq!(pages, 3);
                assert_eq!(size, PixelSize::new(300, 300));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_library_is_not_a_cli_provider() {
        assert!(Cli::try_parse_from(["photopicker", "albums", "--provider", "library"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["photopicker", "logout", "-p", "instagram"]).unwrap();
        assert_eq!(cli.global.log_level, LogLevel::Info);
        assert_eq!(cli.global.max_retries, 2);
        assert!(!cli.global.strict_paging_errors);
    }
}
