use std::path::PathBuf;
use std::time::Duration;

use crate::cli::GlobalArgs;
use crate::retry::RetryConfig;
use crate::types::LogLevel;

pub const DEFAULT_FACEBOOK_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_INSTAGRAM_URL: &str = "https://api.instagram.com/v1/users/self/media/recent";

/// Settings shared by every manager in a picker session.
#[derive(Debug, Clone)]
pub struct PickerConfig {
    pub facebook_url: String,
    pub instagram_url: String,
    pub retry: RetryConfig,
    pub timeout: Duration,
    pub page_size: usize,
    /// Swallow paging failures once an album shows content.
    pub suppress_paging_errors: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            facebook_url: DEFAULT_FACEBOOK_URL.to_string(),
            instagram_url: DEFAULT_INSTAGRAM_URL.to_string(),
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(30),
            page_size: 100,
            suppress_paging_errors: true,
        }
    }
}

/// Configuration of the `photopicker` binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub picker: PickerConfig,
    pub credentials_dir: PathBuf,
    pub log_level: LogLevel,
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn check_url(name: &str, value: String) -> anyhow::Result<String> {
    url::Url::parse(&value).map_err(|e| anyhow::anyhow!("Invalid {name} '{value}': {e}"))?;
    Ok(value)
}

impl Config {
    pub fn from_cli(args: &GlobalArgs) -> anyhow::Result<Self> {
        if args.page_size == 0 {
            anyhow::bail!("--page-size must be at least 1");
        }
        if args.timeout == 0 {
            anyhow::bail!("--timeout must be at least 1 second");
        }

        let defaults = PickerConfig::default();
        let facebook_url = match args.facebook_url.clone() {
            Some(u) => check_url("Facebook URL", u)?,
            None => defaults.facebook_url,
        };
        let instagram_url = match args.instagram_url.clone() {
            Some(u) => check_url("Instagram URL", u)?,
            None => defaults.instagram_url,
        };

        let base_delay = Duration::from_millis(args.retry_delay);
        let retry = RetryConfig {
            max_retries: args.max_retries,
            base_delay,
            max_delay: defaults.retry.max_delay.max(base_delay),
        };

        Ok(Self {
            picker: PickerConfig {
                facebook_url,
                instagram_url,
                retry,
                timeout: Duration::from_secs(args.timeout),
                page_size: args.page_size,
                suppress_paging_errors: !args.strict_paging_errors,
            },
            credentials_dir: expand_tilde(&args.credentials_dir),
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalArgs {
        let mut argv = vec!["photopicker", "logout", "-p", "facebook"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn test_expand_tilde_with_home() {
        let result = expand_tilde("~/tokens");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(result, home.join("tokens"));
        }
    }

    #[test]
    fn test_expand_tilde_no_prefix() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("rel/path"), PathBuf::from("rel/path"));
    }

    #[test]
    fn test_from_cli_defaults() {
        let cfg = Config::from_cli(&global(&["--credentials-dir", "/tmp/pp"])).unwrap();
        assert_eq!(cfg.credentials_dir, PathBuf::from("/tmp/pp"));
        assert_eq!(cfg.picker.page_size, 100);
        assert!(cfg.picker.suppress_paging_errors);
        assert_eq!(cfg.picker.retry.max_retries, 2);
        assert_eq!(cfg.picker.retry.base_delay, Duration::from_millis(500));
        assert_eq!(cfg.picker.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_cli_overrides() {
        let cfg = Config::from_cli(&global(&[
            "--page-size",
            "10",
            "--max-retries",
            "0",
            "--retry-delay",
            "20000",
            "--strict-paging-errors",
            "--facebook-url",
            "http://127.0.0.1:9000",
        ]))
        .unwrap();
        assert_eq!(cfg.picker.page_size, 10);
        assert_eq!(cfg.picker.retry.max_retries, 0);
        assert_eq!(cfg.picker.retry.max_delay, Duration::from_secs(20));
        assert!(!cfg.picker.suppress_paging_errors);
        assert_eq!(cfg.picker.facebook_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.picker.instagram_url, DEFAULT_INSTAGRAM_URL);
    }

    #[test]
    fn test_from_cli_rejects_bad_values() {
        assert!(Config::from_cli(&global(&["--page-size", "0"])).is_err());
        assert!(Config::from_cli(&global(&["--timeout", "0"])).is_err());
        assert!(Config::from_cli(&global(&["--instagram-url", "not a url"])).is_err());
    }
}
