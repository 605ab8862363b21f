use serde::{Deserialize, Serialize};

/// Photo sources the picker knows how to browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Library,
    Facebook,
    Instagram,
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Library => "library",
            Provider::Facebook => "facebook",
            Provider::Instagram => "instagram",
        }
    }

    /// Name shown to users in error messages.
    pub fn service_name(&self) -> &str {
        match self {
            Provider::Library => "Photos",
            Provider::Facebook => "Facebook",
            Provider::Instagram => "Instagram",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_serde_lowercase() {
        let json = serde_json::to_string(&Provider::Instagram).unwrap();
        assert_eq!(json, "\"instagram\"");
        let back: Provider = serde_json::from_str("\"facebook\"").unwrap();
        assert_eq!(back, Provider::Facebook);
    }

    #[test]
    fn test_service_name() {
        assert_eq!(Provider::Facebook.service_name(), "Facebook");
        assert_eq!(Provider::Library.as_str(), "library");
    }
}
