use thiserror::Error;

use crate::types::Provider;

/// Something the host can offer the user to fix a blocking error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemedialAction {
    /// Send the user to the system settings screen for this app.
    OpenSettings,
}

impl RemedialAction {
    pub fn button_title(&self) -> &'static str {
        match self {
            RemedialAction::OpenSettings => "Open Settings",
        }
    }
}

/// Errors surfaced by albums and album managers.
///
/// Malformed individual entries in a provider page are never reported;
/// they are dropped while parsing and only a failure of the whole page
/// becomes an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PickerError {
    #[error("{message}")]
    ServiceAccess { message: String },

    #[error("Not logged in to {provider}")]
    NotLoggedIn { provider: Provider },

    #[error("{title}: {message}")]
    PermissionDenied {
        title: String,
        message: String,
        action: RemedialAction,
    },
}

impl PickerError {
    /// Generic "could not reach the service" error for a provider.
    pub fn service_access(provider: Provider) -> Self {
        Self::ServiceAccess {
            message: format!(
                "There was an error trying to access {}.",
                provider.service_name()
            ),
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self::ServiceAccess {
            message: message.into(),
        }
    }

    /// Photo library access was refused by the user or by policy.
    pub fn library_permission_denied() -> Self {
        Self::PermissionDenied {
            title: "Permissions Required".to_string(),
            message: "Photo access has been restricted.\nYou can turn it back on in the system settings."
                .to_string(),
            action: RemedialAction::OpenSettings,
        }
    }

    /// The remedial action to offer, if any.
    pub fn remedial_action(&self) -> Option<RemedialAction> {
        match self {
            PickerError::PermissionDenied { action, .. } => Some(*action),
            _ => None,
        }
    }

    /// Whether the host should send the user back through login.
    pub fn requires_login(&self) -> bool {
        matches!(self, PickerError::NotLoggedIn { .. })
    }
}
