//! Plumbing shared by the paged HTTP providers: token lookup, request
//! dispatch, and the mapping from transport failures to picker errors.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::session::{ProviderSession, TransportError};
use crate::credentials::CredentialStore;
use crate::error::PickerError;
use crate::types::Provider;

/// How a provider recognizes an invalid or expired credential in a
/// failed response.
pub(crate) type AuthSignature = fn(&TransportError) -> bool;

/// Everything a remote album or manager needs to talk to its provider.
pub struct ProviderClient {
    provider: Provider,
    base_url: String,
    page_size: usize,
    suppress_paging_errors: bool,
    session: Box<dyn ProviderSession>,
    credentials: Arc<dyn CredentialStore>,
}

impl ProviderClient {
    pub fn new(
        provider: Provider,
        base_url: impl Into<String>,
        session: Box<dyn ProviderSession>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            page_size: 100,
            suppress_paging_errors: true,
            session,
            credentials,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Whether a paging failure after a successful page is swallowed.
    pub fn with_paging_error_suppression(mut self, suppress: bool) -> Self {
        self.suppress_paging_errors = suppress;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The stored token, or a service error if there is none. Checked
    /// before every request so that no call goes out unauthenticated.
    pub(crate) fn require_token(&self) -> Result<String, PickerError> {
        self.credentials.token(self.provider).ok_or_else(|| {
            debug!("No {} token in credential store", self.provider);
            PickerError::service_access(self.provider)
        })
    }

    /// GET `url`, persisting any token the session renewed on the way.
    pub(crate) async fn fetch(&self, url: &str) -> Result<Value, TransportError> {
        debug!("{} GET {}", self.provider, redact_token(url));
        let response = self.session.get_json(url).await?;
        if let Some(token) = response.renewed_token {
            debug!("{} token renewed", self.provider);
            if let Err(e) = self.credentials.set_token(self.provider, Some(token)) {
                warn!("Failed to store renewed {} token: {}", self.provider, e);
            }
        }
        Ok(response.body)
    }

    /// Turn a failed page request into the caller's result.
    ///
    /// Once an album has content on screen, later paging failures are
    /// logged and dropped when suppression is on.
    pub(crate) fn page_failure(
        &self,
        err: TransportError,
        has_content: bool,
        is_auth_failure: AuthSignature,
    ) -> Result<(), PickerError> {
        if has_content && self.suppress_paging_errors {
            warn!("Ignoring {} paging failure: {}", self.provider, err);
            return Ok(());
        }
        if is_auth_failure(&err) {
            return Err(PickerError::NotLoggedIn {
                provider: self.provider,
            });
        }
        Err(match err {
            TransportError::Network(msg) => PickerError::with_message(msg),
            _ => PickerError::service_access(self.provider),
        })
    }

    /// A page arrived but did not have the expected envelope.
    pub(crate) fn malformed_page(&self) -> PickerError {
        warn!("Malformed {} page", self.provider);
        PickerError::service_access(self.provider)
    }
}

impl Clone for ProviderClient {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider,
            base_url: self.base_url.clone(),
            page_size: self.page_size,
            suppress_paging_errors: self.suppress_paging_errors,
            session: self.session.clone_box(),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Percent-encode query pairs in the given order.
pub(crate) fn encode_params(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hide the `access_token` query value so URLs can be logged.
pub(crate) fn redact_token(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.query_pairs().any(|(k, _)| k == "access_token") {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" {
                "REDACTED".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

pub(crate) fn json_u32(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedSession;
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::picker::session::SessionResponse;
    use serde_json::json;

    fn client(session: &ScriptedSession, store: Arc<MemoryCredentialStore>) -> ProviderClient {
        ProviderClient::new(
            Provider::Instagram,
            "https://api.example.com/",
            Box::new(session.clone()),
            store,
        )
    }

    fn never_auth(_: &TransportError) -> bool {
        false
    }

    fn always_auth(_: &TransportError) -> bool {
        true
    }

    #[test]
    fn test_encode_params_keeps_order() {
        let encoded = encode_params(&[("fields", "id,images"), ("limit", "100"), ("q", "a b")]);
        assert_eq!(encoded, "fields=id%2Cimages&limit=100&q=a%20b");
    }

    #[test]
    fn test_redact_token() {
        let url = "https://api.example.com/media?access_token=SECRET&count=5";
        let redacted = redact_token(url);
        assert!(!redacted.contains("SECRET"));
        assert!(redacted.contains("access_token=REDACTED"));
        assert!(redacted.contains("count=5"));
        assert_eq!(redact_token("not a url"), "not a url");
    }

    #[test]
    fn test_base_url_trimmed() {
        let session = ScriptedSession::new();
        let c = client(&session, Arc::new(MemoryCredentialStore::new()));
        assert_eq!(c.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_require_token_missing() {
        let session = ScriptedSession::new();
        let c = client(&session, Arc::new(MemoryCredentialStore::new()));
        assert_eq!(
            c.require_token().unwrap_err(),
            PickerError::service_access(Provider::Instagram)
        );
    }

    #[tokio::test]
    async fn test_fetch_stores_renewed_token() {
        let session = ScriptedSession::new();
        session.push(Ok(SessionResponse {
            body: json!({"ok": true}),
            renewed_token: Some("fresh".into()),
        }));
        let store = Arc::new(MemoryCredentialStore::with_token(Provider::Instagram, "stale"));
        let c = client(&session, store.clone());
        let body = c.fetch("https://api.example.com/x").await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(store.token(Provider::Instagram).as_deref(), Some("fresh"));
    }

    #[test]
    fn test_page_failure_mapping() {
        let session = ScriptedSession::new();
        let c = client(&session, Arc::new(MemoryCredentialStore::new()));
        let status = TransportError::Status {
            status: 400,
            body: String::new(),
        };

        assert_eq!(
            c.page_failure(status.clone(), false, always_auth),
            Err(PickerError::NotLoggedIn {
                provider: Provider::Instagram
            })
        );
        assert_eq!(
            c.page_failure(status.clone(), false, never_auth),
            Err(PickerError::service_access(Provider::Instagram))
        );
        assert_eq!(
            c.page_failure(TransportError::Network("offline".into()), false, never_auth),
            Err(PickerError::with_message("offline"))
        );
        // Content already on screen: swallowed, even for auth failures.
        assert_eq!(c.page_failure(status, true, always_auth), Ok(()));
    }

    #[test]
    fn test_strict_paging_errors() {
        let session = ScriptedSession::new();
        let c = client(&session, Arc::new(MemoryCredentialStore::new()))
            .with_paging_error_suppression(false);
        let err = TransportError::Status {
            status: 500,
            body: String::new(),
        };
        assert!(c.page_failure(err, true, never_auth).is_err());
    }
}
