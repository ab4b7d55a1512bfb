//! Narrow session-store interface around the persisted credential.
//!
//! Callers only ever see load/save/clear plus the cached notice feed;
//! the storage mechanics stay behind the trait.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::domain::{SessionCredential, UserRole};
use storage::Storage;
use tokio::sync::Mutex;
use tracing::warn;
use url::Url;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<SessionCredential>>;
    async fn save(&self, credential: &SessionCredential) -> Result<()>;
    /// Returns true when a credential was actually removed.
    async fn clear(&self) -> Result<bool>;
    async fn cache_notice(&self, body: &str) -> Result<()>;
    async fn cached_notices(&self) -> Result<Vec<String>>;
    async fn clear_notices(&self) -> Result<()>;
}

/// Process-local store; the default for tests and for shells that do
/// not keep a session across launches.
#[derive(Default)]
pub struct MemorySessionStore {
    credential: Mutex<Option<SessionCredential>>,
    notices: Mutex<Vec<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<SessionCredential>> {
        Ok(self.credential.lock().await.clone())
    }

    async fn save(&self, credential: &SessionCredential) -> Result<()> {
        *self.credential.lock().await = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<bool> {
        Ok(self.credential.lock().await.take().is_some())
    }

    async fn cache_notice(&self, body: &str) -> Result<()> {
        self.notices.lock().await.push(body.to_string());
        Ok(())
    }

    async fn cached_notices(&self) -> Result<Vec<String>> {
        Ok(self.notices.lock().await.clone())
    }

    async fn clear_notices(&self) -> Result<()> {
        self.notices.lock().await.clear();
        Ok(())
    }
}

/// Session store persisted through the sqlite-backed `storage` crate, so
/// the credential survives app restarts.
pub struct DurableSessionStore {
    store: Storage,
}

impl DurableSessionStore {
    pub async fn initialize(database_url: &str) -> Result<Arc<Self>> {
        let store = Storage::new(database_url)
            .await
            .with_context(|| format!("failed to initialize session storage at '{database_url}'"))?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl SessionStore for DurableSessionStore {
    async fn load(&self) -> Result<Option<SessionCredential>> {
        self.store.load_credential().await
    }

    async fn save(&self, credential: &SessionCredential) -> Result<()> {
        self.store.save_credential(credential).await
    }

    async fn clear(&self) -> Result<bool> {
        self.store.clear_credential().await
    }

    async fn cache_notice(&self, body: &str) -> Result<()> {
        self.store.append_notice(body).await?;
        Ok(())
    }

    async fn cached_notices(&self) -> Result<Vec<String>> {
        let notices = self.store.list_notices().await?;
        Ok(notices.into_iter().map(|n| n.body).collect())
    }

    async fn clear_notices(&self) -> Result<()> {
        self.store.clear_notices().await
    }
}

/// Result of inspecting a login redirect URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectCredential {
    pub credential: Option<SessionCredential>,
    /// The landing URL with the credential query parameters removed, for
    /// the shell to apply to its address bar.
    pub sanitized_url: String,
}

/// Extracts the `token` and `type` query parameters the login flow
/// appends to its redirect URL. Only a complete pair forms a credential;
/// a partial or unrecognized pair is logged and dropped. When either
/// parameter is present the query string is stripped from the URL.
pub fn extract_redirect_credential(raw_url: &str) -> Result<RedirectCredential> {
    let mut url =
        Url::parse(raw_url).with_context(|| format!("invalid redirect url '{raw_url}'"))?;

    let mut token = None;
    let mut role = None;
    let mut credential_params_seen = false;
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "token" => {
                credential_params_seen = true;
                token = Some(value.into_owned());
            }
            "type" => {
                credential_params_seen = true;
                role = role_from_param(&value);
                if role.is_none() {
                    warn!("redirect url carried unrecognized role '{value}'");
                }
            }
            _ => {}
        }
    }

    if !credential_params_seen {
        return Ok(RedirectCredential {
            credential: None,
            sanitized_url: raw_url.to_string(),
        });
    }

    url.set_query(None);

    let credential = match (token, role) {
        (Some(access_token), Some(role)) => Some(SessionCredential::new(access_token, role)),
        (Some(_), None) => {
            warn!("redirect url carried a token without a usable role; credential dropped");
            None
        }
        (None, _) => {
            warn!("redirect url carried a role without a token; credential dropped");
            None
        }
    };

    Ok(RedirectCredential {
        credential,
        sanitized_url: url.to_string(),
    })
}

fn role_from_param(raw: &str) -> Option<UserRole> {
    match raw {
        "CREATOR" => Some(UserRole::Creator),
        "PRODUCT_MANAGER" => Some(UserRole::ProductManager),
        _ => None,
    }
}
