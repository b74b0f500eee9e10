//! Client-credentials authentication against the Microsoft identity platform.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{DriveError, Result};
use crate::models::{TokenErrorResponse, TokenResponse};

/// Microsoft Graph default scope for application permissions.
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Tokens are treated as expired this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > SystemTime::now() + EXPIRY_MARGIN
    }
}

/// Authenticator that exchanges the application's credentials for a Graph
/// access token and caches it until shortly before it expires.
///
/// Clones share the same cache.
#[derive(Clone)]
pub struct Authenticator {
    config: Arc<Config>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    /// Create a new authenticator for a configuration.
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        Self {
            config,
            client,
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token, requesting a new one if necessary.
    ///
    /// Concurrent callers that find the cache stale wait for a single
    /// refresh instead of each hitting the token endpoint.
    pub async fn get_access_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.cached_token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let new_token = self.request_token().await?;
        let access_token = new_token.access_token.clone();
        *cached = Some(new_token);

        Ok(access_token)
    }

    /// Drop the cached token if it is still the one that was rejected.
    pub async fn invalidate(&self, rejected: &str) {
        let mut cached = self.cached_token.write().await;
        if cached
            .as_ref()
            .is_some_and(|t| t.access_token == rejected)
        {
            debug!(client_id = %self.config.client_id(), "Invalidating cached access token");
            *cached = None;
        }
    }

    /// Exchange client credentials for a new access token.
    async fn request_token(&self) -> Result<CachedToken> {
        let token_url = self.config.token_url();
        debug!(
            tenant_domain = %self.config.tenant_domain(),
            client_id = %self.config.client_id(),
            "Requesting access token"
        );

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id()),
            ("client_secret", self.config.client_secret()),
            ("scope", GRAPH_SCOPE),
        ];

        let response = self
            .client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Identity provider unreachable");
                DriveError::AuthenticationError(format!("identity provider unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or(body);
            warn!(status = status.as_u16(), "Token request rejected");
            return Err(DriveError::AuthenticationError(format!(
                "Status {}: {}",
                status, reason
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            DriveError::AuthenticationError(format!("malformed token response: {}", e))
        })?;

        let expires_at = expiry_after(token_response.expires_in)?;
        info!(expires_in = token_response.expires_in, "Obtained access token");

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}

/// Absolute expiry for a token lifetime reported in seconds.
fn expiry_after(expires_in: u64) -> Result<SystemTime> {
    SystemTime::now()
        .checked_add(Duration::from_secs(expires_in))
        .ok_or_else(|| {
            DriveError::AuthenticationError(format!(
                "token lifetime out of range: expires_in={}",
                expires_in
            ))
        })
}
