//! The cached OAuth credential and the file it lives in.

use crate::oauth::Authorize;
use eyre::Context;
use jiff::{SignedDuration, Timestamp};
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// How long before the server-side expiry we already consider a token stale.
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Lifetime assumed when the server does not say how long a token lasts.
const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

/// An OAuth token together with the moment it stops being usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    token: BasicTokenResponse,
    /// When the access token expires (with safety buffer).
    expires_at: Timestamp,
}

impl Credential {
    /// Wraps a token that was just issued, computing its expiry from `expires_in`.
    pub fn new(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: Self::calculate_token_expiry(&token),
            token,
        }
    }

    /// Wraps a token that must be refreshed before use.
    pub fn expired(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: Timestamp::UNIX_EPOCH,
            token,
        }
    }

    pub fn token(&self) -> &BasicTokenResponse {
        &self.token
    }

    pub fn into_token(self) -> BasicTokenResponse {
        self.token
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// Refreshes the access token in place, keeping the refresh token if the server did not
    /// issue a new one.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Token was successfully refreshed
    /// * `Ok(false)` - Refresh failed (invalid grant, no refresh token, etc.)
    /// * `Err(_)` - Network or other error occurred
    pub async fn refresh(&mut self, authorizer: &impl Authorize) -> eyre::Result<bool> {
        tracing::trace!("refreshing token");
        match authorizer
            .refresh_token(&self.token)
            .await
            .context("refresh OAuth token")?
        {
            Some(new_token) => {
                let old_token = std::mem::replace(&mut self.token, new_token);

                if self.token.refresh_token().is_none() {
                    tracing::trace!("new token lacks refresh token, preserving original");
                    self.token
                        .set_refresh_token(old_token.refresh_token().cloned());
                } else {
                    tracing::debug!("new token includes refresh token");
                }

                self.expires_at = Self::calculate_token_expiry(&self.token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Now plus `expires_in`, minus a five minute margin.
    fn calculate_token_expiry(token: &BasicTokenResponse) -> Timestamp {
        let lifetime = token
            .expires_in()
            .unwrap_or(DEFAULT_LIFETIME)
            .saturating_sub(EXPIRY_MARGIN);
        let lifetime = SignedDuration::try_from(lifetime).unwrap_or(SignedDuration::MAX);
        Timestamp::now()
            .checked_add(lifetime)
            .unwrap_or(Timestamp::MAX)
    }
}

/// A JSON file holding at most one [`Credential`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached credential.
    ///
    /// Returns `Ok(None)` if the file does not exist, and an error if it exists but cannot be
    /// read or parsed.
    pub async fn load(&self) -> eyre::Result<Option<Credential>> {
        if !tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("check for {}", self.path.display()))?
        {
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read credential file {}", self.path.display()))?;
        let credential = serde_json::from_str(&json)
            .with_context(|| format!("parse credential file {}", self.path.display()))?;
        Ok(Some(credential))
    }

    /// Writes `credential`, replacing whatever was stored before.
    ///
    /// On Unix the file is only readable by its owner.
    pub async fn save(&self, credential: &Credential) -> eyre::Result<()> {
        let json = serde_json::to_string_pretty(credential).context("serialize credential")?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options
            .open(&self.path)
            .await
            .with_context(|| format!("open credential file {}", self.path.display()))?;

        // `mode` only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await
                .with_context(|| format!("restrict permissions of {}", self.path.display()))?;
        }

        file.write_all(json.as_bytes())
            .await
            .with_context(|| format!("write credential file {}", self.path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("flush credential file {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "saved credential");
        Ok(())
    }
}
