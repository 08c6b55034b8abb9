use crate::config::Config;
use crate::credentials::{Credential, CredentialStore};
use crate::error::Error;
use crate::oauth::{Authorize, ClientSecrets, OAuthManager};
use crate::youtube_api::{Authorization, ChannelSelector, YouTubeClient};
use eyre::Context;
use oauth2::basic::BasicTokenResponse;

pub mod config;
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod youtube_api;

/// Creates the session for this run.
///
/// Looking up someone else's channel by ID or username only needs the application's API key.
/// Looking at [`ChannelSelector::Mine`] needs the user's consent, which is cached in
/// [`Config::credential_file`] between runs.
#[tracing::instrument(skip(config))]
pub async fn setup_youtube_client(
    config: &Config,
    identity: &ChannelSelector,
) -> eyre::Result<YouTubeClient> {
    let http = reqwest::Client::new();

    if !identity.needs_user_consent() {
        let key = config.api_key.clone().ok_or(Error::MissingApiKey)?;
        tracing::debug!("using API key access");
        return Ok(YouTubeClient::new(Authorization::ApiKey(key), config, http));
    }

    let secrets = ClientSecrets::load(&config.client_secrets_file).await?;
    let oauth_manager = OAuthManager::new(secrets, config.scopes.clone());
    let store = CredentialStore::new(&config.credential_file);
    let token = authorize_user(&oauth_manager, &store).await?;

    Ok(YouTubeClient::new(Authorization::OAuth(token), config, http))
}

/// Produces a usable OAuth token, going through the credential cache in `store`.
///
/// - No usable cached credential: run the consent flow and cache the result.
/// - Expired credential: refresh it and cache the result, falling back to the consent flow if
///   the refresh token was rejected.
/// - Otherwise: use the cached token as is.
pub async fn authorize_user(
    authorizer: &impl Authorize,
    store: &CredentialStore,
) -> eyre::Result<BasicTokenResponse> {
    let cached = match store.load().await {
        Ok(cached) => cached,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable credential file");
            None
        }
    };

    let credential = match cached {
        None => {
            tracing::info!("no cached credential, asking user to authorize");
            let credential = authenticate(authorizer).await?;
            store.save(&credential).await?;
            credential
        }
        Some(mut credential) if credential.is_expired() => {
            tracing::info!("cached credential expired, refreshing");
            if !credential
                .refresh(authorizer)
                .await
                .context("refresh token")?
            {
                tracing::warn!("token refresh failed, getting new token via full OAuth");
                credential = authenticate(authorizer).await?;
            }
            store.save(&credential).await?;
            credential
        }
        Some(credential) => {
            tracing::debug!(expires_at = %credential.expires_at(), "using cached credential");
            credential
        }
    };

    Ok(credential.into_token())
}

async fn authenticate(authorizer: &impl Authorize) -> eyre::Result<Credential> {
    let token = authorizer
        .authenticate()
        .await
        .context("authorize user to YouTube")?;
    Ok(Credential::new(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::tests::{FakeAuthorizer, token};
    use oauth2::TokenResponse;

    fn store(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("youtube-playlists-oauth2.json"))
    }

    #[tokio::test]
    async fn expired_credential_is_refreshed_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store
            .save(&Credential::expired(token("stale", Some("refresh-me"))))
            .await
            .unwrap();

        let authorizer = FakeAuthorizer::new(Some(token("refreshed", None)), None);
        let issued = authorize_user(&authorizer, &store).await.unwrap();

        assert_eq!(issued.access_token().secret(), "refreshed");
        assert_eq!(authorizer.refreshes.get(), 1);
        assert_eq!(authorizer.authentications.get(), 0);

        let persisted = store.load().await.unwrap().unwrap();
        assert!(!persisted.is_expired());
        assert_eq!(persisted.token().access_token().secret(), "refreshed");
        assert_eq!(
            persisted.token().refresh_token().map(|r| r.secret().as_str()),
            Some("refresh-me")
        );
    }

    #[tokio::test]
    async fn missing_credential_runs_consent_flow() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let authorizer = FakeAuthorizer::new(None, Some(token("granted", Some("r"))));
        let issued = authorize_user(&authorizer, &store).await.unwrap();

        assert_eq!(issued.access_token().secret(), "granted");
        assert_eq!(authorizer.authentications.get(), 1);
        assert_eq!(authorizer.refreshes.get(), 0);
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unreadable_credential_runs_consent_flow() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "{").unwrap();

        let authorizer = FakeAuthorizer::new(None, Some(token("granted", Some("r"))));
        let issued = authorize_user(&authorizer, &store).await.unwrap();

        assert_eq!(issued.access_token().secret(), "granted");
        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(persisted.token().access_token().secret(), "granted");
    }

    #[tokio::test]
    async fn rejected_refresh_falls_back_to_consent_flow() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store
            .save(&Credential::expired(token("stale", None)))
            .await
            .unwrap();

        let authorizer = FakeAuthorizer::new(None, Some(token("granted", Some("r"))));
        let issued = authorize_user(&authorizer, &store).await.unwrap();

        assert_eq!(issued.access_token().secret(), "granted");
        assert_eq!(authorizer.refreshes.get(), 1);
        assert_eq!(authorizer.authentications.get(), 1);
    }

    #[tokio::test]
    async fn fresh_credential_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store
            .save(&Credential::new(token("current", Some("r"))))
            .await
            .unwrap();

        let authorizer = FakeAuthorizer::new(None, None);
        let issued = authorize_user(&authorizer, &store).await.unwrap();

        assert_eq!(issued.access_token().secret(), "current");
        assert_eq!(authorizer.refreshes.get(), 0);
        assert_eq!(authorizer.authentications.get(), 0);
    }

    #[tokio::test]
    async fn failed_consent_flow_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let authorizer = FakeAuthorizer::new(None, None);
        let err = authorize_user(&authorizer, &store(&dir)).await.unwrap_err();
        assert!(err.to_string().contains("authorize user to YouTube"));
    }

    #[tokio::test]
    async fn key_access_without_key_is_rejected() {
        let config = Config::for_program("yt");
        let err = setup_youtube_client(&config, &ChannelSelector::Id("UC1".into()))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn key_access_uses_api_key() {
        let mut config = Config::for_program("yt");
        config.api_key = Some("secret-key".into());
        let yt = setup_youtube_client(&config, &ChannelSelector::Username("bob".into()))
            .await
            .unwrap();
        assert!(matches!(yt.authorization(), Authorization::ApiKey(k) if k == "secret-key"));
    }
}
