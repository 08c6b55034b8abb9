//! OAuth 2.0 management for YouTube API authentication.
//!
//! This module covers the user-delegated half of session bootstrap: loading the application's
//! client secrets, running the interactive consent flow through the user's browser, and
//! exchanging refresh tokens for new access tokens.

use eyre::Context;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Request, Response, body};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    Scope, TokenResponse, TokenUrl,
};
use oauth2::{RefreshToken, reqwest};
use serde::Deserialize;
use std::future::Future;
use std::path::Path;

/// Shown in the browser once the redirect has been received.
const OAUTH_DONE: &str = include_str!("../oauth_success.html");

/// The two token operations session bootstrap needs.
///
/// [`OAuthManager`] is the real implementation; bootstrap is generic over this so that the
/// credential cache logic can be exercised without a browser.
pub trait Authorize {
    /// Runs the interactive consent flow and returns a brand-new token.
    fn authenticate(&self) -> impl Future<Output = eyre::Result<BasicTokenResponse>>;

    /// Exchanges the refresh token in `token` for a new access token.
    ///
    /// Returns `Ok(None)` when there is no refresh token or the server rejected it, which means
    /// the user has to go through [`Self::authenticate`] again.
    fn refresh_token(
        &self,
        token: &BasicTokenResponse,
    ) -> impl Future<Output = eyre::Result<Option<BasicTokenResponse>>>;
}

/// The application's OAuth client registration.
///
/// Read from the `client_secrets.json` file the Google API console hands out.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ClientSecretsFile {
    Installed(ClientSecrets),
    Web(ClientSecrets),
}

impl ClientSecrets {
    /// Loads the `installed` (or `web`) section of a `client_secrets.json` file.
    pub async fn load(path: &Path) -> eyre::Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("check for {}", path.display()))?
        {
            eyre::bail!(
                "OAuth client secrets file {} is missing; create an OAuth client ID for a desktop \
                 application at https://console.cloud.google.com/apis/credentials and download \
                 its JSON to that path",
                path.display()
            );
        }
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read client secrets from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parse client secrets {}", path.display()))
    }

    pub fn from_json(json: &str) -> eyre::Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .context("expected an \"installed\" or \"web\" client section")?;
        Ok(match file {
            ClientSecretsFile::Installed(secrets) | ClientSecretsFile::Web(secrets) => secrets,
        })
    }
}

/// Manages OAuth 2.0 authentication flows for YouTube API access.
///
/// The OAuthManager encapsulates all OAuth operations, providing a consistent interface
/// for both initial user authentication and token refresh operations.
#[derive(Debug, Clone)]
pub struct OAuthManager {
    secrets: ClientSecrets,
    scopes: Vec<String>,
}

impl OAuthManager {
    /// Creates a new OAuth manager for the given client registration.
    ///
    /// # Arguments
    ///
    /// * `secrets` - The application's client ID, secret and endpoints
    /// * `scopes` - The scopes to ask the user to grant
    pub fn new(secrets: ClientSecrets, scopes: Vec<String>) -> Self {
        Self { secrets, scopes }
    }

    fn token_url(&self) -> eyre::Result<TokenUrl> {
        TokenUrl::new(self.secrets.token_uri.clone()).context("parse token endpoint URL")
    }

    fn http_client() -> eyre::Result<reqwest::Client> {
        reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build OAuth HTTP client")
    }

    /// Performs a complete OAuth 2.0 authorization flow to obtain a new access token.
    ///
    /// This method initiates the full OAuth flow, including:
    /// 1. Setting up a local HTTP server to receive the authorization callback
    /// 2. Opening the user's browser for authorization
    /// 3. Exchanging the authorization code for an access token
    #[tracing::instrument(skip(self))]
    pub async fn authenticate(&self) -> eyre::Result<BasicTokenResponse> {
        let csrf = CsrfToken::new_random();
        let (redirect_url, eventually_authorization_code) = self
            .setup_redirect(csrf.clone())
            .await
            .context("set up redirect endpoint")?;

        let auth_url =
            AuthUrl::new(self.secrets.auth_uri.clone()).context("parse authorization URL")?;
        let client = BasicClient::new(ClientId::new(self.secrets.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.secrets.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(self.token_url()?)
            .set_redirect_uri(redirect_url);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, _csrf_token) = client
            // We never re-use the CSRF since we only go through the flow exactly once.
            .authorize_url(move || csrf.clone())
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .set_pkce_challenge(pkce_challenge)
            .url();

        tracing::info!(url = %auth_url, "asking user to follow OAuth flow");
        if let Err(e) = webbrowser::open(auth_url.as_ref()) {
            // the redirect goes to this host's loopback, so the URL must be opened here
            tracing::warn!(error = %e, "could not open browser; open the URL above manually");
        }
        let authorization_code = eventually_authorization_code
            .await
            .context("await user authorization code")?;

        let token_result = client
            .exchange_code(authorization_code)
            .set_pkce_verifier(pkce_verifier)
            .request_async(&Self::http_client()?)
            .await
            .context("exchange authorization code with access token")?;

        Ok(token_result)
    }

    /// Attempts to refresh an existing OAuth token using its refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(new_token))` - Refresh succeeded, new token is available
    /// * `Ok(None)` - The server rejected the refresh token, or there was none
    /// * `Err(_)` - Network or other error occurred during refresh attempt
    pub async fn refresh_token(
        &self,
        token: &BasicTokenResponse,
    ) -> eyre::Result<Option<BasicTokenResponse>> {
        let Some(refresh_token) = token.refresh_token() else {
            tracing::warn!("no refresh token available, cannot refresh");
            return Ok(None);
        };
        self.exchange_refresh_token(refresh_token).await
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> eyre::Result<Option<BasicTokenResponse>> {
        tracing::debug!("attempting to refresh OAuth token");

        // No redirect URL is needed to refresh.
        let client = BasicClient::new(ClientId::new(self.secrets.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.secrets.client_secret.clone()))
            .set_token_uri(self.token_url()?);

        match client
            .exchange_refresh_token(refresh_token)
            .request_async(&Self::http_client()?)
            .await
        {
            Ok(new_token) => {
                tracing::debug!("successfully refreshed OAuth token");
                Ok(Some(new_token))
            }
            Err(ref e @ oauth2::RequestTokenError::ServerResponse(ref sr))
                if matches!(
                    sr.error(),
                    oauth2::basic::BasicErrorResponseType::InvalidGrant
                ) =>
            {
                tracing::warn!("OAuth refresh token considered invalid grant: {}", e);
                Ok(None)
            }
            Err(e) => Err(e).context("exchange refresh token"),
        }
    }

    /// Sets up a local HTTP server to receive the OAuth authorization callback.
    ///
    /// The server listens on a random loopback port, validates the CSRF state and extracts
    /// the authorization code from the one request it serves.
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// - The redirect URL to use in the OAuth flow
    /// - A future that resolves to the authorization code when the callback is received
    async fn setup_redirect(
        &self,
        csrf: CsrfToken,
    ) -> eyre::Result<(
        RedirectUrl,
        impl Future<Output = eyre::Result<AuthorizationCode>>,
    )> {
        let socket = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind to localhost")?;
        let addr = socket.local_addr().context("get local address")?;
        let url = RedirectUrl::new(format!("http://{}:{}", addr.ip(), addr.port()))
            .context("construct redirect url")?;
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let r = async move {
                let (conn, _) = socket.accept().await.context("accept")?;
                let conn = hyper_util::rt::TokioIo::new(conn);
                let (got, mut gotten) = tokio::sync::mpsc::channel(1);
                let service = service_fn(move |req: Request<body::Incoming>| {
                    let csrf = csrf.clone();
                    let got = got.clone();
                    async move {
                        let mut presented_state = None;
                        let mut presented_code = None;
                        let mut presented_error = None;
                        for (k, v) in
                            form_urlencoded::parse(req.uri().query().unwrap_or("").as_bytes())
                        {
                            match &*k {
                                "state" => presented_state = Some(v),
                                "code" => presented_code = Some(v),
                                "error" => presented_error = Some(v),
                                _ => {}
                            }
                        }
                        if let Some(error) = presented_error {
                            tracing::warn!(%error, "user did not grant access");
                            return Err("authorization was denied");
                        }
                        if presented_state.as_deref() != Some(csrf.secret().as_str()) {
                            return Err("invalid csrf token");
                        }
                        let Some(code) = presented_code else {
                            return Err("no authorization code found");
                        };
                        let code = AuthorizationCode::new(code.into_owned());
                        if got.send(code).await.is_err() {
                            return Err("authorization code already received");
                        }
                        Ok(Response::new(Full::<Bytes>::from(OAUTH_DONE)))
                    }
                });
                let mut serve = std::pin::pin!(
                    hyper::server::conn::http1::Builder::new().serve_connection(conn, service)
                );

                tokio::select! {
                    exit = &mut serve => {
                        if let Err(e) = exit {
                            Err(e).context("redirect server got bad request")
                        } else {
                            eyre::bail!("redirect server exit prematurely");
                        }
                    }
                    code = gotten.recv() => {
                        serve.as_mut().graceful_shutdown();
                        code.ok_or_else(|| eyre::eyre!("redirect handler went away"))
                    }
                }
            };
            let _ = tx.send(r.await);
        });
        Ok((url, async move {
            rx.await.context("redirect future dropped prematurely")?
        }))
    }
}

impl Authorize for OAuthManager {
    async fn authenticate(&self) -> eyre::Result<BasicTokenResponse> {
        OAuthManager::authenticate(self).await
    }

    async fn refresh_token(
        &self,
        token: &BasicTokenResponse,
    ) -> eyre::Result<Option<BasicTokenResponse>> {
        OAuthManager::refresh_token(self, token).await
    }
}
