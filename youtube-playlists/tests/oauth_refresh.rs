//! Token refresh against a mock OAuth token endpoint.

use oauth2::basic::{BasicTokenResponse, BasicTokenType};
use oauth2::{AccessToken, EmptyExtraTokenFields, RefreshToken, TokenResponse};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use youtube_playlists::authorize_user;
use youtube_playlists::credentials::{Credential, CredentialStore};
use youtube_playlists::oauth::{ClientSecrets, OAuthManager};

fn manager(server: &MockServer) -> OAuthManager {
    OAuthManager::new(
        ClientSecrets {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            auth_uri: format!("{}/auth", server.uri()),
            token_uri: format!("{}/token", server.uri()),
        },
        vec!["https://www.googleapis.com/auth/youtube".to_string()],
    )
}

fn stored_token(refresh: Option<&str>) -> BasicTokenResponse {
    let mut token = BasicTokenResponse::new(
        AccessToken::new("stale".to_string()),
        BasicTokenType::Bearer,
        EmptyExtraTokenFields {},
    );
    token.set_refresh_token(refresh.map(|r| RefreshToken::new(r.to_string())));
    token
}

#[tokio::test]
async fn refresh_exchanges_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=stored-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "token_type": "Bearer",
            "expires_in": 3599,
            "scope": "https://www.googleapis.com/auth/youtube"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let refreshed = manager(&server)
        .refresh_token(&stored_token(Some("stored-refresh")))
        .await
        .unwrap()
        .expect("refreshed token");
    assert_eq!(refreshed.access_token().secret(), "fresh");
}

#[tokio::test]
async fn invalid_grant_means_reauthorize() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let refreshed = manager(&server)
        .refresh_token(&stored_token(Some("revoked")))
        .await
        .unwrap();
    assert!(refreshed.is_none());
}

#[tokio::test]
async fn no_refresh_token_skips_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let refreshed = manager(&server)
        .refresh_token(&stored_token(None))
        .await
        .unwrap();
    assert!(refreshed.is_none());
}

#[tokio::test]
async fn expired_cache_is_refreshed_through_token_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("youtube-playlists-oauth2.json"));
    store
        .save(&Credential::expired(stored_token(Some("stored-refresh"))))
        .await
        .unwrap();

    let token = authorize_user(&manager(&server), &store).await.unwrap();
    assert_eq!(token.access_token().secret(), "fresh");

    let persisted = store.load().await.unwrap().unwrap();
    assert!(!persisted.is_expired());
    assert_eq!(
        persisted.token().refresh_token().map(|r| r.secret().as_str()),
        Some("stored-refresh")
    );
}
