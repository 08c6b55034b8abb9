//! The API session and its request builders.

use crate::config::Config;
use crate::error::Error;
use crate::youtube_api::{
    channels::ChannelListResponse,
    playlist_items::{PlaylistItem, PlaylistItemListResponse, ResourceId},
    playlists::PlaylistListResponse,
    request::{ApiRequest, Resource},
    search::SearchListResponse,
    videos::VideoListResponse,
};
use eyre::Context;
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;

const PLAYLIST_FIELDS: &str = "items(id,snippet/title),nextPageToken";
const RELATED_PLAYLISTS_FIELDS: &str = "items(contentDetails/relatedPlaylists)";
const PLAYLIST_ITEM_FIELDS: &str =
    "items(snippet/title,snippet/resourceId/videoId,status),nextPageToken";
const SEARCH_FIELDS: &str = "items(id/videoId,snippet/title)";
const VIDEO_FIELDS: &str = "items(contentDetails/regionRestriction,snippet/title)";

/// Whose channel a resolver should look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelector {
    /// A channel ID such as `UC_x5XG1OV2P6uZZ5FSM9Ttw`.
    Id(String),
    /// A legacy YouTube username, resolved to a channel through `forUsername`.
    Username(String),
    /// The channel of the user who authorized the session.
    Mine,
}

impl ChannelSelector {
    /// Whether this selector needs a user-authorized session.
    pub fn needs_user_consent(&self) -> bool {
        matches!(self, Self::Mine)
    }
}

/// How requests prove who they come from.
#[derive(Debug)]
pub enum Authorization {
    /// Unauthenticated access, identified by the application's API key.
    ApiKey(String),
    /// User-delegated access with an OAuth access token.
    OAuth(BasicTokenResponse),
}

/// Client for interacting with the YouTube Data API v3.
///
/// Builder methods only shape requests; nothing is sent until [`Self::execute`] is called,
/// except for the two resolvers that need an intermediate lookup
/// ([`Self::playlists_by_username`] and [`Self::related_playlists`]).
///
/// There is one of these per process. It is deliberately not `Clone`, so it is passed around by
/// reference.
#[derive(Debug)]
pub struct YouTubeClient {
    auth: Authorization,
    client: reqwest::Client,
    api_base: String,
    playlist_max_results: u32,
    video_max_results: u32,
}

impl YouTubeClient {
    /// Creates a session that authenticates with `auth`, using the page sizes and API base URL
    /// from `config`.
    pub fn new(auth: Authorization, config: &Config, client: reqwest::Client) -> Self {
        Self {
            auth,
            client,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            playlist_max_results: config.playlist_max_results,
            video_max_results: config.video_max_results,
        }
    }

    pub fn authorization(&self) -> &Authorization {
        &self.auth
    }

    /// Sends `request` and decodes its JSON response.
    ///
    /// Non-success statuses become errors that include the status and the response body.
    #[instrument(skip(self, request), fields(resource = %request.resource(), method = %request.method()))]
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest<T>) -> eyre::Result<T> {
        let url = format!("{}/{}", self.api_base, request.resource().path());
        let method = request.method().clone();

        let mut http = self
            .client
            .request(method.clone(), &url)
            .query(&request.params().collect::<Vec<_>>());

        http = match &self.auth {
            Authorization::ApiKey(key) => http.query(&[("key", key.as_str())]),
            Authorization::OAuth(token) => http.bearer_auth(token.access_token().secret()),
        };

        if let Some(body) = request.body() {
            http = http.json(body);
        }

        let response = http
            .send()
            .await
            .with_context(|| format!("send {} request to YouTube API: {}", method, url))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(eyre::eyre!(
                "YouTube API {} request failed with status {}: {}",
                method,
                status_code,
                error_text
            ));
        }

        let decoded = response
            .json()
            .await
            .with_context(|| format!("parse YouTube {} API response as JSON", request.resource()))?;
        tracing::debug!("request succeeded");
        Ok(decoded)
    }

    fn playlists_list(&self) -> ApiRequest<PlaylistListResponse> {
        ApiRequest::list(Resource::Playlists)
            .param("part", "id,snippet")
            .param("fields", PLAYLIST_FIELDS)
    }

    /// Playlists owned by the channel with the given ID.
    ///
    /// See: <https://developers.google.com/youtube/v3/docs/playlists/list>
    pub fn playlists_by_channel_id(&self, channel_id: &str) -> ApiRequest<PlaylistListResponse> {
        self.playlists_list()
            .param("channelId", channel_id)
            .param("maxResults", self.playlist_max_results.to_string())
    }

    /// Playlists owned by the channel of a legacy username.
    ///
    /// Sends a `channels.list` lookup first. Fails with [`Error::ChannelNotFound`] if no channel
    /// has that username.
    #[instrument(skip(self))]
    pub async fn playlists_by_username(
        &self,
        username: &str,
    ) -> eyre::Result<ApiRequest<PlaylistListResponse>> {
        let channel_id = self.resolve_username(username).await?;
        Ok(self.playlists_by_channel_id(&channel_id))
    }

    /// Playlists of the authenticated user, including private ones.
    ///
    /// Requires an OAuth session.
    pub fn my_playlists(&self) -> ApiRequest<PlaylistListResponse> {
        self.playlists_list()
            .param("mine", "true")
            .param("maxResults", self.playlist_max_results.to_string())
    }

    /// Playlists of whichever channel `selector` names.
    pub async fn playlists_for(
        &self,
        selector: &ChannelSelector,
    ) -> eyre::Result<ApiRequest<PlaylistListResponse>> {
        match selector {
            ChannelSelector::Id(id) => Ok(self.playlists_by_channel_id(id)),
            ChannelSelector::Username(username) => self.playlists_by_username(username).await,
            ChannelSelector::Mine => Ok(self.my_playlists()),
        }
    }

    /// Looks up the channel ID for a legacy username.
    #[instrument(skip(self))]
    pub async fn resolve_username(&self, username: &str) -> eyre::Result<String> {
        let request = ApiRequest::<ChannelListResponse>::list(Resource::Channels)
            .param("part", "id")
            .param("forUsername", username)
            .param("maxResults", self.playlist_max_results.to_string());

        let channels = self
            .execute(&request)
            .await
            .with_context(|| format!("look up channel for {username}"))?;

        let Some(channel_id) = channels.items.into_iter().find_map(|channel| channel.id) else {
            tracing::warn!(username, "no channel with that username");
            return Err(Error::ChannelNotFound {
                username: username.to_string(),
            }
            .into());
        };

        tracing::debug!(username, channel_id = %channel_id, "resolved username");
        Ok(channel_id)
    }

    fn related_channels_list(&self) -> ApiRequest<ChannelListResponse> {
        ApiRequest::list(Resource::Channels)
            .param("part", "contentDetails")
            .param("fields", RELATED_PLAYLISTS_FIELDS)
    }

    /// The related-playlists map (uploads, likes, ...) of a channel, by ID.
    ///
    /// See: <https://developers.google.com/youtube/v3/docs/channels/list>
    pub fn channel_by_id(&self, channel_id: &str) -> ApiRequest<ChannelListResponse> {
        self.related_channels_list().param("id", channel_id)
    }

    /// The related-playlists map of a channel, by legacy username.
    pub fn channel_by_username(&self, username: &str) -> ApiRequest<ChannelListResponse> {
        self.related_channels_list().param("forUsername", username)
    }

    /// The related-playlists map of the authenticated user's channel.
    pub fn my_channel(&self) -> ApiRequest<ChannelListResponse> {
        self.related_channels_list().param("mine", "true")
    }

    /// The related-playlists request for whichever channel `selector` names.
    pub fn channel_for(&self, selector: &ChannelSelector) -> ApiRequest<ChannelListResponse> {
        match selector {
            ChannelSelector::Id(id) => self.channel_by_id(id),
            ChannelSelector::Username(username) => self.channel_by_username(username),
            ChannelSelector::Mine => self.my_channel(),
        }
    }

    /// Executes a related-playlists channel request and builds one playlist lookup covering
    /// every related playlist it returned.
    #[instrument(skip_all)]
    pub async fn related_playlists(
        &self,
        channel_request: &ApiRequest<ChannelListResponse>,
    ) -> eyre::Result<ApiRequest<PlaylistListResponse>> {
        let channels = self
            .execute(channel_request)
            .await
            .context("fetch related playlists")?;
        let ids = channels.related_playlist_ids();
        tracing::debug!(count = ids.len(), "collected related playlists");
        Ok(self.playlists_by_ids(&ids))
    }

    /// Playlists with the given IDs, looked up in a single request.
    pub fn playlists_by_ids(&self, playlist_ids: &[String]) -> ApiRequest<PlaylistListResponse> {
        self.playlists_list()
            .param("id", playlist_ids.join(","))
            .param("maxResults", self.playlist_max_results.to_string())
    }

    /// The videos in a playlist, with their title, video ID and status.
    ///
    /// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    pub fn playlist_items(&self, playlist_id: &str) -> ApiRequest<PlaylistItemListResponse> {
        ApiRequest::list(Resource::PlaylistItems)
            .param("part", "snippet,status")
            .param("fields", PLAYLIST_ITEM_FIELDS)
            .param("playlistId", playlist_id)
            .param("maxResults", self.video_max_results.to_string())
    }

    /// Videos whose metadata matches `video_title`.
    ///
    /// See: <https://developers.google.com/youtube/v3/docs/search/list>
    pub fn search_videos(&self, video_title: &str) -> ApiRequest<SearchListResponse> {
        ApiRequest::list(Resource::Search)
            .param("part", "id,snippet")
            .param("fields", SEARCH_FIELDS)
            .param("q", video_title)
            .param("type", "video")
            .param("maxResults", self.video_max_results.to_string())
    }

    /// Adds `resource_id` to a playlist at `position`.
    ///
    /// The position is not checked here; the API rejects positions past the end of the
    /// playlist. Requires an OAuth session with write scope.
    ///
    /// See: <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
    pub fn insert_playlist_item(
        &self,
        playlist_id: &str,
        position: u32,
        resource_id: &ResourceId,
    ) -> ApiRequest<PlaylistItem> {
        let body = json!({
            "kind": "youtube#playlistItem",
            "snippet": {
                "playlistId": playlist_id,
                "position": position,
                "resourceId": resource_id,
            }
        });
        ApiRequest::insert(Resource::PlaylistItems, body).param("part", "contentDetails,id,snippet")
    }

    /// Titles and region restrictions of the given videos.
    ///
    /// See: <https://developers.google.com/youtube/v3/docs/videos/list>
    pub fn videos<I>(&self, video_ids: I) -> ApiRequest<VideoListResponse>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let ids: Vec<_> = video_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();
        ApiRequest::list(Resource::Videos)
            .param("part", "contentDetails,snippet")
            .param("fields", VIDEO_FIELDS)
            .param("id", ids.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use pretty_assertions::assert_eq;

    fn client() -> YouTubeClient {
        YouTubeClient::new(
            Authorization::ApiKey("key".to_string()),
            &Config::for_program("yt"),
            reqwest::Client::new(),
        )
    }

    fn params<T>(request: &ApiRequest<T>) -> Vec<(&'static str, &str)> {
        request.params().collect()
    }

    #[test]
    fn playlists_by_channel_id() {
        let request = client().playlists_by_channel_id("UC123");
        assert_eq!(request.resource(), Resource::Playlists);
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(
            params(&request),
            [
                ("part", "id,snippet"),
                ("fields", "items(id,snippet/title),nextPageToken"),
                ("channelId", "UC123"),
                ("maxResults", "50"),
            ]
        );
    }

    #[test]
    fn my_playlists_filter_on_mine() {
        let request = client().my_playlists();
        assert_eq!(request.get_param("mine"), Some("true"));
        assert_eq!(request.get_param("channelId"), None);
        assert_eq!(
            request.get_param("fields"),
            Some("items(id,snippet/title),nextPageToken")
        );
    }

    #[tokio::test]
    async fn selector_dispatch_without_lookup() {
        let yt = client();
        let by_id = yt
            .playlists_for(&ChannelSelector::Id("UC9".into()))
            .await
            .unwrap();
        assert_eq!(by_id.get_param("channelId"), Some("UC9"));

        let mine = yt.playlists_for(&ChannelSelector::Mine).await.unwrap();
        assert_eq!(mine.get_param("mine"), Some("true"));
    }

    #[test]
    fn channel_requests_project_related_playlists() {
        let yt = client();
        for (request, filter) in [
            (yt.channel_by_id("UC1"), ("id", "UC1")),
            (yt.channel_by_username("bob"), ("forUsername", "bob")),
            (yt.my_channel(), ("mine", "true")),
        ] {
            assert_eq!(request.resource(), Resource::Channels);
            assert_eq!(
                params(&request),
                [
                    ("part", "contentDetails"),
                    ("fields", "items(contentDetails/relatedPlaylists)"),
                    filter,
                ]
            );
        }
    }

    #[test]
    fn related_ids_merge_in_order() {
        let channels: ChannelListResponse = serde_json::from_str(
            r#"{"items": [
                {"contentDetails": {"relatedPlaylists": {"uploads": "UU1", "likes": "LL1"}}},
                {"contentDetails": {"relatedPlaylists": {"favorites": "FL2"}}}
            ]}"#,
        )
        .unwrap();
        let ids = channels.related_playlist_ids();
        assert_eq!(ids, ["UU1", "LL1", "FL2"]);

        let request = client().playlists_by_ids(&ids);
        assert_eq!(request.get_param("id"), Some("UU1,LL1,FL2"));
        assert_eq!(
            request.get_param("fields"),
            Some("items(id,snippet/title),nextPageToken")
        );
    }

    #[test]
    fn playlist_items_request() {
        let request = client().playlist_items("PL1");
        assert_eq!(
            params(&request),
            [
                ("part", "snippet,status"),
                (
                    "fields",
                    "items(snippet/title,snippet/resourceId/videoId,status),nextPageToken"
                ),
                ("playlistId", "PL1"),
                ("maxResults", "50"),
            ]
        );
    }

    #[test]
    fn search_is_restricted_to_videos() {
        let request = client().search_videos("never gonna give you up");
        assert_eq!(request.resource(), Resource::Search);
        assert_eq!(request.get_param("type"), Some("video"));
        assert_eq!(request.get_param("q"), Some("never gonna give you up"));
        assert_eq!(
            request.get_param("fields"),
            Some("items(id/videoId,snippet/title)")
        );
    }

    #[test]
    fn insert_body_nests_under_snippet() {
        let request =
            client().insert_playlist_item("PL1", 3, &ResourceId::video("dQw4w9WgXcQ"));
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.resource(), Resource::PlaylistItems);
        assert_eq!(request.get_param("part"), Some("contentDetails,id,snippet"));
        assert_eq!(
            request.body().unwrap(),
            &json!({
                "kind": "youtube#playlistItem",
                "snippet": {
                    "playlistId": "PL1",
                    "position": 3,
                    "resourceId": {"kind": "youtube#video", "videoId": "dQw4w9WgXcQ"},
                }
            })
        );
    }

    #[test]
    fn insert_position_is_not_validated() {
        let request = client().insert_playlist_item("PL1", u32::MAX, &ResourceId::video("v"));
        assert_eq!(request.body().unwrap()["snippet"]["position"], u32::MAX);
    }

    #[test]
    fn videos_join_ids() {
        let request = client().videos(["a", "b"]);
        assert_eq!(
            params(&request),
            [
                ("part", "contentDetails,snippet"),
                (
                    "fields",
                    "items(contentDetails/regionRestriction,snippet/title)"
                ),
                ("id", "a,b"),
            ]
        );
    }

    #[test]
    fn page_caps_come_from_config() {
        let mut config = Config::for_program("yt");
        config.playlist_max_results = 5;
        config.video_max_results = 7;
        let yt = YouTubeClient::new(
            Authorization::ApiKey("k".into()),
            &config,
            reqwest::Client::new(),
        );
        assert_eq!(yt.my_playlists().get_param("maxResults"), Some("5"));
        assert_eq!(yt.playlist_items("p").get_param("maxResults"), Some("7"));
    }
}
