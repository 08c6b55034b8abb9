//! YouTube Channels API types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Response structure for the `channels.list` API call.
///
/// The same type serves both the `part=id` username lookup and the
/// `items(contentDetails/relatedPlaylists)` projection, so every channel field is optional.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelListResponse {
    /// A list of channels that match the request criteria.
    ///
    /// Missing entirely when nothing matched.
    #[serde(default)]
    pub items: Vec<Channel>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl ChannelListResponse {
    /// Every related playlist ID across all returned channels, in response order.
    pub fn related_playlist_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|channel| channel.content_details.as_ref())
            .flat_map(|details| details.related_playlists.values().cloned())
            .collect()
    }
}

/// A `channel` resource contains information about a YouTube channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct Channel {
    /// The ID that YouTube uses to uniquely identify the channel.
    pub id: Option<String>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ChannelContentDetails>,
}

/// See: <https://developers.google.com/youtube/v3/docs/channels#contentDetails>
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelContentDetails {
    /// Platform-managed playlists associated with the channel, keyed by kind (`uploads`,
    /// `likes`, ...).
    ///
    /// Kept in the order the API returned them.
    #[serde(rename = "relatedPlaylists", default)]
    pub related_playlists: IndexMap<String, String>,
}
