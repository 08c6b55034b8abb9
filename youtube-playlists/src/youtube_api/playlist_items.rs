//! YouTube PlaylistItems API types.

use serde::{Deserialize, Serialize};

/// Response structure for the `playlistItems.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `playlistItem` resource identifies a video that is included in a playlist.
///
/// List responses only carry `snippet/title`, `snippet/resourceId/videoId` and `status`. Insert
/// responses carry `id`, `snippet` and `contentDetails`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: Option<String>,
    pub snippet: Option<PlaylistItemSnippet>,
    pub status: Option<PlaylistItemStatus>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemSnippet {
    /// The item's title.
    #[serde(default)]
    pub title: String,
    #[serde(rename = "playlistId")]
    pub playlist_id: Option<String>,
    /// The order in which the item appears in the playlist, zero-based.
    pub position: Option<u32>,
    #[serde(rename = "resourceId")]
    pub resource_id: Option<ResourceId>,
}

/// Identifies the resource a playlist item points at.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#snippet.resourceId>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceId {
    /// The kind, or type, of the referred resource. Usually `youtube#video`.
    ///
    /// Absent when the response was trimmed by a field mask.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "videoId", skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl ResourceId {
    /// A reference to the video with the given ID.
    pub fn video(video_id: impl Into<String>) -> Self {
        Self {
            kind: Some("youtube#video".to_string()),
            video_id: Some(video_id.into()),
        }
    }
}

/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#status>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemStatus {
    /// `private`, `public` or `unlisted`.
    #[serde(rename = "privacyStatus")]
    pub privacy_status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemContentDetails {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}
