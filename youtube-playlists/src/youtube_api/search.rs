//! YouTube Search API types.

use serde::{Deserialize, Serialize};

/// Response structure for the `search.list` API call, projected to
/// `items(id/videoId,snippet/title)`.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: SearchResultSnippet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultId {
    /// Set because searches are restricted to `type=video`.
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultSnippet {
    pub title: String,
}
