//! YouTube Videos API types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Response structure for the `videos.list` API call, projected to
/// `items(contentDetails/regionRestriction,snippet/title)`.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

/// A `video` resource represents a YouTube video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "contentDetails")]
    pub content_details: Option<VideoContentDetails>,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoContentDetails {
    /// Where the video is viewable. Absent for videos without restrictions.
    #[serde(rename = "regionRestriction")]
    pub region_restriction: Option<RegionRestriction>,
}

/// Contains information about the countries where a video is (or is not) viewable.
///
/// The API sets at most one of the two lists.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#contentDetails.regionRestriction>
#[derive(Debug, Serialize, Deserialize)]
pub struct RegionRestriction {
    /// ISO 3166-1 alpha-2 codes of the regions where the video is viewable.
    pub allowed: Option<Vec<String>>,
    /// ISO 3166-1 alpha-2 codes of the regions where the video is blocked.
    pub blocked: Option<Vec<String>>,
}

impl RegionRestriction {
    /// Whether the video can be watched from `region`.
    pub fn is_viewable_in(&self, region: &str) -> bool {
        if let Some(allowed) = &self.allowed {
            return allowed.iter().any(|r| r == region);
        }
        if let Some(blocked) = &self.blocked {
            return !blocked.iter().any(|r| r == region);
        }
        true
    }
}

impl fmt::Display for RegionRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.allowed, &self.blocked) {
            (Some(allowed), _) => write!(f, "allowed: {}", allowed.join(",")),
            (None, Some(blocked)) => write!(f, "blocked: {}", blocked.join(",")),
            (None, None) => f.write_str("unrestricted"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
}
