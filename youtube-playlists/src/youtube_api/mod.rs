//! YouTube Data API v3 request builders.
//!
//! Every operation is a method on [`YouTubeClient`] that returns an [`ApiRequest`]: a description
//! of one API call with its endpoint, field mask, filter and page size already filled in. Callers
//! send it with [`YouTubeClient::execute`] and, for playlist and playlist-item listings, ask
//! [`next_page_request`] for the follow-up request until it returns `None`.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_playlists::youtube_api::{next_page_request, ChannelSelector, YouTubeClient};
//!
//! # async fn example(yt: &YouTubeClient) -> eyre::Result<()> {
//! let selector = ChannelSelector::Username("GoogleDevelopers".to_string());
//! let mut request = Some(yt.playlists_for(&selector).await?);
//! while let Some(current) = request {
//!     let page = yt.execute(&current).await?;
//!     for playlist in &page.items {
//!         println!("{} {}", playlist.id, playlist.snippet.title);
//!     }
//!     request = next_page_request("playlist", &current, &page)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod pagination;
pub mod playlist_items;
pub mod playlists;
pub mod request;
pub mod search;
pub mod videos;

// Re-export main types for convenience
pub use client::{Authorization, ChannelSelector, YouTubeClient};
pub use pagination::{PagedResource, Paginated, next_page_request};
pub use request::{ApiRequest, Resource};

pub use channels::{Channel, ChannelContentDetails, ChannelListResponse};
pub use playlist_items::{PlaylistItem, PlaylistItemListResponse, ResourceId};
pub use playlists::{Playlist, PlaylistListResponse};
pub use search::{SearchListResponse, SearchResult};
pub use videos::{RegionRestriction, Video, VideoListResponse};
