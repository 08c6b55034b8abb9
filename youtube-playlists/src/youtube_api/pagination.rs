//! Continuation of list requests.
//!
//! There is no paging engine here. Callers execute a request, then ask for the follow-up request
//! with [`next_page_request`] until it returns `None`.

use crate::error::Error;
use crate::youtube_api::playlist_items::PlaylistItemListResponse;
use crate::youtube_api::playlists::PlaylistListResponse;
use crate::youtube_api::request::{ApiRequest, Resource};
use std::str::FromStr;

/// A list response that may carry a continuation token.
pub trait Paginated {
    fn next_page_token(&self) -> Option<&str>;
}

impl Paginated for PlaylistListResponse {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

impl Paginated for PlaylistItemListResponse {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

/// The resource kinds that support continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagedResource {
    /// Tag `"playlist"`.
    Playlist,
    /// Tag `"playlistItem"`.
    PlaylistItem,
}

impl FromStr for PagedResource {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "playlist" => Ok(Self::Playlist),
            "playlistItem" => Ok(Self::PlaylistItem),
            other => Err(Error::InvalidResourceKind(other.to_string())),
        }
    }
}

impl PagedResource {
    /// The endpoint whose requests this kind knows how to continue.
    pub fn resource(self) -> Resource {
        match self {
            Self::Playlist => Resource::Playlists,
            Self::PlaylistItem => Resource::PlaylistItems,
        }
    }

    /// Builds the request for the page after `response`, or `None` on the last page.
    ///
    /// The follow-up is `request` with `pageToken` set to the response's `nextPageToken`.
    pub fn next_page<T: Paginated>(
        self,
        request: &ApiRequest<T>,
        response: &T,
    ) -> Result<Option<ApiRequest<T>>, Error> {
        let expected = self.resource();
        if request.resource() != expected {
            return Err(Error::ResourceMismatch {
                expected,
                found: request.resource(),
            });
        }

        let Some(token) = response.next_page_token() else {
            return Ok(None);
        };

        let mut next = request.clone();
        next.set_param("pageToken", token);
        Ok(Some(next))
    }
}

/// Dispatches on a resource-kind tag (`"playlist"` or `"playlistItem"`) to build the next-page
/// request.
///
/// Fails with [`Error::InvalidResourceKind`] for any other tag.
pub fn next_page_request<T: Paginated>(
    resource_type: &str,
    request: &ApiRequest<T>,
    response: &T,
) -> Result<Option<ApiRequest<T>>, Error> {
    resource_type
        .parse::<PagedResource>()?
        .next_page(request, response)
}
