//! Conditions that callers may want to match on.
//!
//! Everything else surfaces as a plain [`eyre::Report`]. These variants travel inside that report
//! and can be recovered with [`eyre::Report::downcast_ref`].

use crate::youtube_api::request::Resource;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `forUsername` channel lookup returned no channels.
    #[error("No channel found for {username}")]
    ChannelNotFound { username: String },

    /// The pagination dispatcher was handed a tag it does not know.
    #[error("Expected resource_type \"playlist\" or \"playlistItem\", got {0:?}")]
    InvalidResourceKind(String),

    /// A request was paged with the rule for a different endpoint.
    #[error("cannot page a {found} request as {expected}")]
    ResourceMismatch { expected: Resource, found: Resource },

    /// Key-based access was requested without an API key.
    #[error("no YouTube API key configured (set YOUTUBE_API_KEY or pass --api-key)")]
    MissingApiKey,
}
