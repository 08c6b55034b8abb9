//! Constants and paths that shape every session.

use std::path::{Path, PathBuf};

/// Base URL of the YouTube Data API v3.
pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Scope requested during the consent flow. Inserting playlist items needs write access, so the
/// read-only scope is not enough.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

/// Page-size cap for playlist and channel listings (the API maximum).
pub const PLAYLIST_SEARCH_MAX_RESULTS: u32 = 50;

/// Page-size cap for playlist items and video searches (the API maximum).
pub const VIDEO_SEARCH_MAX_RESULTS: u32 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    /// Key for unauthenticated access by channel ID or username.
    pub api_key: Option<String>,
    /// Google OAuth `client_secrets.json` downloaded from the API console.
    pub client_secrets_file: PathBuf,
    /// Where the OAuth credential is cached between runs.
    pub credential_file: PathBuf,
    pub scopes: Vec<String>,
    pub playlist_max_results: u32,
    pub video_max_results: u32,
    pub api_base_url: String,
}

impl Config {
    /// Defaults for the program at `program`, caching credentials in `<program>-oauth2.json`.
    pub fn for_program(program: impl AsRef<Path>) -> Self {
        Self {
            api_key: None,
            client_secrets_file: PathBuf::from("client_secrets.json"),
            credential_file: default_credential_file(program.as_ref()),
            scopes: vec![YOUTUBE_SCOPE.to_string()],
            playlist_max_results: PLAYLIST_SEARCH_MAX_RESULTS,
            video_max_results: VIDEO_SEARCH_MAX_RESULTS,
            api_base_url: YOUTUBE_API_BASE.to_string(),
        }
    }
}

/// The credential cache path for a program: its own path with `-oauth2.json` appended.
pub fn default_credential_file(program: &Path) -> PathBuf {
    let mut name = program.as_os_str().to_owned();
    name.push("-oauth2.json");
    PathBuf::from(name)
}
