//! Request descriptors produced by the builders on [`YouTubeClient`](super::YouTubeClient).

use http::Method;
use std::fmt;
use std::marker::PhantomData;

/// The YouTube Data API resources this crate talks to.
///
/// Each maps to `{api_base}/{resource}`, e.g. `https://www.googleapis.com/youtube/v3/playlists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Playlists,
    Channels,
    PlaylistItems,
    Search,
    Videos,
}

impl Resource {
    /// The URL path segment for this resource.
    pub fn path(self) -> &'static str {
        match self {
            Self::Playlists => "playlists",
            Self::Channels => "channels",
            Self::PlaylistItems => "playlistItems",
            Self::Search => "search",
            Self::Videos => "videos",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A fully-shaped API request that has not been sent yet.
///
/// `T` is the response type that [`YouTubeClient::execute`](super::YouTubeClient::execute)
/// decodes. Query parameters keep the order they were added in.
#[derive(Debug)]
pub struct ApiRequest<T> {
    method: Method,
    resource: Resource,
    params: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
    response: PhantomData<fn() -> T>,
}

impl<T> Clone for ApiRequest<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            resource: self.resource,
            params: self.params.clone(),
            body: self.body.clone(),
            response: PhantomData,
        }
    }
}

impl<T> ApiRequest<T> {
    /// Starts a `GET {resource}` list request.
    pub(crate) fn list(resource: Resource) -> Self {
        Self {
            method: Method::GET,
            resource,
            params: Vec::new(),
            body: None,
            response: PhantomData,
        }
    }

    /// Starts a `POST {resource}` insert request carrying `body`.
    pub(crate) fn insert(resource: Resource, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            resource,
            params: Vec::new(),
            body: Some(body),
            response: PhantomData,
        }
    }

    /// Sets a query parameter, replacing any earlier value under the same name.
    pub(crate) fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set_param(name, value);
        self
    }

    pub(crate) fn set_param(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Looks up a query parameter by name.
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All query parameters in insertion order.
    pub fn params(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.params.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// The JSON body for write requests.
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}
