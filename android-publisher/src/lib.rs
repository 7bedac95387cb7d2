// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Google Play Android Publisher API client.
//!
//! Just enough of the v3 publisher API to inspect release tracks: open an
//! edit, read one or all tracks, and optionally throw the edit away again.
//! See <https://developers.google.com/android-publisher> for the service.

pub mod cli;
pub mod config;
pub mod edits_api;
mod error;
mod oauth_token;
pub mod output;
mod service_account;
pub mod session;
#[cfg(test)]
mod testutil;
pub mod tracks_api;

use {
    reqwest::{
        blocking::{Client, ClientBuilder, RequestBuilder, Response},
        Url,
    },
    serde::de::DeserializeOwned,
    serde_json::Value,
    std::{
        path::Path,
        sync::{Mutex, PoisonError},
        time::Duration,
    },
};

pub use crate::error::{ApiError, AuthError, ConfigError, PublisherError, ShapeError};
pub use crate::oauth_token::{AccessToken, TokenEncoder, ANDROID_PUBLISHER_SCOPE};
pub use crate::service_account::{ServiceAccountKey, DEFAULT_TOKEN_URI};

use crate::{edits_api::AppEdit, tracks_api::Track};

pub type Result<T> = std::result::Result<T, PublisherError>;

/// Base URL of the `applications` collection of the v3 API.
pub const ANDROID_PUBLISHER_API_URL: &str =
    "https://androidpublisher.googleapis.com/androidpublisher/v3/applications";

/// The read and edit calls track queries are built on.
///
/// [AndroidPublisherClient] talks to the real service. Anything else
/// implementing this can stand in for it.
pub trait PublisherApi {
    /// Open a new edit for an app.
    fn insert_edit(&self, package_name: &str) -> Result<AppEdit>;

    /// Abandon an edit without committing it.
    fn delete_edit(&self, package_name: &str, edit_id: &str) -> Result<()>;

    /// Fetch a single track of an edit.
    fn get_track(&self, package_name: &str, edit_id: &str, track: &str) -> Result<Track>;

    /// Fetch every track of an edit, in the order the service reports them.
    fn list_tracks(&self, package_name: &str, edit_id: &str) -> Result<Vec<Track>>;
}

/// A client for the Android Publisher API.
pub struct AndroidPublisherClient {
    client: Client,
    api_url: Url,
    token_encoder: TokenEncoder,
    token: Mutex<Option<AccessToken>>,
}

impl AndroidPublisherClient {
    /// Create a client from a service account key file.
    ///
    /// The key is fully validated here, so unusable credentials are reported
    /// before any request is made.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let key = ServiceAccountKey::from_json_path(path)?;
        AndroidPublisherClient::new(key.try_into()?)
    }

    /// Create a client from resolved command settings.
    pub fn from_settings(settings: &config::Settings) -> Result<Self> {
        let key = ServiceAccountKey::from_json_path(&settings.credentials)?;

        Self::with_options(key.try_into()?, &settings.api_url, settings.timeout)
    }

    /// Create a new client to the Android Publisher API.
    pub fn new(token_encoder: TokenEncoder) -> Result<Self> {
        Self::with_options(token_encoder, ANDROID_PUBLISHER_API_URL, None)
    }

    /// Create a client against a custom API location with an optional
    /// per-request timeout.
    pub fn with_options(
        token_encoder: TokenEncoder,
        api_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = ClientBuilder::default().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let invalid_url = |message: String| ApiError::InvalidUrl {
            url: api_url.to_string(),
            message,
        };
        let parsed = Url::parse(api_url).map_err(|e| invalid_url(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid_url("not a hierarchical URL".into()).into());
        }

        Ok(Self {
            client: builder.build()?,
            api_url: parsed,
            token_encoder,
            token: Mutex::new(None),
        })
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_str()
    }

    /// Obtain a bearer token, minting a new one if the cached token expired.
    pub fn get_token(&self) -> Result<String> {
        let mut token = self.token.lock().unwrap_or_else(PoisonError::into_inner);

        match token.as_ref() {
            Some(cached) if cached.is_usable() => Ok(cached.as_str().to_string()),
            _ => {
                let fresh = self.fetch_access_token()?;
                let value = fresh.as_str().to_string();
                token.replace(fresh);

                Ok(value)
            }
        }
    }

    pub fn send_request(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        let method = request.method().to_string();
        let url = request.url().to_string();

        log::debug!("{} {}", method, url);

        let response = self.client.execute(request)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.bytes()?;

            Err(ApiError::Status {
                method,
                url,
                status,
                message: describe_body(body.as_ref()),
            }
            .into())
        }
    }

    /// Send a request and decode its JSON response body.
    pub fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send_request(request)?;
        let url = response.url().to_string();
        let body = response.bytes()?;

        Ok(serde_json::from_slice(body.as_ref())
            .map_err(|source| ApiError::Decode { url, source })?)
    }

    /// URL of a resource below an application.
    ///
    /// Every segment is percent-encoded on its own, so names containing `/`,
    /// `?` or `#` stay a single segment.
    fn application_url(&self, package_name: &str, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();

        // Hierarchical URLs are enforced at construction.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(package_name).extend(segments);
        }

        url
    }
}

impl PublisherApi for AndroidPublisherClient {
    fn insert_edit(&self, package_name: &str) -> Result<AppEdit> {
        Self::insert_edit(self, package_name)
    }

    fn delete_edit(&self, package_name: &str, edit_id: &str) -> Result<()> {
        Self::delete_edit(self, package_name, edit_id)
    }

    fn get_track(&self, package_name: &str, edit_id: &str, track: &str) -> Result<Track> {
        Self::get_track(self, package_name, edit_id, track)
    }

    fn list_tracks(&self, package_name: &str, edit_id: &str) -> Result<Vec<Track>> {
        Ok(Self::list_tracks(self, package_name, edit_id)?.tracks)
    }
}

/// Render an error response body for humans.
///
/// JSON bodies are pretty printed. Anything else is passed through.
fn describe_body(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    } else {
        String::from_utf8_lossy(body).into()
    }
}
