// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types.
//!
//! Every failure the publisher client can produce falls into one of three
//! buckets: the credentials could not be used ([AuthError]), a call to the
//! remote service failed ([ApiError]), or the service answered with data we
//! refuse to interpret ([ShapeError]).

use {std::path::PathBuf, thiserror::Error};

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("package id must not be empty")]
    EmptyPackageId,
}

impl From<reqwest::Error> for PublisherError {
    fn from(e: reqwest::Error) -> Self {
        Self::Api(ApiError::Transport(e))
    }
}

impl PublisherError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }
}

/// The service account credentials could not be loaded or were refused.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unable to read credentials file {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid service account credentials")]
    Json(#[from] serde_json::Error),

    #[error("credentials are of type {0:?}; expected a service_account key")]
    AccountType(String),

    #[error("invalid PEM formatted private key")]
    InvalidPem,

    #[error("unusable service account private key")]
    Key(#[source] jsonwebtoken::errors::Error),

    #[error("token exchange rejected:\nPOST {url} (HTTP {status})\n{message}")]
    TokenExchange {
        url: String,
        status: u16,
        message: String,
    },
}

/// A request to the remote service failed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("android publisher api error:\n{method} {url} (HTTP {status})\n{message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("invalid api url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("http transport error")]
    Transport(#[source] reqwest::Error),

    #[error("malformed response from {url}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// The service returned data that does not have the shape a query requires.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ShapeError {
    #[error("track {track} has {count} releases; expected exactly one")]
    ReleaseCount { track: String, count: usize },

    #[error("release on track {track} has {count} version codes; expected exactly one")]
    VersionCodeCount { track: String, count: usize },
}

/// Command line and config file settings could not be resolved.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing --package (or APB_PACKAGE, or `package` in a config file)")]
    MissingPackage,

    #[error("invalid configuration")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}
