// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration files and resolved settings.
//!
//! Settings can live in TOML files so the package and key don't have to be
//! repeated on every invocation. Files are keyed by profile:
//!
//! ```toml
//! [default]
//! credentials = "~/keys/play-publisher.json"
//!
//! [myapp]
//! package = "com.example.myapp"
//! discard-edit = true
//! ```

use {
    crate::{ConfigError, ANDROID_PUBLISHER_API_URL},
    figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    },
    log::debug,
    serde::{Deserialize, Serialize},
    std::{
        ops::{Deref, DerefMut},
        path::{Path, PathBuf},
        time::Duration,
    },
};

/// Credentials file used when none is configured.
pub const DEFAULT_CREDENTIALS_FILE: &str = "google-play-api-key.json";

const CONFIG_FILE_NAME: &str = "android-publisher.toml";

/// Configuration profile definition.
///
/// Everything is optional here. [Config::resolve] applies defaults and
/// rejects incomplete configurations.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Application id, e.g. `com.example.myapp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Path to a service account JSON key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<PathBuf>,

    /// Per-request timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Delete the edit once the query finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_edit: Option<bool>,

    /// Alternate location of the `applications` API collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Config {
    /// Apply defaults and produce the settings commands run with.
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let package_id = self
            .package
            .filter(|p| !p.trim().is_empty())
            .ok_or(ConfigError::MissingPackage)?;

        Ok(Settings {
            package_id,
            credentials: self
                .credentials
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE)),
            timeout: self.timeout_secs.map(Duration::from_secs),
            discard_edit: self.discard_edit.unwrap_or(false),
            api_url: self
                .api_url
                .unwrap_or_else(|| ANDROID_PUBLISHER_API_URL.to_string()),
        })
    }
}

/// Fully resolved settings for one invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub package_id: String,
    pub credentials: PathBuf,
    pub timeout: Option<Duration>,
    pub discard_edit: bool,
    pub api_url: String,
}

/// Used to instantiate [Config] instances.
#[derive(Clone)]
pub struct ConfigBuilder {
    loader: Figment,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            loader: Figment::new(),
        }
    }
}

impl Deref for ConfigBuilder {
    type Target = Figment;

    fn deref(&self) -> &Self::Target {
        &self.loader
    }
}

impl DerefMut for ConfigBuilder {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.loader
    }
}

impl ConfigBuilder {
    /// Add the $XDG_CONFIG/android-publisher/android-publisher.toml user config file if it exists.
    pub fn with_user_config_file(mut self) -> Self {
        if let Some(base) = dirs::config_dir() {
            let p = base.join("android-publisher").join(CONFIG_FILE_NAME);
            debug!("registering user config file: {}", p.display());

            self.loader = self.loader.merge(Toml::file(p).nested());
        }

        self
    }

    /// Merge a config file from `pwd`/android-publisher.toml.
    pub fn with_cwd_config_file(mut self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            let p = cwd.join(CONFIG_FILE_NAME);
            debug!("registering cwd config file: {}", p.display());

            self.loader = self.loader.merge(Toml::file(p).nested());
        }

        self
    }

    /// Add a TOML config file to this instance.
    pub fn toml_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        debug!("registering custom config file: {}", path.display());
        self.loader = self.loader.merge(Toml::file(path).nested());
        self
    }

    /// Add a TOML string config to this instance.
    #[cfg(test)]
    fn toml_string(mut self, data: &str) -> Self {
        debug!("registering TOML string config data");
        self.loader = self.loader.merge(Toml::string(data).nested());
        self
    }

    /// Merge a [Config] struct into this builder.
    ///
    /// Values set on the struct override everything merged before.
    pub fn with_config_struct(mut self, config: Config) -> Self {
        debug!("registering config struct");
        let serialized = Serialized::defaults(config).profile(self.loader.profile().to_string());

        self.loader = self.loader.merge(serialized);
        self
    }

    /// Load the named profile instead of the `[default]` profile.
    pub fn profile(mut self, profile: String) -> Self {
        self.loader = self.loader.select(profile);
        self
    }

    /// Obtain a config profile.
    pub fn config(self) -> Result<Config, ConfigError> {
        Ok(self.loader.extract()?)
    }
}
