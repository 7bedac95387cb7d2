// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use {
    crate::{
        config::{Config, ConfigBuilder, Settings},
        session::{self, Query},
        tracks_api::WELL_KNOWN_TRACKS,
        AndroidPublisherClient,
    },
    anyhow::Result,
    clap::{ArgAction, Parser, Subcommand},
    log::{info, LevelFilter},
    std::{io::Write, path::PathBuf, str::FromStr},
};

/// Access the Android Publisher API
#[derive(Parser)]
#[command(name = "android-publisher", author, version, arg_required_else_help = true)]
pub struct Args {
    /// Load Google Play API credentials from FILE [default: google-play-api-key.json]
    #[arg(
        short = 'c',
        long = "cred",
        value_name = "FILE",
        env = "GOOGLE_PLAY_API_CREDENTIALS_FILE",
        global = true
    )]
    pub credentials: Option<PathBuf>,

    /// App package id
    #[arg(short = 'p', long, env = "APB_PACKAGE", global = true)]
    pub package: Option<String>,

    /// Delete the edit opened for the query once it finished
    #[arg(long, global = true)]
    pub discard_edit: bool,

    /// Abort requests taking longer than SECONDS
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Explicit configuration file to load.
    ///
    /// If provided, the default configuration files are not loaded, even
    /// if they exist. Can be specified multiple times. The special value
    /// `/dev/null` loads no file at all.
    #[arg(short = 'C', long = "config-file", global = true)]
    pub config_path: Vec<PathBuf>,

    /// Configuration profile to load.
    #[arg(short = 'P', long, global = true)]
    pub profile: Option<String>,

    /// Increase logging verbosity. Can be specified multiple times
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    pub fn config_builder(&self) -> ConfigBuilder {
        let mut config = ConfigBuilder::default();

        config = if self.config_path.is_empty() {
            config.with_user_config_file().with_cwd_config_file()
        } else {
            for path in &self.config_path {
                if path.display().to_string() == "/dev/null" {
                    break;
                }

                config = config.toml_file(path);
            }

            config
        };

        if let Some(profile) = &self.profile {
            config = config.profile(profile.to_string());
        }

        config
    }

    /// Settings given on the command line or through environment variables.
    pub fn as_config(&self) -> Config {
        Config {
            package: self.package.clone(),
            credentials: self.credentials.clone(),
            timeout_secs: self.timeout,
            discard_edit: self.discard_edit.then_some(true),
            api_url: None,
        }
    }

    /// Merge config files with the command line and resolve the result.
    pub fn settings(&self) -> Result<Settings> {
        Ok(self
            .config_builder()
            .with_config_struct(self.as_config())
            .config()?
            .resolve()?)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display info about a track
    #[command(name = "trackInfo")]
    TrackInfo {
        /// Track to show (production, beta, alpha, internal, ...) or `list`
        /// to show the names of all tracks.
        track: TrackSelector,
    },
    /// Print the version code released on a track
    #[command(name = "versionCode")]
    VersionCode {
        /// Track to show (production, beta, alpha, internal, ...)
        track: String,
    },
}

impl Commands {
    pub fn query(&self) -> Query {
        match self {
            Self::TrackInfo {
                track: TrackSelector::List,
            } => Query::TrackNames,
            Self::TrackInfo {
                track: TrackSelector::Track(name),
            } => Query::Track(name.clone()),
            Self::VersionCode { track } => Query::VersionCode(track.clone()),
        }
    }

    /// The track a command reads, if it reads a single one.
    pub fn track_name(&self) -> Option<&str> {
        match self {
            Self::TrackInfo {
                track: TrackSelector::Track(name),
            }
            | Self::VersionCode { track: name } => Some(name.as_str()),
            Self::TrackInfo {
                track: TrackSelector::List,
            } => None,
        }
    }

    pub fn run(&self, settings: &Settings) -> Result<()> {
        if let Some(track) = self.track_name() {
            if !is_well_known_track(track) {
                info!("{} is not a standard track; treating it as a custom testing track", track);
            }
        }

        let client = AndroidPublisherClient::from_settings(settings)?;

        let output = session::execute(
            &client,
            &settings.package_id,
            &self.query(),
            settings.discard_edit,
        )?;

        let mut stdout = std::io::stdout().lock();
        output.write_to(&mut stdout)?;
        stdout.flush()?;

        Ok(())
    }
}

/// A named track or all of them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TrackSelector {
    List,
    Track(String),
}

impl FromStr for TrackSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("track name must not be empty".into()),
            "list" => Ok(Self::List),
            name => Ok(Self::Track(name.to_string())),
        }
    }
}

fn is_well_known_track(name: &str) -> bool {
    WELL_KNOWN_TRACKS.contains(&name)
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    if log_level == LevelFilter::Info {
        builder.filter_module("rustls", LevelFilter::Error);
    }

    builder.init();
}

pub fn main_impl() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let settings = args.settings()?;

    args.command.run(&settings)
}
