// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tracks and releases.
//!
//! See <https://developers.google.com/android-publisher/api-ref/rest/v3/edits.tracks>.

use {
    crate::{AndroidPublisherClient, Result},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

/// Tracks every app has. Apps may define additional closed testing tracks.
pub const WELL_KNOWN_TRACKS: [&str; 4] = ["production", "beta", "alpha", "internal"];

impl AndroidPublisherClient {
    pub fn get_track(&self, package_name: &str, edit_id: &str, track: &str) -> Result<Track> {
        let token = self.get_token()?;
        let req = self
            .client
            .get(self.application_url(
                package_name,
                &["edits", edit_id, "tracks", track],
            ))
            .bearer_auth(token)
            .header("Accept", "application/json");
        self.send_json(req)
    }

    pub fn list_tracks(&self, package_name: &str, edit_id: &str) -> Result<TracksListResponse> {
        let token = self.get_token()?;
        let req = self
            .client
            .get(self.application_url(package_name, &["edits", edit_id, "tracks"]))
            .bearer_auth(token)
            .header("Accept", "application/json");
        self.send_json(req)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TracksListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// A release channel and the releases currently on it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub track: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub releases: Vec<TrackRelease>,
}

/// A set of version codes rolled out together on a track.
///
/// Optional fields absent from the service response are omitted again when
/// serialized, and fields not modelled here are carried in `extra`, so
/// printing a release reproduces what the service sent.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackRelease {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The service sends these as strings since they are 64 bit.
    #[serde(default, with = "version_codes", skip_serializing_if = "Vec::is_empty")]
    pub version_codes: Vec<i64>,

    /// One of `draft`, `inProgress`, `halted` or `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Fraction of users receiving a staged rollout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fraction: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_notes: Vec<LocalizedText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_targeting: Option<CountryTargeting>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_app_update_priority: Option<i64>,

    /// Anything else the service reports, e.g. `expeditedRollout`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    /// BCP-47 language tag, e.g. `en-US`.
    pub language: String,
    pub text: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountryTargeting {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_rest_of_world: bool,
}

/// Version codes as decimal strings on the wire.
///
/// Plain JSON numbers are accepted too.
mod version_codes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum VersionCode {
        Number(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(codes: &[i64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(codes.iter().map(|code| code.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
        Vec::<VersionCode>::deserialize(deserializer)?
            .into_iter()
            .map(|code| match code {
                VersionCode::Number(v) => Ok(v),
                VersionCode::Text(s) => s
                    .parse::<i64>()
                    .map_err(|_| D::Error::custom(format!("invalid version code: {s:?}"))),
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PRODUCTION_TRACK: &str = r#"{
        "track": "production",
        "releases": [
            {
                "name": "2.4.1",
                "versionCodes": ["2040100"],
                "status": "completed",
                "releaseNotes": [
                    {"language": "en-US", "text": "Bug fixes."}
                ]
            }
        ]
    }"#;

    #[test]
    fn parse_track() {
        let track: Track = serde_json::from_str(PRODUCTION_TRACK).unwrap();

        assert_eq!(track.track, "production");
        assert_eq!(track.releases.len(), 1);

        let release = &track.releases[0];
        assert_eq!(release.name.as_deref(), Some("2.4.1"));
        assert_eq!(release.version_codes, vec![2040100]);
        assert_eq!(release.status.as_deref(), Some("completed"));
        assert_eq!(
            release.release_notes,
            vec![LocalizedText {
                language: "en-US".into(),
                text: "Bug fixes.".into()
            }]
        );
        assert_eq!(release.user_fraction, None);
    }

    #[test]
    fn version_codes_serialize_as_strings() {
        let release = TrackRelease {
            version_codes: vec![42, 9_000_000_001],
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&release).unwrap(),
            serde_json::json!({"versionCodes": ["42", "9000000001"]})
        );
    }

    #[test]
    fn numeric_version_codes_accepted() {
        let release: TrackRelease =
            serde_json::from_str(r#"{"versionCodes": [7, "8"]}"#).unwrap();
        assert_eq!(release.version_codes, vec![7, 8]);

        assert!(serde_json::from_str::<TrackRelease>(r#"{"versionCodes": ["x"]}"#).is_err());
    }

    #[test]
    fn unmodelled_fields_are_kept() {
        let body = serde_json::json!({
            "versionCodes": ["1"],
            "status": "completed",
            "expeditedRollout": true,
            "rolloutInfo": {"x": 1}
        });

        let release: TrackRelease = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(release.version_codes, vec![1]);
        assert_eq!(release.extra.get("expeditedRollout"), Some(&Value::Bool(true)));
        assert!(!release.extra.contains_key("status"));

        assert_eq!(serde_json::to_value(&release).unwrap(), body);
    }

    #[test]
    fn empty_track_has_no_releases() {
        let track: Track = serde_json::from_str(r#"{"track": "alpha"}"#).unwrap();
        assert!(track.releases.is_empty());
    }

    #[test]
    fn staged_rollout_fields() {
        let release: TrackRelease = serde_json::from_str(
            r#"{
                "versionCodes": ["101"],
                "status": "inProgress",
                "userFraction": 0.1,
                "countryTargeting": {"countries": ["DE", "FR"]},
                "inAppUpdatePriority": 3
            }"#,
        )
        .unwrap();

        assert_eq!(release.user_fraction, Some(0.1));
        assert_eq!(release.in_app_update_priority, Some(3));
        assert_eq!(
            release.country_targeting,
            Some(CountryTargeting {
                countries: vec!["DE".into(), "FR".into()],
                include_rest_of_world: false,
            })
        );
    }

    #[test]
    fn list_response_preserves_order() {
        let res: TracksListResponse = serde_json::from_str(
            r#"{
                "kind": "androidpublisher#tracksListResponse",
                "tracks": [
                    {"track": "production"},
                    {"track": "beta"},
                    {"track": "alpha"},
                    {"track": "internal"}
                ]
            }"#,
        )
        .unwrap();

        let names = res.tracks.iter().map(|t| t.track.as_str()).collect::<Vec<_>>();
        assert_eq!(names, WELL_KNOWN_TRACKS);
    }
}
