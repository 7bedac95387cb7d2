// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rendering query results.

use {crate::tracks_api::TrackRelease, std::io::Write};

/// The answer to a query, ready to print.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// Printed as indented JSON.
    Release(TrackRelease),
    /// Printed as an indented JSON array.
    TrackNames(Vec<String>),
    /// Printed bare.
    VersionCode(i64),
}

impl Output {
    pub fn write_to(&self, writer: &mut impl Write) -> std::io::Result<()> {
        match self {
            Self::Release(release) => write_json(writer, release),
            Self::TrackNames(names) => write_json(writer, names),
            Self::VersionCode(code) => writeln!(writer, "{code}"),
        }
    }
}

fn write_json(writer: &mut impl Write, value: &impl serde::Serialize) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::tracks_api::{CountryTargeting, LocalizedText},
    };

    fn render(output: &Output) -> String {
        let mut buf = Vec::new();
        output.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn version_code_is_bare() {
        assert_eq!(render(&Output::VersionCode(42)), "42\n");
    }

    #[test]
    fn track_names_are_indented_json() {
        assert_eq!(
            render(&Output::TrackNames(vec!["production".into(), "beta".into()])),
            "[\n  \"production\",\n  \"beta\"\n]\n"
        );
    }

    #[test]
    fn no_tracks() {
        assert_eq!(render(&Output::TrackNames(vec![])), "[]\n");
    }

    #[test]
    fn release_is_indented_json() {
        let release = TrackRelease {
            name: Some("2.4.1".into()),
            version_codes: vec![2040100],
            status: Some("completed".into()),
            ..Default::default()
        };

        assert_eq!(
            render(&Output::Release(release)),
            concat!(
                "{\n",
                "  \"name\": \"2.4.1\",\n",
                "  \"versionCodes\": [\n",
                "    \"2040100\"\n",
                "  ],\n",
                "  \"status\": \"completed\"\n",
                "}\n"
            )
        );
    }

    #[test]
    fn printed_release_parses_back() {
        let release = TrackRelease {
            name: Some("3.0.0".into()),
            version_codes: vec![300],
            status: Some("inProgress".into()),
            user_fraction: Some(0.25),
            release_notes: vec![LocalizedText {
                language: "de-DE".into(),
                text: "Fehlerbehebungen.".into(),
            }],
            country_targeting: Some(CountryTargeting {
                countries: vec!["AT".into()],
                include_rest_of_world: true,
            }),
            in_app_update_priority: Some(5),
            extra: serde_json::json!({"expeditedRollout": true, "rolloutInfo": {"x": 1}})
                .as_object()
                .cloned()
                .unwrap(),
        };

        let printed = render(&Output::Release(release.clone()));
        let parsed: TrackRelease = serde_json::from_str(&printed).unwrap();

        assert!(printed.contains("\"expeditedRollout\": true"));
        assert_eq!(parsed, release);
    }
}
