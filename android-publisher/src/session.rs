// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Edit sessions and the track queries run inside them.

use {
    crate::{
        edits_api::AppEdit,
        output::Output,
        tracks_api::{Track, TrackRelease},
        PublisherApi, PublisherError, Result, ShapeError,
    },
    log::{info, warn},
};

/// An open edit for one app.
///
/// Dropping a session leaves the edit on the server, where it lingers until
/// it expires. Call [EditSession::discard] to delete it instead.
pub struct EditSession<'a, A: PublisherApi + ?Sized> {
    api: &'a A,
    package_id: String,
    edit: AppEdit,
}

impl<'a, A: PublisherApi + ?Sized> EditSession<'a, A> {
    /// Open a new edit for `package_id`.
    pub fn open(api: &'a A, package_id: &str) -> Result<Self> {
        if package_id.trim().is_empty() {
            return Err(PublisherError::EmptyPackageId);
        }

        let edit = api.insert_edit(package_id)?;

        info!("opened edit {} for {}", edit.id, package_id);
        if let Some(expiry) = &edit.expiry_time_seconds {
            log::debug!("edit {} expires at {}", edit.id, expiry);
        }

        Ok(Self {
            api,
            package_id: package_id.to_string(),
            edit,
        })
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn edit_id(&self) -> &str {
        &self.edit.id
    }

    /// The only release on a track.
    ///
    /// Tracks in the middle of a staged rollout can carry several releases.
    /// Those are refused rather than guessing which one is wanted.
    pub fn get_track(&self, track: &str) -> Result<TrackRelease> {
        let track = self.api.get_track(&self.package_id, &self.edit.id, track)?;

        Ok(single_release(track)?)
    }

    /// Names of all tracks of the app, in service order.
    pub fn list_tracks(&self) -> Result<Vec<String>> {
        Ok(self
            .api
            .list_tracks(&self.package_id, &self.edit.id)?
            .into_iter()
            .map(|track| track.track)
            .collect())
    }

    /// The version code of the only release on a track.
    pub fn get_version_code(&self, track: &str) -> Result<i64> {
        let release = self.get_track(track)?;

        Ok(single_version_code(track, &release)?)
    }

    /// Run a query against this edit.
    pub fn run(&self, query: &Query) -> Result<Output> {
        Ok(match query {
            Query::Track(track) => Output::Release(self.get_track(track)?),
            Query::TrackNames => Output::TrackNames(self.list_tracks()?),
            Query::VersionCode(track) => Output::VersionCode(self.get_version_code(track)?),
        })
    }

    /// Delete the edit on the server.
    pub fn discard(self) -> Result<()> {
        self.api.delete_edit(&self.package_id, &self.edit.id)?;
        info!("deleted edit {} for {}", self.edit.id, self.package_id);

        Ok(())
    }
}

/// What to ask of an edit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Query {
    /// The single release on the named track.
    Track(String),
    /// Names of every track.
    TrackNames,
    /// The single version code on the named track.
    VersionCode(String),
}

/// Open an edit, answer one query and optionally delete the edit again.
///
/// When `discard_edit` is set the edit is deleted whether or not the query
/// succeeded. A failure to delete only surfaces if the query itself worked.
pub fn execute<A: PublisherApi + ?Sized>(
    api: &A,
    package_id: &str,
    query: &Query,
    discard_edit: bool,
) -> Result<Output> {
    let session = EditSession::open(api, package_id)?;
    let res = session.run(query);

    if !discard_edit {
        return res;
    }

    match (res, session.discard()) {
        (Ok(output), Ok(())) => Ok(output),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(discard_err)) => {
            warn!("unable to delete edit: {}", discard_err);
            Err(e)
        }
    }
}

/// Require a track to carry exactly one release.
pub fn single_release(track: Track) -> std::result::Result<TrackRelease, ShapeError> {
    let count = track.releases.len();
    let mut releases = track.releases.into_iter();

    match (releases.next(), count) {
        (Some(release), 1) => Ok(release),
        _ => Err(ShapeError::ReleaseCount {
            track: track.track,
            count,
        }),
    }
}

/// Require a release to carry exactly one version code.
pub fn single_version_code(
    track: &str,
    release: &TrackRelease,
) -> std::result::Result<i64, ShapeError> {
    match release.version_codes.as_slice() {
        [code] => Ok(*code),
        codes => Err(ShapeError::VersionCodeCount {
            track: track.to_string(),
            count: codes.len(),
        }),
    }
}
