// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Edits.
//!
//! Every read or write of an app's store listing happens inside an edit. We
//! only ever read from edits; nothing is committed.

use {
    crate::{AndroidPublisherClient, Result},
    serde::{Deserialize, Serialize},
};

impl AndroidPublisherClient {
    /// Open a new edit.
    pub fn insert_edit(&self, package_name: &str) -> Result<AppEdit> {
        let token = self.get_token()?;
        let req = self
            .client
            .post(self.application_url(package_name, &["edits"]))
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(&AppEdit::default());
        self.send_json(req)
    }

    /// Delete an edit, discarding any changes made in it.
    pub fn delete_edit(&self, package_name: &str, edit_id: &str) -> Result<()> {
        let token = self.get_token()?;
        let req = self
            .client
            .delete(self.application_url(package_name, &["edits", edit_id]))
            .bearer_auth(token);
        self.send_request(req)?;
        Ok(())
    }
}

/// An app edit.
///
/// Inserted with an empty body; the service fills in both fields.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppEdit {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Seconds since the UNIX epoch after which the edit is gone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time_seconds: Option<String>,
}
