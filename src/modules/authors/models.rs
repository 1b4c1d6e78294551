use serde::Deserialize;

use crate::catalog::AuthorDraft;

/// Body of `POST` and `PUT /api/authors`. Missing names are treated as blank
/// so they surface as validation errors rather than parse errors.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayload {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl AuthorPayload {
    pub fn into_draft(self) -> AuthorDraft {
        AuthorDraft {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
        }
    }
}
