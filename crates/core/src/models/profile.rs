//! User profile document.

use serde::{Deserialize, Serialize};

use crate::types::DocId;

/// A row in the `profiles` collection. The document id is the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    pub email: String,
    pub created_at: String,
    /// Per-user key for the avatar video provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heygen_api_key: Option<String>,
}

super::impl_document!(Profile, "profiles");
