//! DTOs for the media endpoints.

use serde::{Deserialize, Serialize};

/// Query parameters for `GET /media`.
///
/// `token` is consumed by the auth middleware and ignored here.
#[derive(Debug, Default, Deserialize)]
pub struct MediaQuery {
    pub path: Option<String>,
    pub fresh: Option<String>,
}

impl MediaQuery {
    /// Only the literal `fresh=1` forces a refresh.
    pub fn is_fresh(&self) -> bool {
        self.fresh.as_deref() == Some("1")
    }
}

/// Query parameters for `GET /media/refresh`.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    pub path: Option<String>,
}

/// Confirmation body for `GET /media/refresh`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
