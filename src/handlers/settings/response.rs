//! Settings response DTOs

use serde::Serialize;

/// Acknowledgement of a background sync trigger
#[derive(Debug, Serialize)]
pub struct SyncStartedResponse {
    pub message: String,
}
