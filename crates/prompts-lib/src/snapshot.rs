//! Snapshot (de)serialization.
//!
//! A snapshot is a pretty-printed JSON array of prompts, each carrying its
//! metadata record and the raw body text:
//!
//! ```json
//! [
//!   {
//!     "metadata": {
//!       "id": { "kind": "User", "uuid": "abc" },
//!       "title": "Greeting",
//!       "default": false,
//!       "saved_at": "2025-01-01T00:00:00Z"
//!     },
//!     "content": "Hello"
//!   }
//! ]
//! ```

use crate::error::{PromptError, Result};
use crate::model::Prompt;

/// Serialize prompts as an indented JSON array, in the given order.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn encode(prompts: &[Prompt]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(prompts)?)
}

/// Parse a snapshot.
///
/// `metadata.id.uuid` and `content` are required. `kind` defaults to
/// `User`, `title` and `saved_at` to empty and `default` to `false`, both
/// when absent and when `null`. Any `kind` string is accepted as is.
///
/// # Errors
///
/// Returns `SnapshotParse` if the bytes are not a JSON array of prompts.
pub fn decode(bytes: &[u8]) -> Result<Vec<Prompt>> {
    serde_json::from_slice(bytes).map_err(|e| PromptError::SnapshotParse {
        reason: e.to_string(),
    })
}
