//! Canonical key encoding for prompt identities.
//!
//! A key is the compact JSON form of a [`PromptId`], e.g.
//! `{"kind":"User","uuid":"abc"}`. Both tables use these bytes verbatim,
//! so two logically equal identities must always encode identically.

use serde::Deserialize;

use crate::error::{PromptError, Result};
use crate::model::{Kind, PromptId};

/// Strict mirror of [`PromptId`] used for decoding stored keys: both fields
/// are required and nothing else is allowed.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredKey {
    kind: Kind,
    uuid: String,
}

/// Encode an identity as its canonical key.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn encode(id: &PromptId) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(id)?)
}

/// Decode a stored key back into an identity.
///
/// # Errors
///
/// Returns `MalformedKey` if the bytes are not a JSON object with exactly a
/// string `kind` and a string `uuid`.
pub fn decode(bytes: &[u8]) -> Result<PromptId> {
    let stored: StoredKey =
        serde_json::from_slice(bytes).map_err(|e| PromptError::MalformedKey {
            key: display_key(bytes),
            reason: e.to_string(),
        })?;
    Ok(PromptId {
        kind: stored.kind,
        uuid: stored.uuid,
    })
}

/// Key under which the body of the prompt with `uuid` is stored.
///
/// Bodies are always addressed as user prompts, whatever key the metadata
/// record itself was found under.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn body_key(uuid: &str) -> Result<Vec<u8>> {
    encode(&PromptId::user(uuid))
}

/// Render key bytes for messages and listings.
#[must_use]
pub fn display_key(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
