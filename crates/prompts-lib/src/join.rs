//! Join of the metadata and body tables.
//!
//! Every metadata record is resolved to its body inside the caller's read
//! transaction, so the resulting prompts all come from one consistent
//! snapshot of the store.

use crate::error::{PromptError, Result};
use crate::key;
use crate::kv::{ReadTxn, Table};
use crate::model::{Metadata, Prompt};

/// Resolve every metadata record to a whole [`Prompt`].
///
/// The body is looked up under the key derived from the metadata record's
/// own `id` (see [`key::body_key`]), not under the key the metadata record
/// was found at. Prompts come out in metadata iteration order.
///
/// # Errors
///
/// Returns `MetadataDecode` if a metadata value is not valid JSON metadata,
/// `OrphanedMetadata` if a body is missing, or `Read` if the store fails.
/// No partial result is returned on error.
pub fn join_prompts<T: ReadTxn + ?Sized>(txn: &T) -> Result<Vec<Prompt>> {
    let mut prompts = Vec::new();

    for entry in txn.iter(Table::Metadata)? {
        let (stored_key, value) = entry?;
        let metadata: Metadata =
            serde_json::from_slice(value).map_err(|e| PromptError::MetadataDecode {
                key: key::display_key(stored_key),
                reason: e.to_string(),
            })?;

        let body_key = key::body_key(&metadata.id.uuid)?;
        if body_key != stored_key {
            tracing::debug!(
                stored_key = %key::display_key(stored_key),
                body_key = %key::display_key(&body_key),
                "Metadata key differs from derived body key"
            );
        }

        let body = txn
            .get(Table::Bodies, &body_key)?
            .ok_or_else(|| PromptError::OrphanedMetadata {
                uuid: metadata.id.uuid.clone(),
            })?;

        let content = match std::str::from_utf8(body) {
            Ok(text) => text.to_string(),
            Err(_) => {
                tracing::warn!(uuid = %metadata.id.uuid, "Body is not valid UTF-8; replacing invalid bytes");
                String::from_utf8_lossy(body).into_owned()
            }
        };

        prompts.push(Prompt { metadata, content });
    }

    tracing::debug!(count = prompts.len(), "Joined prompts");
    Ok(prompts)
}

/// Raw metadata keys in iteration order.
///
/// # Errors
///
/// Returns `Read` if the store fails.
pub fn metadata_keys<T: ReadTxn + ?Sized>(txn: &T) -> Result<Vec<Vec<u8>>> {
    txn.iter(Table::Metadata)?
        .map(|entry| entry.map(|(stored_key, _)| stored_key.to_vec()))
        .collect()
}
