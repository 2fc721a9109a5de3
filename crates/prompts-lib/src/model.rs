//! Core data types for prompts-lib.
//!
//! The serde format matches what the Zed editor writes into its prompt
//! library, so stored metadata and snapshot documents share one shape.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Prompt kind discriminator.
///
/// Zed writes `User` for every prompt it stores; any other tag found in a
/// store or snapshot is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Kind {
    #[default]
    User,
    #[serde(untagged)]
    Custom(String),
}

impl Kind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "User",
            Self::Custom(tag) => tag,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Identity shared by a metadata record and its body.
///
/// Field order is significant: it fixes the canonical key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PromptId {
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: Kind,
    pub uuid: String,
}

impl PromptId {
    /// Identity of a user prompt.
    #[must_use]
    pub fn user(uuid: impl Into<String>) -> Self {
        Self {
            kind: Kind::User,
            uuid: uuid.into(),
        }
    }
}

impl Default for PromptId {
    fn default() -> Self {
        Self::user(String::new())
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.uuid)
    }
}

/// Metadata record as stored in `metadata.v2`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: PromptId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default: bool,
    /// Kept verbatim so timestamps survive a round-trip byte for byte.
    #[serde(default, deserialize_with = "null_as_default")]
    pub saved_at: String,
}

/// A metadata record joined with its body: one element of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub metadata: Metadata,
    pub content: String,
}

impl Prompt {
    #[must_use]
    pub fn id(&self) -> &PromptId {
        &self.metadata.id
    }
}
