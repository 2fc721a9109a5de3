//! Command implementations.

pub mod export;
pub mod import;
pub mod list;
pub mod version;
