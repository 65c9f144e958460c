//! Session history and key-value persistence.

mod export;
mod file;
mod kv;
mod memory;

pub use export::{
    DownloadableFile, ExportFormat, ExportedFile, downloadable_file, downloadable_key, export_session,
};
pub use file::FileSessionStore;
pub use kv::{FileKvStore, MemoryKvStore};
pub use memory::MemorySessionStore;

/// Default number of sessions kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Move `id` to the front of a newest-first history, returning the ids
/// pushed out past `limit`.
pub(crate) fn promote(history: &mut Vec<String>, id: &str, limit: usize) -> Vec<String> {
    history.retain(|existing| existing != id);
    history.insert(0, id.to_string());
    if history.len() > limit {
        history.split_off(limit.max(1))
    } else {
        Vec::new()
    }
}

/// Ids double as file names; anything outside `[A-Za-z0-9_-]` is refused.
pub(crate) fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
