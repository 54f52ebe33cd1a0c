#[cfg(test)]
use std::collections::HashMap;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Visitor-local preference storage. Every theme/background preference read
/// or write goes through here.
/// Implementations: `MemoryStore` (ephemeral) and `FileStore` (JSON file).
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    /// Like `get`, but an empty stored string counts as absent.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty())
    }
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
    /// Snapshot of every entry.
    #[cfg(test)]
    fn all(&self) -> HashMap<String, String>;
}
