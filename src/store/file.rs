use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};

use super::PreferenceStore;

/// Preferences persisted as a flat JSON object on disk.
/// Every `set`/`remove` writes the whole file back.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) a preference file. A missing file starts
    /// empty; an unreadable or corrupt one is logged and also starts empty.
    pub fn open(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Preference file {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => {
                debug!("No preference file at {}, starting empty", path.display());
                HashMap::new()
            }
        };

        FileStore {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), String> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| e.to_string())?;
            }
        }
        // sorted keys keep the file diff-friendly
        let sorted: BTreeMap<&String, &String> = entries.iter().collect();
        let json = serde_json::to_string_pretty(&sorted).map_err(|e| e.to_string())?;
        fs::write(&self.path, json).map_err(|e| e.to_string())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let mut entries = self.entries.lock().map_err(|e| e.to_string())?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let mut entries = self.entries.lock().map_err(|e| e.to_string())?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn all(&self) -> HashMap<String, String> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Atomic counter for unique temp file names so parallel tests don't collide.
    static TEMP_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

    pub(crate) fn temp_path(tag: &str) -> PathBuf {
        let id = TEMP_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "linkpage_{}_{}_{}.json",
            tag,
            std::process::id(),
            id
        ))
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path("reopen");
        {
            let store = FileStore::open(&path);
            store.set("theme", "dark").unwrap();
            store.set("bioBg", "https://example.com/bg.gif").unwrap();
        }
        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("theme"), Some("dark".to_string()));
        assert_eq!(
            reopened.get("bioBg"),
            Some("https://example.com/bg.gif".to_string())
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_remove_is_persisted() {
        let path = temp_path("remove");
        let store = FileStore::open(&path);
        store.set("bioBg", "data:image/png;base64,AAAA").unwrap();
        store.remove("bioBg").unwrap();
        let reopened = FileStore::open(&path);
        assert!(reopened.get("bioBg").is_none());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();
        let store = FileStore::open(&path);
        assert!(store.all().is_empty());
        store.set("theme", "light").unwrap();
        assert_eq!(FileStore::open(&path).get("theme"), Some("light".to_string()));
        let _ = fs::remove_file(&path);
    }
}
