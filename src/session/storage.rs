//! Key/value repositories backing the session store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable client-side key/value storage.
///
/// Writes never fail from the caller's point of view; implementations log
/// and drop anything they cannot persist.
pub trait SessionRepository: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Session persisted as a JSON map in `<dir>/session.json`.
pub struct FileSessionRepository {
    session_dir: PathBuf,
}

impl FileSessionRepository {
    /// `~/.speechix`, if a home directory can be resolved.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".speechix"))
    }

    /// Create a repository with a custom directory.
    pub fn with_dir(session_dir: PathBuf) -> Self {
        Self { session_dir }
    }

    fn session_path(&self) -> PathBuf {
        self.session_dir.join("session.json")
    }

    fn load(&self) -> HashMap<String, String> {
        let path = self.session_path();
        if !path.exists() {
            return HashMap::new();
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable session file");
                HashMap::new()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read session file");
                HashMap::new()
            }
        }
    }

    fn store(&self, entries: &HashMap<String, String>) {
        let result = std::fs::create_dir_all(&self.session_dir).and_then(|_| {
            let json = serde_json::to_string_pretty(entries)?;
            std::fs::write(self.session_path(), json)
        });

        if let Err(e) = result {
            tracing::warn!(dir = %self.session_dir.display(), error = %e, "failed to persist session");
        }
    }
}

impl SessionRepository for FileSessionRepository {
    fn read(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn write(&self, key: &str, value: &str) {
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.store(&entries);
        }
    }
}

/// In-memory repository, mainly for tests.
#[derive(Default)]
pub struct MemorySessionRepository {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionRepository for MemorySessionRepository {
    fn read(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// Repository used when no durable storage exists. Reads nothing, keeps nothing.
pub struct DetachedRepository;

impl SessionRepository for DetachedRepository {
    fn read(&self, _key: &str) -> Option<String> {
        None
    }

    fn write(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}
}
