use super::{Cookie, CookieStore};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory cookie store for tests and ephemeral runs.
///
/// Nothing survives the process. Writes replace records by name; expired
/// records are skipped on read. The store counts writes so tests can assert
/// that replayed decisions perform none.
pub struct MemoryCookieStore {
    entries: RwLock<Vec<Cookie>>,
    host: Option<String>,
    writes: AtomicUsize,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            host: None,
            writes: AtomicUsize::new(0),
        }
    }

    /// Store scoped to a fixed hostname, for domain-derivation paths.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::new()
        }
    }

    /// Number of `write` calls the store has seen.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of every record, expired ones included.
    pub fn entries(&self) -> Vec<Cookie> {
        self.entries.read().clone()
    }
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieStore for MemoryCookieStore {
    fn read_all(&self) -> String {
        let now = Utc::now();
        self.entries
            .read()
            .iter()
            .filter(|cookie| !cookie.is_expired(now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn write(&self, cookie: Cookie) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.write();
        if let Some(existing) = entries.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            entries.push(cookie);
        }
    }

    fn remove(&self, name: &str) {
        self.entries.write().retain(|c| c.name != name);
    }

    fn host(&self) -> Option<String> {
        self.host.clone()
    }
}
