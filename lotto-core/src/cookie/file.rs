use super::{Cookie, CookieStore};
use crate::error::Result;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk payload of a [`FileCookieStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieFile {
    cookies: Vec<Cookie>,
}

/// JSON-file-backed cookie store, one file per jar.
///
/// The whole jar is rewritten on every mutation; fine for the handful of
/// records a lottery jar holds. Opening a corrupt or unreadable file is an
/// error so stale decisions are never silently dropped, but once open,
/// writes are best-effort: persistence failures are logged and the
/// in-memory jar stays authoritative for the rest of the process.
pub struct FileCookieStore {
    path: PathBuf,
    entries: RwLock<Vec<Cookie>>,
    host: Option<String>,
}

impl FileCookieStore {
    /// Opens the jar at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cookies = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let file: CookieFile = serde_json::from_str(&contents)?;
            file.cookies
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(cookies),
            host: None,
        })
    }

    /// Opens the jar at `path` scoped to a fixed hostname.
    pub fn with_host(path: impl Into<PathBuf>, host: impl Into<String>) -> Result<Self> {
        let mut store = Self::open(path)?;
        store.host = Some(host.into());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of every record, expired ones included.
    pub fn entries(&self) -> Vec<Cookie> {
        self.entries.read().clone()
    }

    fn save(&self, cookies: &[Cookie]) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!("failed to create cookie jar directory: {}", e);
                    return;
                }
            }
        }

        let file = CookieFile {
            cookies: cookies.to_vec(),
        };
        match serde_json::to_string_pretty(&file) {
            Ok(contents) => {
                if let Err(e) = fs::write(&self.path, contents) {
                    tracing::warn!(
                        "failed to persist cookie jar {}: {}",
                        self.path.display(),
                        e
                    );
                }
            }
            Err(e) => {
                tracing::warn!("failed to serialize cookie jar: {}", e);
            }
        }
    }
}

impl CookieStore for FileCookieStore {
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
        let mut entries = self.entries.write();
        let now = Utc::now();
        entries.retain(|c| !c.is_expired(now));
        if let Some(existing) = entries.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            entries.push(cookie);
        }
        self.save(&entries);
    }

    fn remove(&self, name: &str) {
        let mut entries = self.entries.write();
        entries.retain(|c| c.name != name);
        self.save(&entries);
    }

    fn host(&self) -> Option<String> {
        self.host.clone()
    }
}
