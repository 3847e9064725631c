//! Cookie records and the ambient store abstraction.
//!
//! The engine never talks to a real cookie jar directly; it reads and writes
//! through the [`CookieStore`] trait so it can run against an in-memory jar
//! in tests, a JSON file on disk, or a host-environment adapter. Reads hand
//! back the raw `name=value; other=value` text of the whole jar (the shape a
//! browser's cookie string has) and the engine picks its record out of that.

mod domain;
mod file;
mod memory;

pub use domain::root_domain;
pub use file::FileCookieStore;
pub use memory::MemoryCookieStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A handle to a type-erased cookie store.
///
/// Store implementations must be `Send + Sync` and internally synchronized;
/// trait methods take `&self`.
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

/// A persisted lottery decision record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name, `lotto_<canonical-handle>`.
    pub name: String,

    /// Literal `"true"` or `"false"`.
    pub value: String,

    /// Domain scope. `None` means host-only.
    pub domain: Option<String>,

    /// Path scope; always `/` for lottery records.
    pub path: String,

    /// When the record stops being served.
    pub expires: DateTime<Utc>,
}

impl Cookie {
    /// True once `now` has reached the expiry timestamp.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    /// `Set-Cookie` style rendering of the record.
    ///
    /// The expiry uses the conventional RFC 1123 cookie timestamp, e.g.
    /// `lotto_beta=true; expires=Tue, 01 Jul 2025 10:00:00 GMT; domain=example.com; path=/`.
    /// The domain attribute is omitted for host-only records.
    pub fn header_string(&self) -> String {
        let mut out = format!(
            "{}={}; expires={}",
            self.name,
            self.value,
            format_expires(self.expires)
        );
        if let Some(domain) = &self.domain {
            out.push_str("; domain=");
            out.push_str(domain);
        }
        out.push_str("; path=");
        out.push_str(&self.path);
        out
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_string())
    }
}

/// RFC 1123 cookie timestamp, always in GMT.
fn format_expires(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// The ambient cookie store the engine persists decisions in.
///
/// The store is shared mutable state with no transactions: two racing
/// writers both land and the last write wins, exactly like a browser cookie
/// jar. Callers should avoid issuing concurrent draws for the same handle.
///
/// Mutating methods are best-effort and must not panic; implementations log
/// failures instead of surfacing them.
pub trait CookieStore {
    /// Raw `name=value; other=value` text of every live (unexpired) record,
    /// in no particular order.
    fn read_all(&self) -> String;

    /// Writes a record, replacing any existing record with the same name.
    fn write(&self, cookie: Cookie);

    /// Removes the record with `name`, if present.
    fn remove(&self, name: &str);

    /// Hostname the store is scoped to, when known. Used to derive the
    /// cookie domain for records without an explicit scope.
    fn host(&self) -> Option<String> {
        None
    }
}

/// Finds `name`'s value within raw cookie text.
///
/// Splits on `;`, trims leading whitespace, and matches the `name=` prefix,
/// so arbitrary ordering and spacing are tolerated. Returns the value as-is;
/// an empty string means the record exists but carries no value.
pub fn find_cookie(raw: &str, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    for part in raw.split(';') {
        let part = part.trim_start();
        if let Some(value) = part.strip_prefix(prefix.as_str()) {
            return Some(value.to_string());
        }
    }
    None
}
