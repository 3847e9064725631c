//! Cookie-persisted weighted coin flips for gating client-side experiments.
//!
//! Each handle gets one decision per cookie scope: the first draw rolls
//! against the configured odds and persists the outcome, and later draws
//! replay it until the record expires. Stores are pluggable through
//! [`CookieStore`].

pub mod config;
pub mod cookie;
pub mod error;
pub mod handle;
pub mod lottery;
pub mod random;

pub use config::{DecisionHandler, LotteryConfig, Odds, MAX_EXPIRES_DAYS};
pub use cookie::{Cookie, CookieStore, CookieStoreHandle, FileCookieStore, MemoryCookieStore};
pub use error::{LottoError, Result};
pub use handle::{canonicalize, cookie_name, COOKIE_PREFIX};
pub use lottery::Lottery;
pub use random::{RandomSource, SeededRandom, ThreadRandom};

use cookie::find_cookie;

/// Run a one-shot draw: build an engine from `config` and decide immediately.
pub fn choose(config: LotteryConfig, store: CookieStoreHandle) -> Result<bool> {
    let mut lottery = Lottery::new(config, store)?;
    lottery.choose()
}

/// Check a persisted decision without drawing.
///
/// Reads the store fresh on every call and returns `true` only when the
/// record for `handle` holds the winning marker. A missing, expired, or
/// losing record reads as `false`.
pub fn is_winner(store: &dyn CookieStore, handle: &str) -> bool {
    find_cookie(&store.read_all(), &cookie_name(handle))
        .map(|value| value == "true")
        .unwrap_or(false)
}
