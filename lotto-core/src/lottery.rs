use crate::config::{LotteryConfig, Odds};
use crate::cookie::{find_cookie, root_domain, Cookie, CookieStoreHandle};
use crate::error::{LottoError, Result};
use crate::handle::{canonicalize, cookie_name};
use crate::random::{RandomSource, ThreadRandom};
use chrono::{Duration, Utc};

/// Weighted coin flip with a cookie-persisted outcome.
///
/// The first [`choose`](Lottery::choose) for a handle rolls against the
/// configured odds and persists the result; every later call within the
/// expiry window replays the persisted decision instead of re-rolling, so a
/// user stays in the same bucket until the record expires. One decision
/// exists per `(handle, cookie scope)` pair at a time.
pub struct Lottery {
    config: LotteryConfig,
    canonical: String,
    store: CookieStoreHandle,
    random: Box<dyn RandomSource>,
    decision: Option<bool>,
}

impl Lottery {
    /// Builds an engine over `store` using the thread-local random source.
    ///
    /// Fails when the config has no handle, a zero expiry, or unusable odds.
    pub fn new(config: LotteryConfig, store: CookieStoreHandle) -> Result<Self> {
        Self::with_random(config, store, Box::new(ThreadRandom))
    }

    /// Builds an engine with an injected random source, for deterministic
    /// draws.
    pub fn with_random(
        config: LotteryConfig,
        store: CookieStoreHandle,
        random: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;
        let canonical = canonicalize(&config.handle);

        Ok(Self {
            config,
            canonical,
            store,
            random,
            decision: None,
        })
    }

    /// Canonical form of the configured handle.
    pub fn handle(&self) -> &str {
        &self.canonical
    }

    pub fn odds(&self) -> Odds {
        self.config.odds
    }

    /// Overrides the configured odds. Not validated here; a broken ratio
    /// surfaces from the next fresh draw.
    pub fn set_odds(&mut self, numerator: u32, denominator: u32) -> &mut Self {
        self.config.odds = Odds::new(numerator, denominator);
        self
    }

    /// Decides the lottery, replaying a persisted decision when one exists.
    ///
    /// Always performs one store read. A fresh draw additionally performs
    /// one store write; a replay writes nothing and never re-rolls. Exactly
    /// one of the configured callbacks runs per call (none when the slot for
    /// the outcome is unset). Callback panics propagate to the caller.
    pub fn choose(&mut self) -> Result<bool> {
        let name = cookie_name(&self.canonical);
        let raw = self.store.read_all();

        if let Some(value) = find_cookie(&raw, &name).filter(|v| !v.is_empty()) {
            let won = value == "true";
            if self.config.debug {
                tracing::debug!(
                    "Lottery '{}' forcing result from existing cookie: {}",
                    self.canonical,
                    won
                );
            }
            self.decision = Some(won);
            self.dispatch(won);
            return Ok(won);
        }

        self.config.odds.validate()?;
        let percent = self.config.odds.percent();
        if self.config.odds.is_clamped() {
            tracing::warn!(
                "Lottery '{}' odds {} exceed one, clamping win chance to 100%",
                self.canonical,
                self.config.odds
            );
        }

        let roll = self.random.next_below(100);
        let won = roll < percent;

        if self.config.debug {
            tracing::debug!(
                "Lottery '{}' choosing with odds {}: rolled {} against {}%, won: {}",
                self.canonical,
                self.config.odds,
                roll,
                percent,
                won
            );
        }

        self.store.write(Cookie {
            name,
            value: won.to_string(),
            domain: self.resolve_domain(),
            path: "/".to_string(),
            expires: Utc::now() + Duration::days(self.config.expires_in_days as i64),
        });

        self.decision = Some(won);
        self.dispatch(won);
        Ok(won)
    }

    /// The decision recorded by the most recent [`choose`](Lottery::choose)
    /// on this instance.
    ///
    /// A fresh instance never rehydrates from the cookie; before its first
    /// `choose` this is the undecided error even when a record exists.
    pub fn winner(&self) -> Result<bool> {
        self.decision.ok_or_else(|| LottoError::Undecided {
            handle: self.canonical.clone(),
        })
    }

    fn dispatch(&mut self, won: bool) {
        let handler = if won {
            self.config.on_win.as_mut()
        } else {
            self.config.on_loss.as_mut()
        };

        if let Some(handler) = handler {
            handler(&self.canonical);
        }
    }

    fn resolve_domain(&self) -> Option<String> {
        self.config
            .cookie_domain
            .clone()
            .or_else(|| self.store.host().map(|host| root_domain(&host)))
    }
}

impl std::fmt::Debug for Lottery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lottery")
            .field("handle", &self.canonical)
            .field("odds", &self.config.odds)
            .field("decision", &self.decision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::{CookieStore, MemoryCookieStore};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Arc;

    /// Scripted random source; repeats its roll list when exhausted.
    struct Rolls {
        rolls: Vec<u32>,
        at: usize,
    }

    impl Rolls {
        fn new(rolls: &[u32]) -> Box<Self> {
            Box::new(Self {
                rolls: rolls.to_vec(),
                at: 0,
            })
        }
    }

    impl RandomSource for Rolls {
        fn next_below(&mut self, max: u32) -> u32 {
            let roll = self.rolls[self.at % self.rolls.len()];
            self.at += 1;
            assert!(roll < max);
            roll
        }
    }

    fn seeded(store: &MemoryCookieStore, name: &str, value: &str) {
        store.write(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: None,
            path: "/".to_string(),
            expires: Utc::now() + Duration::days(7),
        });
    }

    #[test]
    fn test_choose_is_stable_within_expiry() {
        let store = Arc::new(MemoryCookieStore::new());
        let config = LotteryConfig::new("Beta");
        // second roll would lose; it must never be drawn
        let mut lottery =
            Lottery::with_random(config, store.clone(), Rolls::new(&[40, 99])).unwrap();

        assert!(lottery.choose().unwrap());
        assert_eq!(store.write_count(), 1);

        assert!(lottery.choose().unwrap());
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_zero_numerator_never_wins() {
        let store = Arc::new(MemoryCookieStore::new());
        let mut config = LotteryConfig::new("promo");
        config.odds = Odds::new(0, 100);
        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[0])).unwrap();

        assert!(!lottery.choose().unwrap());
        assert_eq!(store.entries()[0].value, "false");
    }

    #[test]
    fn test_full_odds_always_win() {
        let store = Arc::new(MemoryCookieStore::new());
        let mut config = LotteryConfig::new("promo");
        config.odds = Odds::new(100, 100);
        let mut lottery = Lottery::with_random(config, store, Rolls::new(&[99])).unwrap();

        assert!(lottery.choose().unwrap());
    }

    #[test]
    fn test_percent_is_truncated_at_the_boundary() {
        // 33/100 wins on rolls 0..=32 and nothing above
        for (roll, expected) in [(32, true), (33, false)] {
            let store = Arc::new(MemoryCookieStore::new());
            let mut config = LotteryConfig::new("promo");
            config.odds = Odds::new(33, 100);
            let mut lottery = Lottery::with_random(config, store, Rolls::new(&[roll])).unwrap();
            assert_eq!(lottery.choose().unwrap(), expected);
        }
    }

    #[test]
    fn test_cached_loss_skips_roll_write_and_on_win() {
        let store = Arc::new(MemoryCookieStore::new());
        seeded(&store, "lotto_promo", "false");

        let wins = Rc::new(Cell::new(0u32));
        let counter = wins.clone();
        let mut config = LotteryConfig::new("promo");
        config.on_win = Some(Box::new(move |_| counter.set(counter.get() + 1)));

        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[0])).unwrap();
        assert!(!lottery.choose().unwrap());
        assert_eq!(wins.get(), 0);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_cached_win_with_only_on_loss_is_a_noop() {
        let store = Arc::new(MemoryCookieStore::new());
        seeded(&store, "lotto_promo", "true");

        let losses = Rc::new(Cell::new(0u32));
        let counter = losses.clone();
        let mut config = LotteryConfig::new("promo");
        config.on_loss = Some(Box::new(move |_| counter.set(counter.get() + 1)));

        let mut lottery = Lottery::with_random(config, store, Rolls::new(&[0])).unwrap();
        assert!(lottery.choose().unwrap());
        assert_eq!(losses.get(), 0);
    }

    #[test]
    fn test_callbacks_receive_the_canonical_handle() {
        let store = Arc::new(MemoryCookieStore::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut config = LotteryConfig::new("BetaFeature");
        config.odds = Odds::new(100, 100);
        config.on_win = Some(Box::new(move |handle| sink.borrow_mut().push(handle.to_string())));

        let mut lottery = Lottery::with_random(config, store, Rolls::new(&[0])).unwrap();
        lottery.choose().unwrap();

        assert_eq!(*seen.borrow(), vec!["beta_feature".to_string()]);
    }

    #[test]
    fn test_winner_requires_a_draw_on_this_instance() {
        let store = Arc::new(MemoryCookieStore::new());
        seeded(&store, "lotto_promo", "true");

        let config = LotteryConfig::new("promo");
        let mut lottery = Lottery::with_random(config, store, Rolls::new(&[0])).unwrap();

        // a persisted record does not rehydrate the instance
        assert!(matches!(
            lottery.winner(),
            Err(LottoError::Undecided { .. })
        ));

        let won = lottery.choose().unwrap();
        assert_eq!(lottery.winner().unwrap(), won);
    }

    #[test]
    fn test_set_odds_overrides_and_chains() {
        let store = Arc::new(MemoryCookieStore::new());
        let config = LotteryConfig::new("promo");
        let mut lottery = Lottery::with_random(config, store, Rolls::new(&[0])).unwrap();

        lottery.set_odds(75, 100).set_odds(0, 100);
        assert_eq!(lottery.odds(), Odds::new(0, 100));
        assert!(!lottery.choose().unwrap());
    }

    #[test]
    fn test_zero_denominator_surfaces_at_decision_time() {
        let store = Arc::new(MemoryCookieStore::new());
        let config = LotteryConfig::new("promo");
        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[0])).unwrap();

        lottery.set_odds(1, 0);
        assert!(matches!(lottery.choose(), Err(LottoError::Odds(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_broken_odds_are_ignored_on_the_replay_path() {
        let store = Arc::new(MemoryCookieStore::new());
        seeded(&store, "lotto_promo", "true");

        let config = LotteryConfig::new("promo");
        let mut lottery = Lottery::with_random(config, store, Rolls::new(&[0])).unwrap();
        lottery.set_odds(1, 0);

        // replay never consults the odds
        assert!(lottery.choose().unwrap());
    }

    #[test]
    fn test_clamped_odds_always_win() {
        let store = Arc::new(MemoryCookieStore::new());
        let config = LotteryConfig::new("promo");
        let mut lottery = Lottery::with_random(config, store, Rolls::new(&[99])).unwrap();

        lottery.set_odds(150, 100);
        assert!(lottery.choose().unwrap());
    }

    #[test]
    fn test_empty_cookie_value_is_treated_as_absent() {
        let store = Arc::new(MemoryCookieStore::new());
        seeded(&store, "lotto_promo", "");

        let mut config = LotteryConfig::new("promo");
        config.odds = Odds::new(100, 100);
        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[0])).unwrap();

        assert!(lottery.choose().unwrap());
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_garbage_cookie_value_replays_as_loss() {
        let store = Arc::new(MemoryCookieStore::new());
        seeded(&store, "lotto_promo", "maybe");

        let config = LotteryConfig::new("promo");
        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[0])).unwrap();

        assert!(!lottery.choose().unwrap());
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_explicit_domain_overrides_the_host() {
        let store = Arc::new(MemoryCookieStore::with_host("shop.example.co.uk"));
        let mut config = LotteryConfig::new("promo");
        config.cookie_domain = Some("override.example".to_string());

        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[0])).unwrap();
        lottery.choose().unwrap();

        assert_eq!(
            store.entries()[0].domain.as_deref(),
            Some("override.example")
        );
    }

    #[test]
    fn test_domain_is_derived_from_the_store_host() {
        let store = Arc::new(MemoryCookieStore::with_host("shop.example.co.uk"));
        let config = LotteryConfig::new("promo");

        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[0])).unwrap();
        lottery.choose().unwrap();

        assert_eq!(store.entries()[0].domain.as_deref(), Some("example.co.uk"));
    }

    #[test]
    fn test_hostless_store_gets_a_host_only_record() {
        let store = Arc::new(MemoryCookieStore::new());
        let config = LotteryConfig::new("promo");

        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[0])).unwrap();
        lottery.choose().unwrap();

        assert!(store.entries()[0].domain.is_none());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let store = Arc::new(MemoryCookieStore::new());
        let mut config = LotteryConfig::new("Beta");
        config.odds = Odds::new(50, 100);
        config.expires_in_days = 1;

        let mut lottery = Lottery::with_random(config, store.clone(), Rolls::new(&[40])).unwrap();

        assert!(lottery.choose().unwrap());
        assert_eq!(store.write_count(), 1);

        let entries = store.entries();
        assert_eq!(entries[0].name, "lotto_beta");
        assert_eq!(entries[0].value, "true");
        assert_eq!(entries[0].path, "/");
        let lifetime = entries[0].expires - Utc::now();
        assert!(lifetime > Duration::hours(23) && lifetime <= Duration::hours(24));

        assert!(lottery.choose().unwrap());
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_construction_requires_a_handle() {
        let store = Arc::new(MemoryCookieStore::new());
        let result = Lottery::new(LotteryConfig::new(""), store);
        assert!(matches!(result, Err(LottoError::Config(_))));
    }

    #[test]
    fn test_construction_rejects_an_absurd_expiry() {
        // must come back as a config error, not overflow expiry arithmetic
        let store = Arc::new(MemoryCookieStore::new());
        let mut config = LotteryConfig::new("Beta");
        config.expires_in_days = u32::MAX;
        let result = Lottery::with_random(config, store, Rolls::new(&[0]));
        assert!(matches!(result, Err(LottoError::Config(_))));
    }
}
