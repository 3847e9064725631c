use crate::error::{LottoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Callback invoked with the canonical handle after a decision lands.
pub type DecisionHandler = Box<dyn FnMut(&str)>;

/// Win probability expressed as a `numerator/denominator` pair.
///
/// The win chance used for a draw is the *integer* percentage
/// `floor(numerator * 100 / denominator)`, capped at 100. The truncation is
/// deliberate: `33/100` wins on rolls `0..=32`, and `1/3` behaves as 33%,
/// not 33.33%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Odds {
    pub numerator: u32,
    pub denominator: u32,
}

impl Odds {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Truncated integer win percentage, capped at 100.
    ///
    /// Callers validate the denominator first; see [`Odds::validate`].
    pub fn percent(&self) -> u32 {
        ((self.numerator as u64 * 100) / self.denominator as u64).min(100) as u32
    }

    /// True when the ratio exceeds one and `percent` caps it.
    pub fn is_clamped(&self) -> bool {
        self.numerator > self.denominator
    }

    pub fn validate(&self) -> Result<()> {
        if self.denominator == 0 {
            return Err(LottoError::odds("denominator must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for Odds {
    fn default() -> Self {
        Self::new(50, 100)
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Upper bound on [`LotteryConfig::expires_in_days`]: a century. Keeps
/// `now + expiry` inside the range `chrono` timestamps can represent.
pub const MAX_EXPIRES_DAYS: u32 = 36_500;

/// Configuration for one lottery.
///
/// `new` fills the documented defaults (even odds, one-week expiry, no
/// callbacks, no domain override, quiet); callers override the public fields
/// they care about before handing the config to the engine.
pub struct LotteryConfig {
    /// Name of the lottery. Required; canonicalized before storage use.
    pub handle: String,
    /// Win probability. Overridable later via the engine's `set_odds`.
    pub odds: Odds,
    /// How many days the persisted decision stays valid. Positive, at most
    /// [`MAX_EXPIRES_DAYS`].
    pub expires_in_days: u32,
    /// Explicit cookie domain scope. When absent, the scope is derived from
    /// the store's host.
    pub cookie_domain: Option<String>,
    /// Emit decision diagnostics through `tracing` at debug level.
    pub debug: bool,
    /// Invoked with the canonical handle when the decision is a win.
    pub on_win: Option<DecisionHandler>,
    /// Invoked with the canonical handle when the decision is a loss.
    pub on_loss: Option<DecisionHandler>,
}

impl LotteryConfig {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            odds: Odds::default(),
            expires_in_days: 7,
            cookie_domain: None,
            debug: false,
            on_win: None,
            on_loss: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.handle.trim().is_empty() {
            return Err(LottoError::config("lottery handle cannot be empty"));
        }

        if self.expires_in_days == 0 {
            return Err(LottoError::config("expiry must be at least one day"));
        }

        if self.expires_in_days > MAX_EXPIRES_DAYS {
            return Err(LottoError::config(format!(
                "expiry must be at most {} days",
                MAX_EXPIRES_DAYS
            )));
        }

        self.odds.validate()
    }
}

impl fmt::Debug for LotteryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LotteryConfig")
            .field("handle", &self.handle)
            .field("odds", &self.odds)
            .field("expires_in_days", &self.expires_in_days)
            .field("cookie_domain", &self.cookie_domain)
            .field("debug", &self.debug)
            .field("has_on_win", &self.on_win.is_some())
            .field("has_on_loss", &self.on_loss.is_some())
            .finish()
    }
}
