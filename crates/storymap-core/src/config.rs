//! Engine configuration: INVEST thresholds and lexicon data
//!
//! ```toml
//! [invest]
//! small_children_threshold = 5
//! small_estimate_days = 2.0
//! policy = "block"
//!
//! [lexicon]
//! dependency_phrases = ["depends on", "blocked by"]
//!
//! [lexicon.ambiguity]
//! en = ["should", "fast"]
//! ```
//!
//! Missing tables and keys fall back to the built-in defaults.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StoryMapError};
use crate::invest::{InvestOptions, Lexicon, LexiconConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryMapConfig {
    pub invest: InvestOptions,
    pub lexicon: LexiconConfig,
}

impl StoryMapConfig {
    /// Compile the lexicon section
    ///
    /// # Errors
    /// * `Validation` - a lexicon pattern does not compile
    pub fn lexicon(&self) -> Result<Lexicon> {
        Lexicon::from_config(&self.lexicon)
    }

    fn validate(&self) -> Result<()> {
        let days = self.invest.small_estimate_days;
        if !days.is_finite() || days <= 0.0 {
            return Err(StoryMapError::validation(
                "invest.small_estimate_days",
                "must be a positive number",
            ));
        }
        self.lexicon().map(|_| ())
    }
}

/// Parse and validate a TOML configuration document
///
/// # Errors
/// * `Serialization` - malformed TOML or wrong value types
/// * `Validation` - out-of-range thresholds or invalid lexicon patterns
pub fn parse_config(source: &str) -> Result<StoryMapConfig> {
    let config: StoryMapConfig = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
}

/// # Errors
/// * `Io` - the file cannot be read
/// * `Serialization` / `Validation` - see [`parse_config`]
pub fn load_config(path: &Path) -> Result<StoryMapConfig> {
    let source = std::fs::read_to_string(path).map_err(|e| StoryMapError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let config = parse_config(&source)?;
    tracing::debug!(path = %path.display(), policy = ?config.invest.policy, "config loaded");
    Ok(config)
}

/// Source of "now" for anything time-based
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Config file reader that re-reads the file once the TTL has elapsed
///
/// A failed reload keeps returning the error; the previously cached value is
/// dropped so a broken file is never silently masked.
#[derive(Debug)]
pub struct ConfigCache<C: Clock> {
    path: PathBuf,
    ttl: Duration,
    clock: C,
    cached: Option<(DateTime<Utc>, StoryMapConfig)>,
}

impl<C: Clock> ConfigCache<C> {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration, clock: C) -> Self {
        Self {
            path: path.into(),
            ttl,
            clock,
            cached: None,
        }
    }

    /// Current configuration, reloading from disk if stale
    ///
    /// # Errors
    /// Same as [`load_config`].
    pub fn get(&mut self) -> Result<&StoryMapConfig> {
        let now = self.clock.now();
        let fresh = matches!(&self.cached, Some((loaded_at, _)) if now - *loaded_at < self.ttl);
        if !fresh {
            self.cached = None;
            let config = load_config(&self.path)?;
            self.cached = Some((now, config));
        }
        match &self.cached {
            Some((_, config)) => Ok(config),
            None => Err(StoryMapError::Internal {
                message: "config cache empty after reload".to_string(),
            }),
        }
    }

    /// Force the next `get` to hit the file
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
