//! Process-wide trace id configuration.
//!
//! # Environment Variables
//!
//! - `ZERROR_REDACT_IDS=1` - Write `redacted` instead of function/file/line
//!   into newly generated trace ids
//! - `ZERROR_RESOLVE_FUNCTIONS=0` - Skip stack symbolization; function names
//!   are recorded as `unknown`. With it on, the first error built at each
//!   call site symbolizes the stack under `backtrace`'s global lock; later
//!   ones hit a per-location cache.
//!
//! Environment variables are read once, on first use. [`IdConfig::install`]
//! overrides them programmatically.
//!
//! ```
//! use zerror::IdConfig;
//!
//! IdConfig::new().redact_call_site(false).install();
//! assert!(!zerror::config::current().redact_call_site);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

/// Redaction default: on for `production` builds.
const DEFAULT_REDACT: bool = cfg!(feature = "production");

static REDACT_CALL_SITE: AtomicBool = AtomicBool::new(DEFAULT_REDACT);
static RESOLVE_FUNCTIONS: AtomicBool = AtomicBool::new(true);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Configuration for trace id generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdConfig {
    /// Replace function, file and line with `redacted`/`0`.
    ///
    /// Ids stay decodable; they just stop exposing source layout to
    /// whoever holds them.
    pub redact_call_site: bool,

    /// Symbolize the stack to find the calling function's name.
    pub resolve_function_names: bool,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            redact_call_site: DEFAULT_REDACT,
            resolve_function_names: true,
        }
    }
}

impl IdConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from the `ZERROR_*` environment variables,
    /// starting from the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(flag) = env_flag("ZERROR_REDACT_IDS") {
            config.redact_call_site = flag;
        }
        if let Some(flag) = env_flag("ZERROR_RESOLVE_FUNCTIONS") {
            config.resolve_function_names = flag;
        }
        config
    }

    /// Enable or disable call-site redaction
    pub fn redact_call_site(mut self, enable: bool) -> Self {
        self.redact_call_site = enable;
        self
    }

    /// Enable or disable function name resolution
    pub fn resolve_function_names(mut self, enable: bool) -> Self {
        self.resolve_function_names = enable;
        self
    }

    /// Make this the process-wide configuration.
    pub fn install(self) {
        INITIALIZED.store(true, Ordering::SeqCst);
        REDACT_CALL_SITE.store(self.redact_call_site, Ordering::Relaxed);
        RESOLVE_FUNCTIONS.store(self.resolve_function_names, Ordering::Relaxed);
    }
}

/// Initialize from environment variables.
///
/// Called automatically on first read, but can be called explicitly for
/// deterministic initialization.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    let config = IdConfig::from_env();
    REDACT_CALL_SITE.store(config.redact_call_site, Ordering::Relaxed);
    RESOLVE_FUNCTIONS.store(config.resolve_function_names, Ordering::Relaxed);
}

/// The configuration currently in effect.
#[inline]
pub fn current() -> IdConfig {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    IdConfig {
        redact_call_site: REDACT_CALL_SITE.load(Ordering::Relaxed),
        resolve_function_names: RESOLVE_FUNCTIONS.load(Ordering::Relaxed),
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    match val.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
