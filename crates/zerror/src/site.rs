//! Call-site capture for trace ids.
//!
//! The location comes from `#[track_caller]`: every public constructor in
//! this crate is annotated, so `Location::caller()` inside the codec lands
//! on the user's code rather than on a frame inside `zerror`.
//!
//! The function name is not part of `Location`. It is recovered by
//! symbolizing the current stack and taking the first symbol whose
//! file and line match the location:
//!
//! ```text
//! Location { file: "src/handlers.rs", line: 42 }
//!       │
//!       ▼  backtrace::trace + resolve_frame
//! symbol "app::handlers::get_user" @ /abs/src/handlers.rs:42
//!       │
//!       ▼  last path segment
//! "get_user"
//! ```

use std::collections::HashMap;
use std::panic::Location;
use std::path::Path;
use std::sync::{OnceLock, RwLock};

use crate::config::{self, IdConfig};

/// Function name recorded when symbolization finds nothing.
pub const UNKNOWN: &str = "unknown";

/// Placeholder for function and file in redacted ids.
pub const REDACTED: &str = "redacted";

type LocationKey = (&'static str, u32, u32);

/// Resolved function names, one entry per call site. Symbolization holds
/// `backtrace`'s process-wide lock, so each location pays for it once.
static FUNCTION_NAMES: OnceLock<RwLock<HashMap<LocationKey, Option<String>>>> = OnceLock::new();

/// Where an error was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl CallSite {
    /// Capture the caller's site under the process-wide configuration.
    ///
    /// ```
    /// use zerror::CallSite;
    /// let site = CallSite::caller();
    /// assert!(site.line > 0 || site.file == "redacted");
    /// ```
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    /// Capture a known location under the process-wide configuration.
    pub fn from_location(loc: &'static Location<'static>) -> Self {
        Self::capture_with(loc, &config::current())
    }

    /// Capture a known location under an explicit configuration.
    pub fn capture_with(loc: &'static Location<'static>, config: &IdConfig) -> Self {
        if config.redact_call_site {
            return Self::redacted();
        }

        let function = if config.resolve_function_names {
            cached_function(loc)
        } else {
            None
        };

        Self {
            function: sanitize(function.as_deref().unwrap_or(UNKNOWN)),
            file: sanitize(base_name(loc.file())),
            line: loc.line(),
        }
    }

    /// The site written into ids when redaction is on.
    pub fn redacted() -> Self {
        Self {
            function: REDACTED.to_string(),
            file: REDACTED.to_string(),
            line: 0,
        }
    }
}

fn cached_function(loc: &'static Location<'static>) -> Option<String> {
    let cache = FUNCTION_NAMES.get_or_init(Default::default);
    let key = (loc.file(), loc.line(), loc.column());

    if let Some(name) = cache.read().ok().and_then(|names| names.get(&key).cloned()) {
        return name;
    }

    let name = resolve_function(loc);
    if let Ok(mut names) = cache.write() {
        names.insert(key, name.clone());
    }
    name
}

/// Find the name of the function containing `loc` on the current stack.
fn resolve_function(loc: &Location<'_>) -> Option<String> {
    let target = Path::new(loc.file());
    let mut found: Option<String> = None;

    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() {
                return;
            }
            let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) else {
                return;
            };
            if line == loc.line() && file.ends_with(target) {
                found = symbol.name().map(|name| format!("{name:#}"));
            }
        });
        found.is_none()
    });

    found.as_deref().and_then(short_name).map(str::to_string)
}

/// Last path segment that names a function, skipping closure markers
/// and generic argument lists.
fn short_name(full: &str) -> Option<&str> {
    full.rsplit("::")
        .find(|seg| !seg.is_empty() && !seg.starts_with("{{") && !seg.starts_with('<'))
}

fn base_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

/// `:` and `@` delimit record fields.
fn sanitize(field: &str) -> String {
    field.replace([':', '@'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_records_file_and_line() {
        let config = IdConfig::new().redact_call_site(false);
        let (site, line) = (CallSite::capture_with(Location::caller(), &config), line!());
        assert_eq!(site.file, "site.rs");
        assert_eq!(site.line, line);
        assert!(!site.function.is_empty());
    }

    #[test]
    fn resolves_enclosing_function_name() {
        let config = IdConfig::new().redact_call_site(false);
        let site = CallSite::capture_with(Location::caller(), &config);
        // Symbolization needs debuginfo; without it the name is "unknown".
        assert!(
            site.function == "resolves_enclosing_function_name" || site.function == UNKNOWN,
            "unexpected function: {}",
            site.function
        );
    }

    #[test]
    fn skipping_resolution_records_unknown() {
        let config = IdConfig::new()
            .redact_call_site(false)
            .resolve_function_names(false);
        let site = CallSite::capture_with(Location::caller(), &config);
        assert_eq!(site.function, UNKNOWN);
        assert!(site.line > 0);
    }

    #[test]
    fn function_name_is_resolved_once_per_location() {
        let config = IdConfig::new().redact_call_site(false);
        let loc = Location::caller();
        let first = CallSite::capture_with(loc, &config);
        let key = (loc.file(), loc.line(), loc.column());
        let cached = FUNCTION_NAMES
            .get()
            .and_then(|cache| cache.read().ok().map(|names| names.contains_key(&key)));
        assert_eq!(cached, Some(true));

        let second = CallSite::capture_with(loc, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_captures_agree() {
        let config = IdConfig::new().redact_call_site(false);
        let loc = Location::caller();
        let names: Vec<String> = (0..8)
            .map(|_| std::thread::spawn(move || CallSite::capture_with(loc, &config).function))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();
        assert!(names.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn redaction_hides_location() {
        let config = IdConfig::new().redact_call_site(true);
        let site = CallSite::capture_with(Location::caller(), &config);
        assert_eq!(site, CallSite::redacted());
        assert_eq!(site.line, 0);
    }

    #[test]
    fn short_name_skips_closures_and_generics() {
        assert_eq!(short_name("app::handlers::get_user"), Some("get_user"));
        assert_eq!(short_name("app::run::{{closure}}"), Some("run"));
        assert_eq!(short_name("<app::Svc as app::Api>::call"), Some("call"));
        assert_eq!(short_name("main"), Some("main"));
        assert_eq!(short_name(""), None);
    }

    #[test]
    fn sanitize_strips_delimiters() {
        assert_eq!(sanitize("a:b@c"), "a_b_c");
        assert_eq!(base_name("crates/zerror/src/site.rs"), "site.rs");
    }
}
