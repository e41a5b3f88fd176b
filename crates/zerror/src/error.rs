use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::codes;
use crate::id::{IdSlot, TraceId};
use crate::status::{Metadata, Status};

/// A structured, traceable error.
///
/// Wraps a [`Status`] plus an optional cause. Every constructor mints a
/// trace id at the caller's location; derivations (`with_*`) return a new
/// value and keep that id.
///
/// ```
/// use zerror::Error;
///
/// let err = Error::new(404, "USER_NOT_FOUND", "missing");
/// assert!(err.is_client_error());
///
/// let tagged = err.with_meta("user_id", "42");
/// assert_eq!(tagged.id(), err.id());
/// ```
#[derive(Clone)]
pub struct Error {
    status: Status,
    cause: Option<Cause>,
}

/// The next link in an error chain.
///
/// Native causes keep their structure (and id) so chain walks can find
/// them without downcasting through a trait object.
#[derive(Clone)]
pub enum Cause {
    Native(Arc<Error>),
    Foreign(Arc<dyn StdError + Send + Sync>),
}

impl Cause {
    /// Classify an arbitrary error.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(err);
        match boxed.downcast::<Error>() {
            Ok(native) => Cause::Native(Arc::new(*native)),
            Err(foreign) => Cause::Foreign(Arc::from(foreign)),
        }
    }

    pub fn as_native(&self) -> Option<&Error> {
        match self {
            Cause::Native(err) => Some(err),
            Cause::Foreign(_) => None,
        }
    }

    pub fn as_std(&self) -> &(dyn StdError + 'static) {
        match self {
            Cause::Native(err) => err.as_ref(),
            Cause::Foreign(err) => err.as_ref(),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_std(), f)
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Native(err) => fmt::Debug::fmt(err, f),
            Cause::Foreign(err) => fmt::Debug::fmt(err, f),
        }
    }
}

impl From<Error> for Cause {
    fn from(err: Error) -> Self {
        Cause::Native(Arc::new(err))
    }
}

// ── Constructors ──────────────────────────────────────────────────

impl Error {
    /// Create an error with a fresh trace id located at the caller.
    #[track_caller]
    pub fn new(code: i32, reason: impl Into<String>, message: impl Into<String>) -> Self {
        let loc = Location::caller();
        Self::from_status(Status::new(code, reason, message), loc)
    }

    /// Create an error whose message is built from format arguments.
    ///
    /// Prefer the [`errorf!`](crate::errorf) macro over calling this directly.
    #[track_caller]
    pub fn newf(code: i32, reason: impl Into<String>, args: fmt::Arguments<'_>) -> Self {
        let loc = Location::caller();
        Self::from_status(Status::new(code, reason, fmt::format(args)), loc)
    }

    /// Wrap an existing status, minting an id at `loc` if it has none.
    pub fn from_status(status: Status, loc: &'static Location<'static>) -> Self {
        status.id.get_or_generate(loc);
        Self {
            status,
            cause: None,
        }
    }

    /// Wrap a status without touching its id. The id is minted on first
    /// read of [`Error::id`] instead.
    pub fn from_status_lazy(status: Status) -> Self {
        Self {
            status,
            cause: None,
        }
    }

    /// 400
    #[track_caller]
    pub fn bad_request(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::BAD_REQUEST, reason, message)
    }

    /// 401
    #[track_caller]
    pub fn unauthorized(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::UNAUTHORIZED, reason, message)
    }

    /// 403
    #[track_caller]
    pub fn forbidden(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::FORBIDDEN, reason, message)
    }

    /// 404
    #[track_caller]
    pub fn not_found(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::NOT_FOUND, reason, message)
    }

    /// 409
    #[track_caller]
    pub fn conflict(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::CONFLICT, reason, message)
    }

    /// 500
    #[track_caller]
    pub fn internal_server(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_SERVER_ERROR, reason, message)
    }

    /// 503
    #[track_caller]
    pub fn service_unavailable(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::SERVICE_UNAVAILABLE, reason, message)
    }

    /// 504
    #[track_caller]
    pub fn gateway_timeout(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::GATEWAY_TIMEOUT, reason, message)
    }

    /// 499
    #[track_caller]
    pub fn client_closed(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(codes::CLIENT_CLOSED, reason, message)
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl Error {
    #[inline]
    pub fn code(&self) -> i32 {
        self.status.code
    }

    #[inline]
    pub fn reason(&self) -> &str {
        &self.status.reason
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.status.message
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.status.metadata
    }

    #[inline]
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn into_status(self) -> Status {
        self.status
    }

    #[inline]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// The trace id, minted at the caller on first read if missing.
    ///
    /// Repeated and concurrent calls return the same id.
    #[track_caller]
    pub fn id(&self) -> &TraceId {
        let loc = Location::caller();
        self.status.id.get_or_generate(loc)
    }

    /// The trace id if it has been materialized, without minting one.
    #[inline]
    pub fn peek_id(&self) -> Option<&TraceId> {
        self.status.id.get()
    }

    /// Code in `[400, 500)`.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code())
    }

    /// Code `>= 500`.
    pub fn is_server_error(&self) -> bool {
        self.code() >= 500
    }

    /// Code 401 or 403.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.code(), codes::UNAUTHORIZED | codes::FORBIDDEN)
    }

    /// Same kind of error: equal `code` and `reason`. Message, metadata,
    /// cause and id are ignored.
    pub fn is(&self, target: &Error) -> bool {
        self.code() == target.code() && self.reason() == target.reason()
    }
}

// ── Derivations ───────────────────────────────────────────────────

impl Error {
    /// Copy with `cause` as the next link of the chain.
    #[track_caller]
    pub fn with_cause<E>(&self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let mut err = self.derive();
        err.cause = Some(Cause::new(cause));
        err
    }

    /// Copy with the metadata replaced wholesale.
    #[track_caller]
    pub fn with_metadata(&self, metadata: Metadata) -> Self {
        let mut err = self.derive();
        err.status.metadata = metadata;
        err
    }

    /// Copy with one metadata entry added or replaced.
    #[track_caller]
    pub fn with_meta(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut err = self.derive();
        err.status.metadata.insert(key.into(), value.into());
        err
    }

    /// Clone with the id materialized first, so the copy and `self`
    /// share one id.
    #[track_caller]
    fn derive(&self) -> Self {
        self.id();
        self.clone()
    }

    /// Copy carrying an id received from elsewhere.
    ///
    /// An empty id leaves the copy without one; it is minted on first read.
    pub fn with_id(&self, id: impl Into<TraceId>) -> Self {
        let mut err = self.clone();
        err.status.id = IdSlot::with(id.into());
        err
    }
}

// ── Chain helpers ─────────────────────────────────────────────────

/// The first `Error` in `err`'s source chain, `err` itself included.
pub fn find_native<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(native) = e.downcast_ref::<Error>() {
            return Some(native);
        }
        current = e.source();
    }
    None
}

/// Whether the first `Error` in `err`'s chain has `target`'s code and reason.
pub fn is(err: &(dyn StdError + 'static), target: &Error) -> bool {
    find_native(err).is_some_and(|native| native.is(target))
}

/// The next link of `err`'s chain.
pub fn unwrap<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a (dyn StdError + 'static)> {
    err.source()
}

// ── std::error::Error ─────────────────────────────────────────────

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(Cause::as_std)
    }
}

// ── Display ───────────────────────────────────────────────────────

struct MetadataDisplay<'a>(&'a Status);

impl fmt::Display for MetadataDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.0.sorted_metadata().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error:")?;
        if let Some(id) = self.peek_id() {
            write!(f, " id = {}", id)?;
        }
        write!(
            f,
            " code = {} reason = {} message = {} metadata = {} cause = ",
            self.code(),
            self.reason(),
            self.message(),
            MetadataDisplay(&self.status),
        )?;
        match &self.cause {
            Some(cause) => write!(f, "{}", cause),
            None => f.write_str("<nil>"),
        }
    }
}

// ── Debug ─────────────────────────────────────────────────────────

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Error");
        d.field("status", &self.status);
        if let Some(cause) = &self.cause {
            d.field("cause", cause);
        }
        d.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use std::collections::HashSet;
    use std::io;

    #[test]
    fn new_materializes_id() {
        let err = Error::new(400, "TEST_ERROR", "a test error");
        assert!(err.peek_id().is_some());
        assert!(!err.id().is_empty());
    }

    #[test]
    fn id_points_at_caller() {
        let (err, line) = (Error::new(404, "NOT_FOUND", "gone"), line!());
        let record = codec::decode(err.id().as_str()).unwrap();
        if record.file != crate::site::REDACTED {
            assert_eq!(record.file, "error.rs");
            assert_eq!(record.line, line);
            assert!(!record.function.is_empty());
        }
    }

    #[test]
    fn newf_formats_message() {
        let err = Error::newf(500, "DB", format_args!("table {} is {}", "users", "locked"));
        assert_eq!(err.message(), "table users is locked");
        assert!(err.peek_id().is_some());
    }

    #[test]
    fn convenience_constructors() {
        let cases: Vec<(Error, i32)> = vec![
            (Error::bad_request("R", "m"), 400),
            (Error::unauthorized("R", "m"), 401),
            (Error::forbidden("R", "m"), 403),
            (Error::not_found("R", "m"), 404),
            (Error::conflict("R", "m"), 409),
            (Error::client_closed("R", "m"), 499),
            (Error::internal_server("R", "m"), 500),
            (Error::service_unavailable("R", "m"), 503),
            (Error::gateway_timeout("R", "m"), 504),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
            assert!(codec::decode(err.id().as_str()).is_ok());
        }
    }

    #[test]
    fn predicates_follow_code_ranges() {
        let err = Error::new(404, "USER_NOT_FOUND", "missing");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert!(!err.is_auth_error());

        assert!(Error::new(401, "A", "").is_auth_error());
        assert!(Error::new(403, "A", "").is_auth_error());
        assert!(Error::new(599, "A", "").is_server_error());
        assert!(!Error::new(399, "A", "").is_client_error());
        assert!(!Error::new(500, "A", "").is_client_error());
    }

    #[test]
    fn derivations_keep_id() {
        let err = Error::new(500, "DB_ERROR", "database error");
        let id = err.id().clone();

        let mut md = Metadata::new();
        md.insert("table".into(), "users".into());
        assert_eq!(err.with_metadata(md).id(), &id);
        assert_eq!(err.with_meta("op", "select").id(), &id);
        assert_eq!(err.with_cause(io::Error::other("boom")).id(), &id);
    }

    #[test]
    fn with_metadata_replaces_not_merges() {
        let err = Error::new(500, "X", "y").with_meta("a", "1");
        let mut md = Metadata::new();
        md.insert("b".into(), "2".into());
        let replaced = err.with_metadata(md);
        assert_eq!(replaced.metadata().len(), 1);
        assert_eq!(replaced.metadata().get("b").map(String::as_str), Some("2"));
        // original untouched
        assert_eq!(err.metadata().get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn with_id_overrides() {
        let err = Error::new(500, "X", "y");
        let moved = err.with_id("remote-id");
        assert_eq!(moved.id().as_str(), "remote-id");
        assert_ne!(err.id().as_str(), "remote-id");
    }

    #[test]
    fn lazy_id_is_idempotent() {
        let err = Error::from_status_lazy(Status::new(400, "LAZY", "x"));
        assert!(err.peek_id().is_none());
        let first = err.id().clone();
        let second = err.id().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn derivations_of_lazy_error_share_id() {
        let lazy = || Error::from_status_lazy(Status::new(404, "LAZY", "x"));

        let err = lazy();
        let derived = err.with_metadata(Metadata::new());
        assert_eq!(derived.id(), err.id());

        let err = lazy();
        let derived = err.with_meta("k", "v");
        assert_eq!(err.id(), derived.id());

        let err = lazy();
        let derived = err.with_cause(io::Error::other("x"));
        assert_eq!(derived.id(), err.id());

        let err = Error::new(400, "X", "y").with_id("");
        let derived = err.with_meta("k", "v");
        assert_eq!(derived.id(), err.id());
    }

    #[test]
    fn unwrap_returns_next_link() {
        let err = Error::new(500, "X", "y").with_cause(io::Error::other("disk"));
        assert_eq!(unwrap(&err).map(|e| e.to_string()), Some("disk".to_string()));
        assert!(unwrap(&io::Error::other("leaf")).is_none());
    }

    #[test]
    fn empty_with_id_is_minted_on_read() {
        let err = Error::new(400, "X", "y").with_id("");
        assert!(err.peek_id().is_none());
        assert!(!err.id().is_empty());
    }

    #[test]
    fn native_cause_is_recognised() {
        let inner = Error::new(404, "INNER", "inner");
        let outer = Error::new(500, "OUTER", "outer").with_cause(inner.clone());
        let cause = outer.cause().unwrap();
        let native = cause.as_native().unwrap();
        assert_eq!(native.reason(), "INNER");
        assert_eq!(native.id(), inner.id());
        assert!(outer.source().is_some());
    }

    #[test]
    fn foreign_cause_is_kept() {
        let outer = Error::new(500, "OUTER", "outer").with_cause(io::Error::other("disk"));
        assert!(outer.cause().unwrap().as_native().is_none());
        assert_eq!(outer.source().unwrap().to_string(), "disk");
    }

    #[test]
    fn is_compares_code_and_reason() {
        let a = Error::new(404, "USER_NOT_FOUND", "one message");
        let b = Error::new(404, "USER_NOT_FOUND", "another").with_meta("k", "v");
        let c = Error::new(404, "ORDER_NOT_FOUND", "one message");
        assert!(a.is(&b));
        assert!(!a.is(&c));
        assert!(is(&b, &a));
    }

    #[test]
    fn is_walks_foreign_wrappers() {
        #[derive(Debug)]
        struct Wrapper(Error);
        impl fmt::Display for Wrapper {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "wrapped")
            }
        }
        impl StdError for Wrapper {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }

        let target = Error::new(409, "CONFLICT", "x");
        let wrapped = Wrapper(Error::new(409, "CONFLICT", "y"));
        assert!(is(&wrapped, &target));
        assert!(unwrap(&wrapped).is_some());
        assert!(!is(&io::Error::other("plain"), &target));
    }

    #[test]
    fn display_includes_id_when_present() {
        let err = Error::new(404, "NOT_FOUND", "gone").with_meta("k", "v");
        let s = err.to_string();
        assert!(s.starts_with("error: id = "), "{}", s);
        assert!(s.contains("code = 404"));
        assert!(s.contains("reason = NOT_FOUND"));
        assert!(s.contains("message = gone"));
        assert!(s.contains("metadata = {k: v}"));
        assert!(s.ends_with("cause = <nil>"));
    }

    #[test]
    fn display_omits_missing_id() {
        let err = Error::from_status_lazy(Status::new(400, "R", "m"));
        let s = err.to_string();
        assert!(s.starts_with("error: code = 400"), "{}", s);
    }

    #[test]
    fn display_shows_cause() {
        let err = Error::new(500, "X", "y").with_cause(io::Error::other("disk full"));
        assert!(err.to_string().ends_with("cause = disk full"));
    }

    #[test]
    fn ids_unique_across_constructions() {
        let ids: HashSet<String> = (0..100)
            .map(|_| Error::new(400, "TEST", "uniqueness").id().to_string())
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
