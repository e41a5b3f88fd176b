use std::error::Error as StdError;
use std::io;
use std::panic::Location;

use crate::codes;
use crate::error::{self, Error};
use crate::id::TraceId;
use crate::remote::{RemoteStatus, ERROR_ID_KEY};
use crate::status::Status;

// ── Total conversion ────────────────────────────────────────────

impl Error {
    /// Convert any error into an `Error`. Never fails.
    ///
    /// 1. An `Error` anywhere in the source chain is returned as is (its id
    ///    is materialized first, on the original).
    /// 2. A [`RemoteStatus`] in the chain with a status detail is rebuilt
    ///    from the detail; `metadata["error_id"]` becomes the id.
    /// 3. A bare `RemoteStatus` keeps its message, with the RPC code
    ///    translated to HTTP.
    /// 4. Anything else becomes a 500 with the error's text as message.
    #[track_caller]
    pub fn from_std(err: &(dyn StdError + 'static)) -> Self {
        from_std_at(err, Location::caller())
    }

    /// Rebuild an `Error` from a remote status.
    #[track_caller]
    pub fn from_remote(remote: &RemoteStatus) -> Self {
        from_remote_at(remote, Location::caller())
    }
}

fn find_remote<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a RemoteStatus> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(remote) = e.downcast_ref::<RemoteStatus>() {
            return Some(remote);
        }
        current = e.source();
    }
    None
}

fn from_remote_at(remote: &RemoteStatus, loc: &'static Location<'static>) -> Error {
    match remote.status_detail() {
        Some(detail) => {
            // An empty error_id is dropped along with the key.
            let mut metadata = detail.metadata;
            let id = metadata
                .remove(ERROR_ID_KEY)
                .filter(|id| !id.is_empty())
                .map(TraceId::from);

            let mut status = Status::new(detail.code, detail.reason, detail.message);
            status.metadata = metadata;
            if let Some(id) = id {
                status = status.with_id(id);
            }
            Error::from_status(status, loc)
        }
        None => Error::from_status(
            Status::new(
                codes::to_http_code(remote.code()),
                codes::UNKNOWN_REASON,
                remote.message(),
            ),
            loc,
        ),
    }
}

impl From<RemoteStatus> for Error {
    #[track_caller]
    fn from(remote: RemoteStatus) -> Self {
        Error::from_remote(&remote)
    }
}

impl From<io::Error> for Error {
    /// An `io::Error` becomes a 500 with the io error as its cause.
    #[track_caller]
    fn from(err: io::Error) -> Self {
        let loc = Location::caller();
        let status = Status::new(codes::UNKNOWN_CODE, codes::UNKNOWN_REASON, err.to_string());
        Error::from_status(status, loc).with_cause(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::other(err)
    }
}

// ── Option-taking helpers ───────────────────────────────────────

/// Convert any error into an `Error`; see [`Error::from_std`].
#[track_caller]
pub fn from_error(err: &(dyn StdError + 'static)) -> Error {
    from_std_at(err, Location::caller())
}

/// [`from_error`] with `None` passed through.
#[track_caller]
pub fn from_error_opt(err: Option<&(dyn StdError + 'static)>) -> Option<Error> {
    let loc = Location::caller();
    err.map(|e| from_std_at(e, loc))
}

fn from_std_at(err: &(dyn StdError + 'static), loc: &'static Location<'static>) -> Error {
    if let Some(native) = error::find_native(err) {
        native.status().id.get_or_generate(loc);
        return native.clone();
    }

    if let Some(remote) = find_remote(err) {
        return from_remote_at(remote, loc);
    }

    tracing::trace!(error = %err, "converting error of unknown origin");
    Error::from_status(
        Status::new(codes::UNKNOWN_CODE, codes::UNKNOWN_REASON, err.to_string()),
        loc,
    )
}

/// HTTP code of an error; 200 for `None`.
#[track_caller]
pub fn code(err: Option<&(dyn StdError + 'static)>) -> i32 {
    from_error_opt(err).map_or(codes::OK, |e| e.code())
}

/// Reason of an error; empty for `None`.
#[track_caller]
pub fn reason(err: Option<&(dyn StdError + 'static)>) -> String {
    from_error_opt(err).map_or_else(String::new, |e| e.reason().to_string())
}

/// Trace id of an error; empty for `None`.
#[track_caller]
pub fn id(err: Option<&(dyn StdError + 'static)>) -> String {
    let loc = Location::caller();
    match err {
        Some(e) => from_std_at(e, loc).status().id.get_or_generate(loc).to_string(),
        None => String::new(),
    }
}

macro_rules! code_predicates {
    ($( $(#[$doc:meta])* $name:ident => $code:expr ),* $(,)?) => {
        $(
            $(#[$doc])*
            #[track_caller]
            pub fn $name(err: Option<&(dyn StdError + 'static)>) -> bool {
                code(err) == $code
            }
        )*
    };
}

code_predicates! {
    /// 400
    is_bad_request => codes::BAD_REQUEST,
    /// 401
    is_unauthorized => codes::UNAUTHORIZED,
    /// 403
    is_forbidden => codes::FORBIDDEN,
    /// 404
    is_not_found => codes::NOT_FOUND,
    /// 409
    is_conflict => codes::CONFLICT,
    /// 500
    is_internal_server => codes::INTERNAL_SERVER_ERROR,
    /// 503
    is_service_unavailable => codes::SERVICE_UNAVAILABLE,
    /// 504
    is_gateway_timeout => codes::GATEWAY_TIMEOUT,
    /// 499
    is_client_closed => codes::CLIENT_CLOSED,
}

// ── ResultExt ───────────────────────────────────────────────────

/// Extension trait for turning any `Result` error into an [`Error`].
///
/// ```
/// use zerror::ResultExt;
///
/// fn load() -> Result<String, zerror::Error> {
///     std::fs::read_to_string("/nonexistent/config.toml")
///         .err_ctx(503, "CONFIG_UNAVAILABLE", "reading config")
/// }
///
/// let err = load().unwrap_err();
/// assert_eq!(err.code(), 503);
/// assert!(std::error::Error::source(&err).is_some());
/// ```
pub trait ResultExt<T> {
    /// Replace the error with `Error::new(code, reason, message)` caused by it.
    fn err_ctx(self, code: i32, reason: &str, message: &str) -> Result<T, Error>;

    /// Replace the error with a 500 caused by it.
    fn err_context(self, message: &str) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    #[track_caller]
    fn err_ctx(self, code: i32, reason: &str, message: &str) -> Result<T, Error> {
        let loc = Location::caller();
        self.map_err(|e| {
            Error::from_status(Status::new(code, reason, message), loc).with_cause(e)
        })
    }

    #[track_caller]
    fn err_context(self, message: &str) -> Result<T, Error> {
        let loc = Location::caller();
        self.map_err(|e| {
            let status = Status::new(codes::UNKNOWN_CODE, codes::UNKNOWN_REASON, message);
            Error::from_status(status, loc).with_cause(e)
        })
    }
}
