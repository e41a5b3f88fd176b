//! # zerror — structured, traceable service errors
//!
//! An error carries an HTTP-style code, a stable symbolic reason, a human
//! message, key/value metadata and an opaque trace id that can be decoded
//! back into where and when the error was created.
//!
//! ## Design
//!
//! - **Error** wraps a [`Status`] and an optional cause. Constructors mint
//!   the trace id at the caller (`#[track_caller]`); every `with_*`
//!   derivation returns a copy with the same id.
//!
//! - **Trace id** is base64 over `function@file:line:ts_ns:tid:pid:rand`.
//!   [`decode`] turns it back into a [`DebugRecord`]. If runtime probes
//!   fail, a `fallback:` record is minted instead.
//!
//! - **Remote status**: [`Error::to_remote_status`] maps the code onto an
//!   [`RpcCode`](codes::RpcCode) and attaches the full status as a typed
//!   detail, with the id in `metadata["error_id"]`. [`from_error`] reverses
//!   it for any error that crosses back.
//!
//! ## Quick Start
//!
//! ```rust
//! use zerror::{codes::{self, RpcCode}, Error};
//!
//! fn find_user(id: u64) -> zerror::Result<String> {
//!     Err(Error::not_found("USER_NOT_FOUND", format!("no user {}", id))
//!         .with_meta("user_id", id.to_string()))
//! }
//!
//! let err = find_user(42).unwrap_err();
//! assert_eq!(err.code(), codes::NOT_FOUND);
//!
//! // Across an RPC boundary and back.
//! let remote = err.to_remote_status();
//! assert_eq!(remote.code(), RpcCode::NotFound);
//! let back = zerror::from_error(&remote);
//! assert_eq!(back.id(), err.id());
//!
//! // Where did it come from?
//! let record = zerror::decode(err.id().as_str()).unwrap();
//! assert!(record.line > 0 || record.file == "redacted");
//! ```
//!
//! ## Configuration
//!
//! | Variable                   | Effect |
//! |----------------------------|--------|
//! | `ZERROR_REDACT_IDS`        | Replace function, file and line with `redacted` / `0` |
//! | `ZERROR_RESOLVE_FUNCTIONS` | Resolve function names from symbols (default on) |
//!
//! Or build an [`IdConfig`] and [`install`](IdConfig::install) it.
//!
//! ## Feature Flags
//!
//! | Flag         | Effect |
//! |--------------|--------|
//! | `production` | Redaction on by default |

mod id;
mod site;
pub mod config;
pub mod codec;
mod status;
mod error;
pub mod codes;
mod remote;
mod convert;
pub mod http;
#[macro_use]
mod macros;

// ── Public API ────────────────────────────────────────────────────

pub use id::{IdSlot, TraceId};
pub use site::CallSite;
pub use config::IdConfig;
pub use codec::{decode, DebugRecord, DecodeError, RecordKind};
pub use status::{Metadata, Status};
pub use error::{find_native, is, unwrap, Cause, Error};
pub use remote::{AnyDetail, RemoteStatus, StatusDetail, ERROR_ID_KEY, STATUS_DETAIL_TYPE_URL};
pub use convert::{
    code, from_error, from_error_opt, id, is_bad_request, is_client_closed, is_conflict,
    is_forbidden, is_gateway_timeout, is_internal_server, is_not_found, is_service_unavailable,
    is_unauthorized, reason, ResultExt,
};
pub use http::HttpErrorBody;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
