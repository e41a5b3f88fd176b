//! HTTP status codes used by the translation tables and the
//! convenience constructors.

pub const OK: i32 = 200;
pub const BAD_REQUEST: i32 = 400;
pub const UNAUTHORIZED: i32 = 401;
pub const FORBIDDEN: i32 = 403;
pub const NOT_FOUND: i32 = 404;
pub const CONFLICT: i32 = 409;
pub const TOO_MANY_REQUESTS: i32 = 429;
/// Non-standard, nginx convention for a client that hung up.
pub const CLIENT_CLOSED: i32 = 499;
pub const INTERNAL_SERVER_ERROR: i32 = 500;
pub const NOT_IMPLEMENTED: i32 = 501;
pub const SERVICE_UNAVAILABLE: i32 = 503;
pub const GATEWAY_TIMEOUT: i32 = 504;

/// Code given to errors of unknown origin.
pub const UNKNOWN_CODE: i32 = INTERNAL_SERVER_ERROR;

/// Reason given to errors of unknown origin.
pub const UNKNOWN_REASON: &str = "";
