/// Construct an [`Error`](crate::Error) with a formatted message.
///
/// ```
/// use zerror::errorf;
///
/// let table = "users";
/// let err = errorf!(500, "DB_LOCKED", "table {} is locked", table);
/// assert_eq!(err.message(), "table users is locked");
/// ```
#[macro_export]
macro_rules! errorf {
    ($code:expr, $reason:expr, $($arg:tt)+) => {
        $crate::Error::newf($code, $reason, ::std::format_args!($($arg)+))
    };
}

/// Declare a table of error reasons.
///
/// Each entry becomes a module holding the reason's constants, a
/// constructor, a formatted constructor and a predicate. The predicate
/// compares [`reason`](crate::reason) of any error, so it also recognises
/// errors that came back over RPC.
///
/// ```
/// mod user_errors {
///     zerror::error_reasons! {
///         /// The requested user does not exist.
///         pub user_not_found = (404, "USER_NOT_FOUND");
///         pub user_banned = (403, "USER_BANNED");
///     }
/// }
///
/// use user_errors::{user_banned, user_not_found};
///
/// let err = user_not_found::new("no user 42");
/// assert_eq!(err.code(), 404);
/// assert_eq!(user_not_found::REASON, "USER_NOT_FOUND");
/// assert!(user_not_found::is(&err));
/// assert!(!user_banned::is(&err));
///
/// let err = user_banned::newf(format_args!("user {} is banned", 7));
/// assert_eq!(err.message(), "user 7 is banned");
/// ```
#[macro_export]
macro_rules! error_reasons {
    ($( $(#[$doc:meta])* $vis:vis $name:ident = ($code:expr, $reason:literal); )*) => {
        $(
            $(#[$doc])*
            #[allow(dead_code)]
            $vis mod $name {
                /// Symbolic reason.
                pub const REASON: &str = $reason;
                /// HTTP status code.
                pub const CODE: i32 = $code;

                #[track_caller]
                pub fn new(message: impl ::std::convert::Into<::std::string::String>) -> $crate::Error {
                    $crate::Error::new(CODE, REASON, message)
                }

                #[track_caller]
                pub fn newf(args: ::std::fmt::Arguments<'_>) -> $crate::Error {
                    $crate::Error::newf(CODE, REASON, args)
                }

                /// Whether `err` carries this reason.
                #[track_caller]
                pub fn is(err: &(dyn ::std::error::Error + 'static)) -> bool {
                    $crate::reason(::std::option::Option::Some(err)) == REASON
                }
            }
        )*
    };
}
