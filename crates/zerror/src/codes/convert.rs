use super::http;
use super::RpcCode;

/// HTTP status → RPC code. Anything not listed is `Unknown`.
pub fn to_rpc_code(code: i32) -> RpcCode {
    match code {
        http::OK                    => RpcCode::Ok,
        http::BAD_REQUEST           => RpcCode::InvalidArgument,
        http::UNAUTHORIZED          => RpcCode::Unauthenticated,
        http::FORBIDDEN             => RpcCode::PermissionDenied,
        http::NOT_FOUND             => RpcCode::NotFound,
        http::CONFLICT              => RpcCode::Aborted,
        http::TOO_MANY_REQUESTS     => RpcCode::ResourceExhausted,
        http::CLIENT_CLOSED         => RpcCode::Cancelled,
        http::INTERNAL_SERVER_ERROR => RpcCode::Internal,
        http::NOT_IMPLEMENTED       => RpcCode::Unimplemented,
        http::SERVICE_UNAVAILABLE   => RpcCode::Unavailable,
        http::GATEWAY_TIMEOUT       => RpcCode::DeadlineExceeded,
        _                           => RpcCode::Unknown,
    }
}

/// RPC code → HTTP status. Several RPC codes share one HTTP status, so
/// this direction does not invert [`to_rpc_code`].
pub fn to_http_code(code: RpcCode) -> i32 {
    match code {
        RpcCode::Ok                 => http::OK,
        RpcCode::Cancelled          => http::CLIENT_CLOSED,
        RpcCode::Unknown            => http::INTERNAL_SERVER_ERROR,
        RpcCode::InvalidArgument    => http::BAD_REQUEST,
        RpcCode::DeadlineExceeded   => http::GATEWAY_TIMEOUT,
        RpcCode::NotFound           => http::NOT_FOUND,
        RpcCode::AlreadyExists      => http::CONFLICT,
        RpcCode::PermissionDenied   => http::FORBIDDEN,
        RpcCode::Unauthenticated    => http::UNAUTHORIZED,
        RpcCode::ResourceExhausted  => http::TOO_MANY_REQUESTS,
        RpcCode::FailedPrecondition => http::BAD_REQUEST,
        RpcCode::Aborted            => http::CONFLICT,
        RpcCode::OutOfRange         => http::BAD_REQUEST,
        RpcCode::Unimplemented      => http::NOT_IMPLEMENTED,
        RpcCode::Internal           => http::INTERNAL_SERVER_ERROR,
        RpcCode::Unavailable        => http::SERVICE_UNAVAILABLE,
        RpcCode::DataLoss           => http::INTERNAL_SERVER_ERROR,
    }
}
