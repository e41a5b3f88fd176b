//! Status code spaces and the fixed translation between them.
//!
//! # Code Spaces
//!
//! | Space | Type       | Used by                                   |
//! |-------|------------|-------------------------------------------|
//! | HTTP  | `i32`      | `Error::code`, HTTP bodies                |
//! | RPC   | [`RpcCode`]| [`RemoteStatus`](crate::RemoteStatus)     |
//!
//! Translation is a lookup table in each direction, not arithmetic, and it
//! is lossy from RPC to HTTP: `InvalidArgument`, `FailedPrecondition` and
//! `OutOfRange` all become 400.
//!
//! ```rust
//! use zerror::codes::{self, RpcCode};
//!
//! assert_eq!(codes::to_rpc_code(codes::NOT_FOUND), RpcCode::NotFound);
//! assert_eq!(codes::to_http_code(RpcCode::OutOfRange), codes::BAD_REQUEST);
//! ```

mod http;
mod rpc;
mod convert;

pub use http::*;
pub use rpc::RpcCode;
pub use convert::{to_http_code, to_rpc_code};
