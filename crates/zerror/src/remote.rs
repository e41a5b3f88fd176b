//! Remote (RPC) status representation.
//!
//! A [`RemoteStatus`] is what crosses an RPC boundary: an [`RpcCode`], a
//! message, and a list of typed details. Errors from this crate attach one
//! detail of type [`STATUS_DETAIL_TYPE_URL`] carrying code, reason,
//! message and metadata, with the trace id folded into
//! `metadata["error_id"]`.
//!
//! ```text
//! Error { code: 404, reason, message, metadata, id }
//!       │  to_remote_status()
//!       ▼
//! RemoteStatus { NotFound, message, [Any(errors.Status { 404, reason, message,
//!                                                         metadata + error_id })] }
//!       │  encode()                         ▲ decode()
//!       ▼                                   │
//! google.rpc.Status protobuf bytes ─────────┘
//! ```

use std::fmt;

use prost::Message;

use crate::codes::{self, RpcCode};
use crate::error::Error;
use crate::status::Metadata;

/// Metadata key that carries the trace id over RPC.
pub const ERROR_ID_KEY: &str = "error_id";

/// Type URL of the structured detail payload.
pub const STATUS_DETAIL_TYPE_URL: &str = "type.googleapis.com/errors.Status";

/// Structured detail payload: `errors.Status`.
#[derive(Clone, PartialEq, Message)]
pub struct StatusDetail {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub reason: String,
    #[prost(string, tag = "3")]
    pub message: String,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: Metadata,
}

/// A type-tagged detail: `google.protobuf.Any`.
#[derive(Clone, PartialEq, Message)]
pub struct AnyDetail {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

impl AnyDetail {
    /// Pack a status detail.
    pub fn pack(detail: &StatusDetail) -> Self {
        Self {
            type_url: STATUS_DETAIL_TYPE_URL.to_string(),
            value: detail.encode_to_vec(),
        }
    }

    /// Unpack as a status detail. `None` for other types or bad bytes.
    pub fn unpack(&self) -> Option<StatusDetail> {
        if self.type_url != STATUS_DETAIL_TYPE_URL {
            return None;
        }
        StatusDetail::decode(self.value.as_slice()).ok()
    }
}

/// Wire form: `google.rpc.Status`.
#[derive(Clone, PartialEq, Message)]
struct RpcStatusProto {
    #[prost(int32, tag = "1")]
    code: i32,
    #[prost(string, tag = "2")]
    message: String,
    #[prost(message, repeated, tag = "3")]
    details: Vec<AnyDetail>,
}

/// An RPC status with optional typed details.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteStatus {
    code: RpcCode,
    message: String,
    details: Vec<AnyDetail>,
}

impl RemoteStatus {
    /// A status without details.
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Append a detail.
    pub fn with_detail(mut self, detail: AnyDetail) -> Self {
        self.details.push(detail);
        self
    }

    #[inline]
    pub fn code(&self) -> RpcCode {
        self.code
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn details(&self) -> &[AnyDetail] {
        &self.details
    }

    /// The first detail that unpacks as a [`StatusDetail`].
    pub fn status_detail(&self) -> Option<StatusDetail> {
        self.details.iter().find_map(AnyDetail::unpack)
    }

    /// Serialize as `google.rpc.Status` protobuf bytes.
    pub fn encode(&self) -> Vec<u8> {
        RpcStatusProto {
            code: self.code.as_i32(),
            message: self.message.clone(),
            details: self.details.clone(),
        }
        .encode_to_vec()
    }

    /// Parse `google.rpc.Status` protobuf bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, prost::DecodeError> {
        let proto = RpcStatusProto::decode(bytes)?;
        Ok(Self {
            code: RpcCode::from_i32(proto.code),
            message: proto.message,
            details: proto.details,
        })
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc status {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RemoteStatus {}

// ── Error → RemoteStatus ──────────────────────────────────────────

impl Error {
    /// Render as a remote status.
    ///
    /// Materializes the id if needed and folds it into the detail's
    /// metadata under [`ERROR_ID_KEY`]. The error's own metadata is not
    /// modified.
    #[track_caller]
    pub fn to_remote_status(&self) -> RemoteStatus {
        let id = self.id().clone();

        let mut metadata = self.metadata().clone();
        metadata.insert(ERROR_ID_KEY.to_string(), id.into_string());

        let detail = StatusDetail {
            code: self.code(),
            reason: self.reason().to_string(),
            message: self.message().to_string(),
            metadata,
        };

        RemoteStatus::new(codes::to_rpc_code(self.code()), self.message())
            .with_detail(AnyDetail::pack(&detail))
    }
}

impl From<Error> for RemoteStatus {
    #[track_caller]
    fn from(err: Error) -> Self {
        err.to_remote_status()
    }
}

impl From<&Error> for RemoteStatus {
    #[track_caller]
    fn from(err: &Error) -> Self {
        err.to_remote_status()
    }
}
