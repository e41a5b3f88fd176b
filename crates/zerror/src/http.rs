//! HTTP response body.
//!
//! Over HTTP the trace id sits at the top level of the JSON body, next to
//! the status fields, rather than inside `metadata` as it does over RPC:
//!
//! ```json
//! { "code": 404, "reason": "USER_NOT_FOUND", "message": "missing",
//!   "metadata": { "user_id": "42" }, "id": "..." }
//! ```

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::codes;
use crate::convert;
use crate::error::Error;
use crate::status::{Metadata, Status};

/// JSON body of an error response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorBody {
    pub code: i32,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default)]
    pub id: String,
}

impl HttpErrorBody {
    /// Rebuild the error a server rendered. A missing id is minted on
    /// first read.
    pub fn into_error(self) -> Error {
        let mut status = Status::new(self.code, self.reason, self.message).with_id(self.id);
        status.metadata = self.metadata;
        Error::from_status_lazy(status)
    }
}

/// Response status and body for an error.
///
/// Codes outside `100..=599` are answered with 500; the body keeps the
/// original code.
#[track_caller]
pub fn render(err: &Error) -> (u16, HttpErrorBody) {
    let id = err.id().to_string();
    let body = HttpErrorBody {
        code: err.code(),
        reason: err.reason().to_string(),
        message: err.message().to_string(),
        metadata: err.metadata().clone(),
        id,
    };
    (status_line(err.code()), body)
}

/// [`render`] for any error, converted first.
#[track_caller]
pub fn render_any(err: &(dyn StdError + 'static)) -> (u16, HttpErrorBody) {
    render(&convert::from_error(err))
}

fn status_line(code: i32) -> u16 {
    match u16::try_from(code) {
        Ok(code) if (100..=599).contains(&code) => code,
        _ => {
            tracing::debug!(code, "code is not an HTTP status, answering 500");
            codes::INTERNAL_SERVER_ERROR as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn id_at_top_level() {
        let err = Error::new(404, "USER_NOT_FOUND", "missing").with_meta("user_id", "42");
        let (status, body) = render(&err);
        assert_eq!(status, 404);
        assert_eq!(body.id, err.id().as_str());

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["id"], err.id().as_str());
        assert_eq!(json["reason"], "USER_NOT_FOUND");
        assert_eq!(json["metadata"]["user_id"], "42");
        assert!(json["metadata"].get("error_id").is_none());
    }

    #[test]
    fn body_round_trip() {
        let err = Error::new(409, "TAKEN", "already taken").with_meta("k", "v");
        let (_, body) = render(&err);
        let json = serde_json::to_string(&body).unwrap();
        let back: HttpErrorBody = serde_json::from_str(&json).unwrap();
        let back = back.into_error();
        assert_eq!(back.id(), err.id());
        assert_eq!(back.code(), 409);
        assert_eq!(back.metadata().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn body_without_id_mints_one() {
        let body: HttpErrorBody = serde_json::from_str(r#"{"code": 400}"#).unwrap();
        let err = body.into_error();
        assert!(err.peek_id().is_none());
        assert!(!err.id().is_empty());
        assert_eq!(err.reason(), "");
    }

    #[test]
    fn derived_body_error_keeps_id() {
        let body: HttpErrorBody = serde_json::from_str(r#"{"code": 404}"#).unwrap();
        let err = body.into_error();
        let mut md = Metadata::new();
        md.insert("k".into(), "v".into());
        let derived = err.with_metadata(md);
        assert_eq!(derived.id(), err.id());
    }

    #[test]
    fn non_http_codes_answer_500() {
        assert_eq!(render(&Error::new(0, "ZERO", "x")).0, 500);
        assert_eq!(render(&Error::new(-1, "NEG", "x")).0, 500);
        assert_eq!(render(&Error::new(70000, "BIG", "x")).0, 500);
        let (status, body) = render(&Error::new(99, "LOW", "x"));
        assert_eq!(status, 500);
        assert_eq!(body.code, 99);
    }

    #[test]
    fn render_any_converts_first() {
        let (status, body) = render_any(&io::Error::other("disk"));
        assert_eq!(status, 500);
        assert_eq!(body.message, "disk");
        assert!(!body.id.is_empty());
    }
}
