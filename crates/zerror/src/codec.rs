//! Trace id generation and decoding.
//!
//! # Wire format
//!
//! ```text
//! function@file:line:timestamp_ns:thread_id:process_id:random_hex
//!     │
//!     ▼  base64 (standard alphabet, padded)
//! "Z2V0X3VzZXJAaGFuZGxlcnMucnM6NDI6..."
//! ```
//!
//! When a runtime probe fails the fallback record is used instead:
//!
//! ```text
//! fallback:timestamp_ns:process_id:random_int
//! ```
//!
//! [`decode`] is a pure function over the string: it can run in any
//! process that holds the id, including the `error-decoder` tool.

use std::panic::Location;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::DateTime;
use serde::Serialize;

use crate::id::TraceId;
use crate::site::{self, CallSite};

/// Literal first field of a fallback record.
pub const FALLBACK_MARKER: &str = "fallback";

/// Minimum number of `:`-separated fields in a full record.
const FULL_FIELDS: usize = 6;

/// Minimum number of `:`-separated fields in a fallback record.
const FALLBACK_FIELDS: usize = 4;

/// Why a trace id could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to decode error id: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("error id is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid error id format, expected at least 6 parts, got {parts}")]
    Malformed { parts: usize, raw: String },
}

/// Which record layout an id was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Full,
    Fallback,
}

/// The decoded form of a trace id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugRecord {
    pub kind: RecordKind,
    pub function: String,
    pub file: String,
    pub line: u32,
    pub timestamp_ns: i64,
    pub thread_id: u64,
    pub process_id: u32,
    pub random_suffix: String,
    /// The base64 preimage.
    pub raw: String,
}

impl DebugRecord {
    /// The timestamp as `YYYY-MM-DD HH:MM:SS.mmm` in UTC.
    pub fn time_formatted(&self) -> String {
        DateTime::from_timestamp_nanos(self.timestamp_ns)
            .format("%Y-%m-%d %H:%M:%S%.3f")
            .to_string()
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == RecordKind::Fallback
    }
}

// ── Generation ────────────────────────────────────────────────────

/// Mint a trace id for the caller.
///
/// Never fails: if a runtime probe comes back empty the fallback record is
/// encoded instead.
#[track_caller]
pub fn generate() -> TraceId {
    generate_at(Location::caller())
}

/// Mint a trace id for a known location.
pub fn generate_at(loc: &'static Location<'static>) -> TraceId {
    let site = CallSite::from_location(loc);
    let record = match (probe_timestamp(), probe_thread_id(), probe_random()) {
        (Some(timestamp), Some(thread_id), Some(random)) => format!(
            "{}@{}:{}:{}:{}:{}:{}",
            site.function,
            site.file,
            site.line,
            timestamp,
            thread_id,
            std::process::id(),
            hex(&random),
        ),
        (timestamp, thread_id, random) => {
            tracing::debug!(
                timestamp = timestamp.is_some(),
                thread_id = thread_id.is_some(),
                random = random.is_some(),
                "trace id context unavailable, using fallback record"
            );
            fallback_record(timestamp, random)
        }
    };
    TraceId::from(STANDARD.encode(record.as_bytes()))
}

/// Mint a fallback id directly. Used where no call-site is wanted.
pub fn generate_fallback() -> TraceId {
    let record = fallback_record(probe_timestamp(), probe_random());
    TraceId::from(STANDARD.encode(record.as_bytes()))
}

fn fallback_record(timestamp: Option<i64>, random: Option<[u8; 4]>) -> String {
    let timestamp = timestamp.unwrap_or(0);
    let random = match random {
        Some(bytes) => u32::from_be_bytes(bytes),
        None => (timestamp & 0xFFFF_FFFF) as u32,
    };
    format!(
        "{}:{}:{}:{}",
        FALLBACK_MARKER,
        timestamp,
        std::process::id(),
        random
    )
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ── Probes ────────────────────────────────────────────────────────

/// Nanoseconds since the Unix epoch.
fn probe_timestamp() -> Option<i64> {
    let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    i64::try_from(since_epoch.as_nanos()).ok()
}

/// Four bytes from the OS random source.
fn probe_random() -> Option<[u8; 4]> {
    let mut buf = [0u8; 4];
    getrandom::fill(&mut buf).ok()?;
    Some(buf)
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        /// Kernel thread id of the calling thread.
        fn probe_thread_id() -> Option<u64> {
            // SAFETY: gettid takes no arguments and cannot fail.
            let tid = unsafe { libc::syscall(libc::SYS_gettid) };
            u64::try_from(tid).ok().filter(|&tid| tid > 0)
        }
    } else {
        /// Process-unique sequential id of the calling thread.
        fn probe_thread_id() -> Option<u64> {
            use std::sync::atomic::{AtomicU64, Ordering};

            static NEXT: AtomicU64 = AtomicU64::new(1);
            thread_local! {
                static THREAD_ID: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
            }
            THREAD_ID.try_with(|id| *id).ok()
        }
    }
}

// ── Decoding ──────────────────────────────────────────────────────

/// Decode a trace id into its debug record.
///
/// Unparsable numeric fields decode as `0`; only a broken base64 layer,
/// non-UTF-8 content, or too few fields are errors.
///
/// ```
/// let id = zerror::codec::generate();
/// let record = zerror::decode(id.as_str()).unwrap();
/// assert!(record.process_id > 0);
/// ```
pub fn decode(id: &str) -> Result<DebugRecord, DecodeError> {
    let bytes = STANDARD.decode(id.trim())?;
    let raw = String::from_utf8(bytes)?;
    let parts: Vec<&str> = raw.split(':').collect();

    if parts[0] == FALLBACK_MARKER && parts.len() >= FALLBACK_FIELDS {
        return Ok(DebugRecord {
            kind: RecordKind::Fallback,
            function: FALLBACK_MARKER.to_string(),
            file: String::new(),
            line: 0,
            timestamp_ns: parts[1].parse().unwrap_or(0),
            thread_id: 0,
            process_id: parts[2].parse().unwrap_or(0),
            random_suffix: parts[3].to_string(),
            raw: raw.clone(),
        });
    }

    if parts.len() < FULL_FIELDS {
        return Err(DecodeError::Malformed {
            parts: parts.len(),
            raw,
        });
    }

    let (function, file) = match parts[0].rfind('@') {
        Some(at) => (&parts[0][..at], &parts[0][at + 1..]),
        None => (site::UNKNOWN, parts[0]),
    };

    Ok(DebugRecord {
        kind: RecordKind::Full,
        function: function.to_string(),
        file: file.to_string(),
        line: parts[1].parse().unwrap_or(0),
        timestamp_ns: parts[2].parse().unwrap_or(0),
        thread_id: parts[3].parse().unwrap_or(0),
        process_id: parts[4].parse().unwrap_or(0),
        random_suffix: parts[5].to_string(),
        raw: raw.clone(),
    })
}
