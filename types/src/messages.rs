//! Base message types for main-thread <-> worker communication

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tsify::Tsify;

/// Unique identifier for message correlation
pub type MessageId = String;

/// Timestamp in milliseconds since Unix epoch
pub type Timestamp = u64;

/// Envelope for all requests sent to a worker
#[derive(Tsify, Serialize, Deserialize, Clone, Debug)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Request<T> {
    /// Unique message ID for request/response matching
    pub id: MessageId,
    /// Request timestamp
    pub timestamp: Timestamp,
    /// Request payload
    pub payload: T,
}

impl<T> Request<T> {
    /// Wrap a payload with a fresh correlation id
    pub fn new(payload: T) -> Self {
        Request {
            id: generate_id(),
            timestamp: now(),
            payload,
        }
    }
}

/// Envelope for events emitted by a worker; one request can produce
/// several responses (progress reports before the terminal event), all
/// carrying the request's id
#[derive(Tsify, Serialize, Deserialize, Clone, Debug)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Response<T> {
    /// Matches the request ID
    pub id: MessageId,
    /// Response timestamp
    pub timestamp: Timestamp,
    /// Response payload
    pub payload: T,
}

impl<T> Response<T> {
    /// Wrap an event for the request identified by `id`
    pub fn new(id: impl Into<MessageId>, payload: T) -> Self {
        Response {
            id: id.into(),
            timestamp: now(),
            payload,
        }
    }
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a new message ID
///
/// A process-wide sequence number is appended so two requests issued in
/// the same clock tick still get distinct ids.
pub fn generate_id() -> MessageId {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now_nanos(), seq)
}

/// Get current timestamp
pub fn now() -> Timestamp {
    (now_nanos() / 1_000_000) as u64
}

#[cfg(target_arch = "wasm32")]
fn now_nanos() -> u128 {
    (js_sys::Date::now() * 1_000_000.0) as u128
}

#[cfg(not(target_arch = "wasm32"))]
fn now_nanos() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_within_a_tick() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn request_envelope_round_trips() {
        let request = Request::new("payload".to_string());
        let json = serde_json::to_string(&request).unwrap();
        let back: Request<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, request.id);
        assert_eq!(back.payload, "payload");
    }

    #[test]
    fn response_echoes_the_request_id() {
        let response = Response::new("abc-1", 42u32);
        assert_eq!(response.id, "abc-1");
        assert_eq!(response.payload, 42);
    }
}
