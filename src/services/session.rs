// src/services/session.rs
use uuid::Uuid;

/// Pick the session id for a request.
///
/// A non-empty client value is echoed back byte-for-byte; otherwise a fresh
/// v4 UUID is minted. Nothing is stored today. This is the seam where a
/// future conversation-memory store gets keyed: swap the pure lookup for a
/// store-backed one without touching the chat pipeline.
pub fn resolve_session_id(supplied: Option<&str>) -> String {
    match supplied {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}
