//! Deterministic question identity.
//!
//! A question's id is a SHA-256 content address over the owning tenant and the
//! trimmed question text, hex-encoded behind a fixed `q_` prefix. The same text
//! imported twice by one tenant maps to the same id, which is what makes import
//! idempotent; the same text imported by two tenants maps to two ids.

use sha2::{Digest, Sha256};

/// Prefix separating question ids from other key spaces.
pub const QUESTION_ID_PREFIX: &str = "q_";

/// Normalize question text before keying.
pub fn normalize(question_text: &str) -> &str {
    question_text.trim()
}

/// Derive the id of a question for a tenant.
pub fn question_id(tenant_id: &str, question_text: &str) -> String {
    let mut hasher = Sha256::new();
    // Length prefix keeps (tenant, text) boundaries unambiguous.
    hasher.update((tenant_id.len() as u64).to_be_bytes());
    hasher.update(tenant_id.as_bytes());
    hasher.update(normalize(question_text).as_bytes());
    format!("{}{}", QUESTION_ID_PREFIX, hex::encode(hasher.finalize()))
}

/// Whether `id` looks like a question id (prefix plus 64 hex digits).
pub fn is_question_id(id: &str) -> bool {
    id.strip_prefix(QUESTION_ID_PREFIX)
        .map(|digest| digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit()))
        .unwrap_or(false)
}
