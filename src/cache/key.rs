//! Stable cache keys for chat requests.
//!
//! The key is a SHA-256 digest over a length-prefixed encoding of the
//! request content, so it is identical across processes and hosts. Volatile
//! fields (message timestamps, sampling parameters) are not part of the key.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::providers::ChatRequest;

/// Namespace prefix for every response cache key.
pub const KEY_PREFIX: &str = "ai_response:";

/// Derive the cache key for a request.
///
/// Covers the provider, the model override, every message's role and
/// content in order, and the full conversation context.
///
/// Two requests with identical messages, context and provider share a key
/// only when their model overrides also match: a reply generated by one
/// model is never served for another.
pub fn derive_key(request: &ChatRequest) -> String {
    let mut hasher = Sha256::new();
    write_field(&mut hasher, request.provider.as_str().as_bytes());
    write_optional(&mut hasher, request.model.as_deref());

    write_len(&mut hasher, request.messages.len());
    for message in &request.messages {
        write_field(&mut hasher, message.role.as_str().as_bytes());
        write_field(&mut hasher, message.content.as_bytes());
    }

    let context = &request.context;
    write_field(&mut hasher, context.domain.as_str().as_bytes());
    write_optional(&mut hasher, context.specific_context.as_deref());
    let metadata = context.metadata.as_ref().map(|m| {
        let mut out = String::new();
        canonical_json(&Value::Object(m.clone()), &mut out);
        out
    });
    write_optional(&mut hasher, metadata.as_deref());

    format!("{KEY_PREFIX}{}", hex::encode(hasher.finalize()))
}

fn write_len(hasher: &mut Sha256, len: usize) {
    hasher.update((len as u64).to_le_bytes());
}

/// Length-prefixed so that `("ab", "c")` and `("a", "bc")` never collide.
fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    write_len(hasher, bytes.len());
    hasher.update(bytes);
}

/// Tagged so that `None` and `Some("")` hash differently.
fn write_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            write_field(hasher, v.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

/// Serialize JSON with object keys sorted at every level.
///
/// `serde_json::to_string` only sorts while the `preserve_order` feature is
/// off, and any crate in the graph can turn it on through feature unification.
fn canonical_json(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                canonical_json(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                canonical_json(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
