// Hashing helpers: land commitment hashes and Anchor discriminators.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// Domain separation prefix for land commitments.
const COMMITMENT_DOMAIN: &[u8] = b"EVGLAND";

/// A helper function to sort a JSON object's keys recursively.
/// This is essential for canonical serialization.
fn sort_json_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted_map: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), sort_json_value(v)))
                .collect();
            Value::Object(sorted_map.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_json_value).collect()),
        _ => value.clone(),
    }
}

/// Canonical string form of a JSON value (keys sorted at every level).
pub fn canonical_json(value: &Value) -> String {
    sort_json_value(value).to_string()
}

/// Hex sha256 commitment over the canonical form of the submitted land data.
pub fn commitment_hash(land_data: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update(canonical_json(land_data).as_bytes());
    hex::encode(hasher.finalize())
}

/// Anchor's 8-byte discriminator: `sha256("<namespace>:<name>")[..8]`.
pub fn anchor_discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}
