//! Cache key derivation from structured lookup parameters.
//!
//! The cache treats keys as opaque strings. Callers with high-cardinality
//! structured inputs can use [`derive_key`] to get a deterministic key:
//! parameters are serialized to JSON with object keys in sorted order and
//! every number rounded to three decimal places, so near-identical float
//! inputs collapse onto the same key.

use serde::Serialize;

/// Decimal places numeric fields are rounded to.
const KEY_FLOAT_PRECISION_DECIMALS: u32 = 3;

/// Errors from key derivation.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Parameters could not be serialized
    #[error("key parameters not serializable: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Derive a deterministic cache key from structured parameters.
///
/// # Errors
/// Returns `KeyError::Serialization` if the parameters cannot be serialized.
pub fn derive_key<T: Serialize>(params: &T) -> Result<String, KeyError> {
    let mut value = serde_json::to_value(params)?;
    round_numbers(&mut value);
    Ok(serde_json::to_string(&value)?)
}

fn round_numbers(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Number(n) => {
            // Integers stay exact; only finite floats are rounded.
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    let factor = 10_f64.powi(KEY_FLOAT_PRECISION_DECIMALS as i32);
                    let rounded = (f * factor).round() / factor;
                    if let Some(num) = serde_json::Number::from_f64(rounded) {
                        *n = num;
                    }
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                round_numbers(item);
            }
        }
        serde_json::Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                round_numbers(v);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Params {
        intensity: f64,
        mode: String,
        steps: u32,
    }

    #[test]
    fn test_deterministic() {
        let p = Params {
            intensity: 0.5,
            mode: "calm".to_string(),
            steps: 3,
        };
        assert_eq!(derive_key(&p).unwrap(), derive_key(&p).unwrap());
    }

    #[test]
    fn test_rounding_collapses_near_values() {
        let a = Params {
            intensity: 0.500_000_1,
            mode: "calm".to_string(),
            steps: 3,
        };
        let b = Params {
            intensity: 0.499_999_9,
            mode: "calm".to_string(),
            steps: 3,
        };
        assert_eq!(derive_key(&a).unwrap(), derive_key(&b).unwrap());
    }

    #[test]
    fn test_distinct_values_distinct_keys() {
        let a = Params {
            intensity: 0.5,
            mode: "calm".to_string(),
            steps: 3,
        };
        let b = Params {
            intensity: 0.6,
            mode: "calm".to_string(),
            steps: 3,
        };
        assert_ne!(derive_key(&a).unwrap(), derive_key(&b).unwrap());
    }

    #[test]
    fn test_integers_stay_exact() {
        let key = derive_key(&serde_json::json!({ "n": 1_000_000_007_u64 })).unwrap();
        assert!(key.contains("1000000007"));
    }

    #[test]
    fn test_nested_structures() {
        let key = derive_key(&serde_json::json!({
            "outer": { "inner": [0.123_456, 1.0] }
        }))
        .unwrap();
        assert!(key.contains("0.123"));
        assert!(!key.contains("0.123456"));
    }
}
