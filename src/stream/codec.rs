//! Wire encoding of scalar values.
//!
//! Frames are JSON objects keyed by [`CLASS_KEY`] and [`PTR_KEY`] plus one
//! entry per property. Values that plain JSON cannot tell apart are wrapped
//! in single-key objects:
//!
//! | Value           | Token                          |
//! |-----------------|--------------------------------|
//! | reference       | `{"ref": 3}`                   |
//! | bytes           | `{"bytes": "<base64>"}`        |
//! | vector          | `{"vec": [1.0, 2.0]}`          |
//! | matrix          | `{"mat": [[1.0, 0.0], ...]}`   |
//! | non-finite float| `{"float": "NaN"}`             |
//!
//! A top-level `{"detached": frame}` entry carries an object that was moved
//! out of a deeply nested frame. It is read like any frame but is not a root.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Number, Value as Json};

use super::error::SaveError;

pub const CLASS_KEY: &str = "class";
pub const PTR_KEY: &str = "ptr";
pub const REF_KEY: &str = "ref";
pub const BYTES_KEY: &str = "bytes";
pub const VECTOR_KEY: &str = "vec";
pub const MATRIX_KEY: &str = "mat";
pub const FLOAT_KEY: &str = "float";
pub const DETACHED_KEY: &str = "detached";

pub fn is_reserved(name: &str) -> bool {
    name == CLASS_KEY || name == PTR_KEY
}

fn tagged(key: &str, value: Json) -> Json {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Json::Object(map)
}

pub fn ref_token(ptr: u32) -> Json {
    tagged(REF_KEY, Json::from(ptr))
}

pub fn detached_token(frame: Json) -> Json {
    tagged(DETACHED_KEY, frame)
}

pub fn encode_float(f: f64) -> Json {
    match Number::from_f64(f) {
        Some(number) => Json::Number(number),
        None => {
            let name = if f.is_nan() {
                "NaN"
            } else if f > 0.0 {
                "inf"
            } else {
                "-inf"
            };
            tagged(FLOAT_KEY, Json::from(name))
        }
    }
}

pub fn encode_bytes(bytes: &[u8]) -> Json {
    tagged(BYTES_KEY, Json::from(STANDARD.encode(bytes)))
}

pub fn encode_vector(v: &[f64]) -> Json {
    tagged(
        VECTOR_KEY,
        Json::Array(v.iter().copied().map(encode_float).collect()),
    )
}

pub fn encode_matrix(rows: &[Vec<f64>]) -> Json {
    tagged(
        MATRIX_KEY,
        Json::Array(
            rows.iter()
                .map(|row| Json::Array(row.iter().copied().map(encode_float).collect()))
                .collect(),
        ),
    )
}

/// A number, or a `{"float": ...}` token.
pub fn decode_float(json: &Json) -> Result<f64, SaveError> {
    match json {
        Json::Number(number) => number
            .as_f64()
            .ok_or_else(|| SaveError::malformed(format!("number {} is not a float", number))),
        Json::Object(map) if map.len() == 1 => match map.get(FLOAT_KEY).and_then(Json::as_str) {
            Some("NaN") => Ok(f64::NAN),
            Some("inf") => Ok(f64::INFINITY),
            Some("-inf") => Ok(f64::NEG_INFINITY),
            _ => Err(SaveError::malformed(format!("bad float token {}", json))),
        },
        other => Err(SaveError::malformed(format!("expected a float, got {}", other))),
    }
}

pub fn decode_bytes(json: &Json) -> Result<Vec<u8>, SaveError> {
    let text = json
        .as_str()
        .ok_or_else(|| SaveError::malformed("bytes token must hold a base64 string"))?;
    STANDARD
        .decode(text)
        .map_err(|e| SaveError::malformed(format!("bad base64 payload: {}", e)))
}

pub fn decode_vector(json: &Json) -> Result<Vec<f64>, SaveError> {
    json.as_array()
        .ok_or_else(|| SaveError::malformed("vec token must hold an array"))?
        .iter()
        .map(decode_float)
        .collect()
}

pub fn decode_matrix(json: &Json) -> Result<Vec<Vec<f64>>, SaveError> {
    let rows = json
        .as_array()
        .ok_or_else(|| SaveError::malformed("mat token must hold an array of rows"))?
        .iter()
        .map(decode_vector)
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(first) = rows.first() {
        if rows.iter().any(|row| row.len() != first.len()) {
            return Err(SaveError::malformed("matrix rows differ in length"));
        }
    }
    Ok(rows)
}

/// Integer to pointer id; 0 is the null pointer.
pub fn decode_ptr(json: &Json) -> Result<u32, SaveError> {
    json.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| SaveError::malformed(format!("bad pointer id {}", json)))
}
