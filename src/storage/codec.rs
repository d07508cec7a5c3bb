//! Reversible text encoding for stored keys and values: percent-encode as a
//! URI component, then base64.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::storage::StorageError;

pub fn encode(value: &str) -> String {
    STANDARD.encode(urlencoding::encode(value).as_bytes())
}

pub fn decode(value: &str) -> Result<String, StorageError> {
    let raw = String::from_utf8(STANDARD.decode(value)?)?;
    Ok(urlencoding::decode(&raw)?.into_owned())
}
