//! Pluggable payload codecs for binary columns.
//!
//! A blob column stores an arbitrary serializable payload. The codec turns
//! the payload into bytes on write and back on read; the column machinery
//! only ever sees the bytes.

use crate::error::{OrmError, OrmResult};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encodes a payload type to bytes and back.
pub trait BlobCodec<T>: Default {
    fn encode(&self, value: &T) -> OrmResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> OrmResult<T>;
}

/// The stock codec: serde_json bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl<T: Serialize + DeserializeOwned> BlobCodec<T> for JsonCodec {
    fn encode(&self, value: &T) -> OrmResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| OrmError::conversion("<blob>", e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> OrmResult<T> {
        serde_json::from_slice(bytes).map_err(|e| OrmError::decode("<blob>", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        value_a: i32,
        value_b: i32,
    }

    #[test]
    fn json_codec_round_trips() {
        let payload = Payload {
            value_a: 42,
            value_b: -44,
        };
        let codec = JsonCodec;
        let bytes = codec.encode(&payload).unwrap();
        let back: Payload = codec.decode(&bytes).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn json_codec_rejects_garbage() {
        let codec = JsonCodec;
        let result: OrmResult<Payload> = codec.decode(b"not json");
        assert!(result.is_err());
    }
}
