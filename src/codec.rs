// src/codec.rs
//! Binary record codec for [`Job`] values.
//!
//! A record is a fixed 4-byte marker followed by the bincode (standard
//! configuration) encoding of the job. Decoding rejects a missing marker,
//! truncated input and trailing bytes, which is how records written with an
//! incompatible layout are caught. Records larger than
//! [`MAX_RECORD_BYTES`] are refused both ways, so a corrupt length prefix
//! cannot make the decoder allocate without bound.

use bincode::config::Config;

use crate::job::Job;
use crate::utils::constants::MAX_RECORD_BYTES;

const RECORD_MARKER: &[u8; 4] = b"JOBR";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode job record: {0}")]
    Encode(String),
    #[error("failed to decode job record: {0}")]
    Decode(String),
}

fn config() -> impl Config {
    bincode::config::standard().with_limit::<MAX_RECORD_BYTES>()
}

pub fn encode(job: &Job) -> Result<Vec<u8>, CodecError> {
    let body = bincode::serde::encode_to_vec(job, config())
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    if body.len() > MAX_RECORD_BYTES {
        return Err(CodecError::Encode(format!(
            "record is {} bytes, limit is {}",
            body.len(),
            MAX_RECORD_BYTES
        )));
    }

    let mut record = Vec::with_capacity(RECORD_MARKER.len() + body.len());
    record.extend_from_slice(RECORD_MARKER);
    record.extend_from_slice(&body);
    Ok(record)
}

pub fn decode(bytes: &[u8]) -> Result<Job, CodecError> {
    let body = bytes
        .strip_prefix(RECORD_MARKER.as_slice())
        .ok_or_else(|| CodecError::Decode("missing record marker".to_string()))?;
    if body.len() > MAX_RECORD_BYTES {
        return Err(CodecError::Decode(format!(
            "record is {} bytes, limit is {}",
            body.len(),
            MAX_RECORD_BYTES
        )));
    }

    let (job, read): (Job, usize) = bincode::serde::decode_from_slice(body, config())
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    if read != body.len() {
        return Err(CodecError::Decode(format!(
            "{} trailing bytes after record",
            body.len() - read
        )));
    }
    Ok(job)
}
