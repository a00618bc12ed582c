//! WAV (`RIFF`/`WAVE`) container handler: little-endian chunk sizes, the
//! byte-order mirror of [`crate::container::aiff`].
//!
//! Grounded on `examples/original_source/source/uitsWAVManager.c`.

use crate::crypto::sha256_bytes;
use crate::err::{UitsError, UitsResult};

const RIFF_HEADER_LEN: usize = 12; // "RIFF" + le size + form type
const CHUNK_HEADER_LEN: usize = 8;
const UITS_CHUNK_ID: &[u8; 4] = b"UITS";

struct Chunk<'a> {
    id: [u8; 4],
    body: &'a [u8],
}

fn chunks(data: &[u8]) -> UitsResult<Vec<Chunk<'_>>> {
    if data.len() < RIFF_HEADER_LEN || &data[0..4] != b"RIFF" {
        return Err(UitsError::Wav("not a RIFF chunk".into()));
    }

    if &data[8..12] != b"WAVE" {
        return Err(UitsError::Wav(format!(
            "unsupported RIFF form type '{}'",
            String::from_utf8_lossy(&data[8..12])
        )));
    }

    let mut out = Vec::new();
    let mut pos = RIFF_HEADER_LEN;

    while pos + CHUNK_HEADER_LEN <= data.len() {
        let id: [u8; 4] = data[pos..pos + 4].try_into().unwrap();
        let size = u32::from_le_bytes(data[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let body_start = pos + CHUNK_HEADER_LEN;
        let body_end = body_start + size;
        if body_end > data.len() {
            return Err(UitsError::Wav("chunk runs past end of file".into()));
        }

        out.push(Chunk {
            id,
            body: &data[body_start..body_end],
        });

        pos = body_end + (size & 1);
    }

    Ok(out)
}

pub fn is_valid(data: &[u8]) -> bool {
    chunks(data).is_ok()
}

pub fn media_hash(data: &[u8]) -> UitsResult<Vec<u8>> {
    let wav_data = chunks(data)?
        .into_iter()
        .find(|c| &c.id == b"data")
        .ok_or_else(|| UitsError::Wav("no data chunk".into()))?;
    Ok(sha256_bytes(wav_data.body))
}

pub fn embed(data: &[u8], token_xml: &str) -> UitsResult<Vec<u8>> {
    if chunks(data)?.iter().any(|c| &c.id == UITS_CHUNK_ID) {
        return Err(UitsError::Embed(
            "file already carries a UITS chunk".into(),
        ));
    }

    let payload = token_xml.as_bytes();

    let mut out = data.to_vec();
    out.extend_from_slice(UITS_CHUNK_ID);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() & 1 == 1 {
        out.push(0);
    }

    let old_riff_size = u32::from_le_bytes(data[4..8].try_into().unwrap());
    let new_riff_size = old_riff_size + CHUNK_HEADER_LEN as u32 + payload.len() as u32;
    out[4..8].copy_from_slice(&new_riff_size.to_le_bytes());

    Ok(out)
}

pub fn extract(data: &[u8]) -> UitsResult<Option<String>> {
    match chunks(data)?.into_iter().find(|c| &c.id == UITS_CHUNK_ID) {
        Some(chunk) => {
            let text = String::from_utf8(chunk.body.to_vec())
                .map_err(|e| UitsError::Wav(format!("embedded token is not valid UTF-8: {}", e)))?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}
