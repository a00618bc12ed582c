//! AIFF (`FORM`/`AIFF`/`AIFC`) container handler: big-endian chunk sizes.
//!
//! Grounded on `examples/original_source/source/uitsAIFFManager.c`. Per
//! spec.md's Design Note, chunk sizes are always written with an explicit
//! big-endian primitive rather than relying on an in-place byte-swap, so
//! there is no dependence on a host-endianness flag.

use crate::crypto::sha256_bytes;
use crate::err::{UitsError, UitsResult};

const FORM_HEADER_LEN: usize = 12; // "FORM" + be size + form type
const CHUNK_HEADER_LEN: usize = 8;
const APPL_CHUNK_ID: &[u8; 4] = b"APPL";

struct Chunk<'a> {
    id: [u8; 4],
    body: &'a [u8],
}

fn chunks(data: &[u8]) -> UitsResult<Vec<Chunk<'_>>> {
    if data.len() < FORM_HEADER_LEN || &data[0..4] != b"FORM" {
        return Err(UitsError::Aiff("not a FORM chunk".into()));
    }

    let form_type = &data[8..12];
    if form_type != b"AIFF" && form_type != b"AIFC" {
        return Err(UitsError::Aiff(format!(
            "unsupported AIFF form type '{}'",
            String::from_utf8_lossy(form_type)
        )));
    }

    let mut out = Vec::new();
    let mut pos = FORM_HEADER_LEN;

    while pos + CHUNK_HEADER_LEN <= data.len() {
        let id: [u8; 4] = data[pos..pos + 4].try_into().unwrap();
        let size = u32::from_be_bytes(data[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let body_start = pos + CHUNK_HEADER_LEN;
        let body_end = body_start + size;
        if body_end > data.len() {
            return Err(UitsError::Aiff("chunk runs past end of file".into()));
        }

        out.push(Chunk {
            id,
            body: &data[body_start..body_end],
        });

        pos = body_end + (size & 1); // chunks are padded to an even size
    }

    Ok(out)
}

pub fn is_valid(data: &[u8]) -> bool {
    chunks(data).is_ok()
}

pub fn media_hash(data: &[u8]) -> UitsResult<Vec<u8>> {
    let ssnd = chunks(data)?
        .into_iter()
        .find(|c| &c.id == b"SSND")
        .ok_or_else(|| UitsError::Aiff("no SSND chunk".into()))?;
    Ok(sha256_bytes(ssnd.body))
}

pub fn embed(data: &[u8], token_xml: &str) -> UitsResult<Vec<u8>> {
    if chunks(data)?.iter().any(|c| &c.id == APPL_CHUNK_ID) {
        return Err(UitsError::Embed(
            "file already carries an APPL/UITS chunk".into(),
        ));
    }

    let payload = token_xml.as_bytes();
    let pad = (payload.len() & 1) as u32;

    let mut out = data.to_vec();
    out.extend_from_slice(APPL_CHUNK_ID);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    if pad == 1 {
        out.push(0);
    }

    let old_form_size = u32::from_be_bytes(data[4..8].try_into().unwrap());
    let new_form_size = old_form_size + CHUNK_HEADER_LEN as u32 + payload.len() as u32;
    out[4..8].copy_from_slice(&new_form_size.to_be_bytes());

    Ok(out)
}

pub fn extract(data: &[u8]) -> UitsResult<Option<String>> {
    match chunks(data)?.into_iter().find(|c| &c.id == APPL_CHUNK_ID) {
        Some(chunk) => {
            let text = String::from_utf8(chunk.body.to_vec())
                .map_err(|e| UitsError::Aiff(format!("embedded token is not valid UTF-8: {}", e)))?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file(ssnd_body: &[u8]) -> Vec<u8> {
        let mut ssnd = Vec::new();
        ssnd.extend_from_slice(b"SSND");
        ssnd.extend_from_slice(&(ssnd_body.len() as u32).to_be_bytes());
        ssnd.extend_from_slice(ssnd_body);
        if ssnd_body.len() & 1 == 1 {
            ssnd.push(0);
        }

        let form_size = 4 + ssnd.len(); // form type + chunks
        let mut out = Vec::new();
        out.extend_from_slice(b"FORM");
        out.extend_from_slice(&(form_size as u32).to_be_bytes());
        out.extend_from_slice(b"AIFF");
        out.extend_from_slice(&ssnd);
        out
    }

    #[test]
    fn detects_form_aiff() {
        assert!(is_valid(&sample_file(b"samples")));
    }

    #[test]
    fn media_hash_covers_ssnd_body() {
        let data = sample_file(b"sample-bytes");
        assert_eq!(media_hash(&data).unwrap(), sha256_bytes(b"sample-bytes"));
    }

    #[test]
    fn embed_then_extract_round_trips_with_odd_length_pad() {
        let data = sample_file(b"sample-bytes");
        let token = "<?xml?>"; // odd length (7 bytes)
        assert_eq!(token.len() % 2, 1);

        let embedded = embed(&data, token).unwrap();
        assert_eq!(embedded.len() % 2, 0);
        let extracted = extract(&embedded).unwrap();
        assert_eq!(extracted.as_deref(), Some(token));
        assert_eq!(media_hash(&embedded).unwrap(), sha256_bytes(b"sample-bytes"));
    }

    #[test]
    fn embed_rejects_existing_appl_chunk() {
        let mut data = sample_file(b"sample-bytes");
        data.extend_from_slice(b"APPL");
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(b"old!");
        let old_size = u32::from_be_bytes(data[4..8].try_into().unwrap());
        data[4..8].copy_from_slice(&(old_size + 12).to_be_bytes());

        assert!(embed(&data, "<?xml?>").is_err());
    }
}
