//! FLAC container handler.
//!
//! Metadata-block chain shape confirmed against the pack's `anni-flac` crate
//! and `examples/original_source/source/uitsFLACManager.c`.

use crate::crypto::sha256_bytes;
use crate::err::{UitsError, UitsResult};

const MAGIC: &[u8] = b"fLaC";
const BLOCK_HEADER_LEN: usize = 4;

const BLOCK_STREAMINFO: u8 = 0;
const BLOCK_PADDING: u8 = 1;
const BLOCK_APPLICATION: u8 = 2;

struct Block<'a> {
    block_type: u8,
    body: &'a [u8],
}

/// Parses the metadata-block chain starting right after the `fLaC` magic.
/// Returns the blocks (in file order) and the byte offset where audio
/// frames begin.
fn read_chain(data: &[u8]) -> UitsResult<(Vec<Block<'_>>, usize)> {
    if data.len() < 4 || &data[0..4] != MAGIC {
        return Err(UitsError::Flac("not a FLAC stream".into()));
    }

    let mut blocks = Vec::new();
    let mut pos = 4;

    loop {
        if pos + BLOCK_HEADER_LEN > data.len() {
            return Err(UitsError::Flac("truncated metadata block header".into()));
        }

        let is_last = data[pos] & 0x80 != 0;
        let block_type = data[pos] & 0x7F;
        let len = ((data[pos + 1] as usize) << 16)
            | ((data[pos + 2] as usize) << 8)
            | data[pos + 3] as usize;

        let body_start = pos + BLOCK_HEADER_LEN;
        let body_end = body_start + len;
        if body_end > data.len() {
            return Err(UitsError::Flac("metadata block runs past end of file".into()));
        }

        blocks.push(Block {
            block_type,
            body: &data[body_start..body_end],
        });

        pos = body_end;
        if is_last {
            break;
        }
    }

    Ok((blocks, pos))
}

pub fn is_valid(data: &[u8]) -> bool {
    matches!(read_chain(data), Ok((blocks, _)) if blocks.first().map(|b| b.block_type) == Some(BLOCK_STREAMINFO))
}

pub fn media_hash(data: &[u8]) -> UitsResult<Vec<u8>> {
    let (_, audio_start) = read_chain(data)?;
    Ok(sha256_bytes(&data[audio_start..]))
}

fn render_block(block_type: u8, is_last: bool, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + body.len());
    let mut type_byte = block_type & 0x7F;
    if is_last {
        type_byte |= 0x80;
    }
    out.push(type_byte);
    let len = body.len();
    out.push(((len >> 16) & 0xFF) as u8);
    out.push(((len >> 8) & 0xFF) as u8);
    out.push((len & 0xFF) as u8);
    out.extend_from_slice(body);
    out
}

/// Inserts a new `APPLICATION` block with ID `UITS`, sorting existing
/// `PADDING` blocks to the tail of the chain as spec.md §4.1.3 requires.
pub fn embed(data: &[u8], token_xml: &str) -> UitsResult<Vec<u8>> {
    let (blocks, audio_start) = read_chain(data)?;

    for block in &blocks {
        if block.block_type == BLOCK_APPLICATION && block.body.get(0..4) == Some(b"UITS") {
            return Err(UitsError::Embed(
                "file already carries an APPLICATION/UITS metadata block".into(),
            ));
        }
    }

    let mut ordered: Vec<(u8, &[u8])> = Vec::with_capacity(blocks.len() + 1);
    let mut padding: Vec<(u8, &[u8])> = Vec::new();

    for block in &blocks {
        if block.block_type == BLOCK_PADDING {
            padding.push((block.block_type, block.body));
        } else {
            ordered.push((block.block_type, block.body));
        }
    }

    let mut new_body = Vec::with_capacity(4 + token_xml.len());
    new_body.extend_from_slice(b"UITS");
    new_body.extend_from_slice(token_xml.as_bytes());
    let pad_to = (new_body.len() + 7) / 8 * 8;
    new_body.resize(pad_to, 0);

    ordered.push((BLOCK_APPLICATION, &new_body));
    ordered.extend(padding);

    let mut out = Vec::with_capacity(data.len() + new_body.len() + 4);
    out.extend_from_slice(MAGIC);

    let last_index = ordered.len() - 1;
    for (i, (block_type, body)) in ordered.iter().enumerate() {
        out.extend_from_slice(&render_block(*block_type, i == last_index, body));
    }

    out.extend_from_slice(&data[audio_start..]);
    Ok(out)
}

pub fn extract(data: &[u8]) -> UitsResult<Option<String>> {
    let (blocks, _) = read_chain(data)?;

    for block in blocks {
        if block.block_type == BLOCK_APPLICATION && block.body.get(0..4) == Some(b"UITS") {
            let mut body = &block.body[4..];
            while body.last() == Some(&0) {
                body = &body[..body.len() - 1];
            }
            let text = String::from_utf8(body.to_vec())
                .map_err(|e| UitsError::Flac(format!("embedded token is not valid UTF-8: {}", e)))?;
            return Ok(Some(text));
        }
    }

    Ok(None)
}
