//! MP3 / ID3v2.3 container handler.
//!
//! Grounded on `musikr`'s ID3v2.3 header and syncsafe code
//! (`crate::id3v2::header`, `crate::id3v2::syncdata`), generalized to the
//! write direction the reader-only teacher code didn't need, plus the
//! MPEG-audio frame sizing and VBR-header probe described in
//! `examples/original_source/source/uitsMP3Manager.c`.

use crate::crypto::sha256_bytes;
use crate::err::{UitsError, UitsResult};
use crate::id3v2::header::{FrameHeader, TagHeader};

const PRIV_OWNER: &str = "mailto:uits-info@umusic.com";
const ID3V1_MARKER: &[u8] = b"TAG";

/// `true` if `data` opens with an ID3v2.3 header.
///
/// Any other ID3v2 major version is a detection *hit* (the `ID3` magic
/// matched) that is simultaneously a fatal unsupported-version error, per
/// spec.md §4.1.1 — the caller must propagate the error rather than fall
/// through to another format.
pub fn is_valid(data: &[u8]) -> UitsResult<bool> {
    if data.len() < 3 || &data[0..3] != b"ID3" {
        return Ok(false);
    }

    TagHeader::parse(data)?;
    Ok(true)
}

/// A minimal MPEG-1/2/2.5 Layer III frame header: just enough to compute the
/// frame's total length and whether it is mono, which is all the VBR-header
/// probe and frame-skipping need.
struct MpegFrameHeader {
    frame_len: usize,
    mono: bool,
}

const BITRATES_V1_L3: [u32; 15] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];
const BITRATES_V2_L3: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];
const SAMPLE_RATES_V1: [u32; 3] = [44100, 48000, 32000];
const SAMPLE_RATES_V2: [u32; 3] = [22050, 24000, 16000];
const SAMPLE_RATES_V25: [u32; 3] = [11025, 12000, 8000];

impl MpegFrameHeader {
    /// Parses a 4-byte MPEG audio frame header starting at `data[0..4]`.
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        if data[0] != 0xFF || (data[1] & 0xE0) != 0xE0 {
            return None;
        }

        let version_bits = (data[1] >> 3) & 0x3;
        let layer_bits = (data[1] >> 1) & 0x3;

        if layer_bits != 0b01 {
            // Not Layer III; the VBR markers this handler cares about are
            // only ever written into Layer III frames.
            return None;
        }

        let bitrate_index = (data[2] >> 4) & 0xF;
        let sample_rate_index = (data[2] >> 2) & 0x3;
        let padding = (data[2] >> 1) & 0x1 == 1;

        if bitrate_index == 0 || bitrate_index == 0xF || sample_rate_index == 3 {
            return None;
        }

        let (bitrate_table, sample_rate_table, divisor): (&[u32; 15], &[u32; 3], u32) =
            match version_bits {
                0b11 => (&BITRATES_V1_L3, &SAMPLE_RATES_V1, 144),
                0b10 => (&BITRATES_V2_L3, &SAMPLE_RATES_V2, 72),
                0b00 => (&BITRATES_V2_L3, &SAMPLE_RATES_V25, 72),
                _ => return None,
            };

        let bitrate_kbps = bitrate_table[bitrate_index as usize];
        let sample_rate = sample_rate_table[sample_rate_index as usize];

        if bitrate_kbps == 0 || sample_rate == 0 {
            return None;
        }

        let frame_len =
            (divisor * bitrate_kbps * 1000 / sample_rate) as usize + usize::from(padding);

        let channel_mode = (data[3] >> 6) & 0x3;
        let mono = channel_mode == 0b11;

        Some(MpegFrameHeader { frame_len, mono })
    }
}

/// If the frame starting at `frame` carries a `Xing`/`Info`/`VBRI` marker at
/// the spec-fixed offset for its channel mode, returns the frame's total
/// length (header + body) so the caller can skip the whole thing.
fn vbr_frame_len(frame: &[u8]) -> Option<usize> {
    let header = MpegFrameHeader::parse(frame)?;
    let probe_offset = 4 + if header.mono { 17 } else { 32 };

    if frame.len() < probe_offset + 4 {
        return Some(header.frame_len);
    }

    let marker = &frame[probe_offset..probe_offset + 4];
    if marker == b"Xing" || marker == b"Info" || marker == b"VBRI" {
        Some(header.frame_len)
    } else {
        None
    }
}

/// Returns `(start, end)` of the audio-sample region used for hashing: just
/// past the ID3v2 tag (skipping any malformed zero-pad run at the boundary,
/// and past one VBR header frame if present), up to EOF or the 128-byte
/// ID3v1 footer.
fn audio_region(data: &[u8]) -> UitsResult<(usize, usize)> {
    let header = TagHeader::parse(data)?;
    let mut start = 10 + header.size();

    let pad_start = start;
    while start < data.len() && data[start] == 0 {
        start += 1;
    }
    if start > pad_start {
        log::warn!(
            "skipped {} zero-pad byte(s) beyond the declared ID3v2 tag size",
            start - pad_start
        );
    }

    if start < data.len() {
        if let Some(skip) = vbr_frame_len(&data[start..]) {
            log::info!("skipping VBR header frame ({} bytes) from the media hash", skip);
            start += skip;
        }
    }

    let end = if data.len() >= 128 && &data[data.len() - 128..data.len() - 125] == ID3V1_MARKER {
        data.len() - 128
    } else {
        data.len()
    };

    Ok((start.min(end), end))
}

pub fn media_hash(data: &[u8]) -> UitsResult<Vec<u8>> {
    let (start, end) = audio_region(data)?;
    Ok(sha256_bytes(&data[start..end]))
}

/// Walks the ID3v2 frames within the declared tag, calling `visit` with each
/// frame's header and body slice. Stops at the first padding byte (or the
/// declared tag boundary), never reading past it into audio data.
fn walk_frames<'a>(
    data: &'a [u8],
    tag_size: usize,
    mut visit: impl FnMut(&FrameHeader, &'a [u8]) -> UitsResult<()>,
) -> UitsResult<usize> {
    let tag_end = 10 + tag_size;
    let mut pos = 10;

    while pos < tag_end {
        let remaining = &data[pos..tag_end.min(data.len())];
        match FrameHeader::parse(remaining)? {
            None => break,
            Some(header) => {
                let body_start = pos + 10;
                let body_end = body_start + header.size();
                if body_end > data.len() {
                    return Err(UitsError::Mp3("frame runs past end of file".into()));
                }
                visit(&header, &data[body_start..body_end])?;
                pos = body_end;
            }
        }
    }

    Ok(pos)
}

/// Splices a `PRIV` frame holding `token_xml` into the ID3v2.3 tag, leaving
/// every other frame and all audio data byte-identical.
///
/// Per spec.md's resolution of the zero-pad Open Question, the rewritten tag
/// size always covers exactly the bytes written up through the new frame
/// plus `pad` — it never tries to preserve a pre-existing malformed pad run.
pub fn embed(data: &[u8], token_xml: &str, pad: usize) -> UitsResult<Vec<u8>> {
    let header = TagHeader::parse(data)?;

    let mut frames_out = Vec::new();
    walk_frames(data, header.size(), |frame_header, body| {
        if frame_header.id() == b"PRIV" && body.starts_with(PRIV_OWNER.as_bytes()) {
            let owner_end = body[PRIV_OWNER.len()..]
                .iter()
                .position(|&b| b == 0)
                .map(|i| PRIV_OWNER.len() + i + 1)
                .unwrap_or(body.len());
            if body[PRIV_OWNER.len()..owner_end.min(body.len())].contains(&0)
                && body.len() > owner_end
                && body[owner_end..].windows(5).any(|w| w == b":UITS")
            {
                return Err(UitsError::Embed(
                    "file already carries an embedded UITS token".into(),
                ));
            }
        }
        frames_out.extend_from_slice(&frame_header.render());
        frames_out.extend_from_slice(body);
        Ok(())
    })?;

    let mut priv_body = Vec::with_capacity(PRIV_OWNER.len() + 2 + token_xml.len());
    priv_body.extend_from_slice(PRIV_OWNER.as_bytes());
    priv_body.push(0);
    priv_body.extend_from_slice(token_xml.as_bytes());
    priv_body.push(0);

    let priv_header = FrameHeader::new(b"PRIV", priv_body.len());
    frames_out.extend_from_slice(&priv_header.render());
    frames_out.extend_from_slice(&priv_body);
    frames_out.resize(frames_out.len() + pad, 0);

    // The original declared tag boundary, not wherever `walk_frames` stopped —
    // any pre-existing pad run inside that boundary is dropped, never copied
    // into the output (examples/original_source/source/uitsMP3Manager.c's
    // `mp3SkipPadBytes` result is likewise never copied forward).
    let original_tag_end = 10 + header.size();

    let new_tag_size = frames_out.len() as u32;
    let mut out = Vec::with_capacity(10 + frames_out.len() + (data.len() - original_tag_end));
    out.extend_from_slice(&header.render(new_tag_size));
    out.extend_from_slice(&frames_out);
    out.extend_from_slice(&data[original_tag_end..]);

    Ok(out)
}

/// Scans the `PRIV` frames for one whose owner-string-stripped body contains
/// `:UITS`, returning the text starting at its first `<?xml`.
pub fn extract(data: &[u8]) -> UitsResult<Option<String>> {
    let header = TagHeader::parse(data)?;
    let mut found = None;

    walk_frames(data, header.size(), |frame_header, body| {
        if found.is_some() || frame_header.id() != b"PRIV" {
            return Ok(());
        }

        let owner_end = match body.iter().position(|&b| b == 0) {
            Some(i) => i + 1,
            None => return Ok(()),
        };

        let rest = &body[owner_end..];
        if !rest.windows(5).any(|w| w == b":UITS") {
            return Ok(());
        }

        if let Some(xml_at) = rest
            .windows(5)
            .position(|w| w == b"<?xml")
        {
            let text = &rest[xml_at..];
            let text = match text.iter().position(|&b| b == 0) {
                Some(nul) => &text[..nul],
                None => text,
            };
            found = Some(
                String::from_utf8(text.to_vec())
                    .map_err(|e| UitsError::Mp3(format!("embedded token is not valid UTF-8: {}", e)))?,
            );
        }

        Ok(())
    })?;

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_with_frames(frames: &[(&[u8; 4], &[u8])], pad: usize) -> Vec<u8> {
        let mut body = Vec::new();
        for (id, content) in frames {
            let header = FrameHeader::new(id, content.len());
            body.extend_from_slice(&header.render());
            body.extend_from_slice(content);
        }
        body.resize(body.len() + pad, 0);

        let mut out = vec![b'I', b'D', b'3', 3, 0, 0];
        out.extend_from_slice(&crate::id3v2::syncdata::from_u28(body.len() as u32));
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn detects_v3_tag() {
        let data = tag_with_frames(&[], 0);
        assert!(is_valid(&data).unwrap());
    }

    #[test]
    fn rejects_non_id3() {
        let data = b"not a tag at all, just audio bytes".to_vec();
        assert!(!is_valid(&data).unwrap());
    }

    #[test]
    fn embed_discards_preexisting_pad_run() {
        let audio = b"\xFF\xFB\x90\x00audio data follows here";
        let mut data = tag_with_frames(&[(b"TIT2", b"\x00title")], 40);
        data.extend_from_slice(audio);

        let token = "<?xml version=\"1.0\"?><uits:UITS>hi</uits:UITS>";
        let embedded = embed(&data, token, 0).unwrap();

        assert_eq!(extract(&embedded).unwrap().as_deref(), Some(token));
        assert!(
            embedded.ends_with(audio),
            "audio must immediately follow the rewritten tag, with none of the \
             original 40 pad bytes carried into the output"
        );
    }

    #[test]
    fn embed_then_extract_round_trips() {
        let mut data = tag_with_frames(&[(b"TIT2", b"\x00title")], 0);
        data.extend_from_slice(b"\xFF\xFB\x90\x00audio data follows here");

        let token = "<?xml version=\"1.0\"?><uits:UITS>hi</uits:UITS>";
        let embedded = embed(&data, token, 0).unwrap();
        let extracted = extract(&embedded).unwrap();
        assert_eq!(extracted.as_deref(), Some(token));
    }

    #[test]
    fn media_hash_excludes_tag_and_id3v1_footer() {
        let tag = tag_with_frames(&[], 0);
        let audio = b"audio-sample-bytes-go-here".to_vec();

        let mut no_footer = tag.clone();
        no_footer.extend_from_slice(&audio);
        assert_eq!(media_hash(&no_footer).unwrap(), sha256_bytes(&audio));

        let mut with_footer = tag;
        with_footer.extend_from_slice(&audio);
        with_footer.extend_from_slice(b"TAG");
        with_footer.resize(with_footer.len() + 125, 0);
        assert_eq!(media_hash(&with_footer).unwrap(), sha256_bytes(&audio));
    }

    #[test]
    fn embed_rejects_file_already_carrying_token() {
        let mut body = Vec::new();
        let owner = PRIV_OWNER.as_bytes();
        let mut priv_body = Vec::new();
        priv_body.extend_from_slice(owner);
        priv_body.push(0);
        priv_body.extend_from_slice(b"<?xml?>:UITS");
        priv_body.push(0);
        let header = FrameHeader::new(b"PRIV", priv_body.len());
        body.extend_from_slice(&header.render());
        body.extend_from_slice(&priv_body);

        let mut data = vec![b'I', b'D', b'3', 3, 0, 0];
        data.extend_from_slice(&crate::id3v2::syncdata::from_u28(body.len() as u32));
        data.extend_from_slice(&body);

        assert!(embed(&data, "<?xml?>", 0).is_err());
    }
}
