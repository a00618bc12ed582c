//! Container dispatch: detects which audio (or HTML) container a file is,
//! and routes the four operations spec.md §4.1 defines — detect, media-hash,
//! embed, extract — to the matching handler.
//!
//! This is the Rust encoding of the source's process-global function-pointer
//! array (spec.md §9, "Dynamic dispatch table"): no trait objects, no
//! inheritance, just a closed tag dispatched by `match`.

pub mod aiff;
pub mod flac;
pub mod generic;
pub mod html;
pub mod mp3;
pub mod mp4;
pub mod wav;

use std::fs;
use std::path::Path;

use crate::err::{UitsError, UitsResult};

/// The closed set of container families this crate understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Mp3,
    Mp4,
    Flac,
    Aiff,
    Wav,
    Html,
    Generic,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Mp3 => "MP3",
            Format::Mp4 => "MP4",
            Format::Flac => "FLAC",
            Format::Aiff => "AIFF",
            Format::Wav => "WAV",
            Format::Html => "HTML",
            Format::Generic => "generic",
        }
    }

    /// Sniffs `path`'s contents and returns which handler applies.
    ///
    /// MP3's "wrong ID3v2 major version" case and MP4's `co64`/extended-atom
    /// cases are detection *hits* that are simultaneously fatal errors; this
    /// propagates them immediately rather than falling through to the next
    /// format, matching spec.md §4.1.1/§4.1.2.
    pub fn detect(path: &Path) -> UitsResult<Format> {
        let data = fs::read(path).map_err(UitsError::File)?;
        Self::detect_bytes(&data)
    }

    fn detect_bytes(data: &[u8]) -> UitsResult<Format> {
        if mp3::is_valid(data)? {
            return Ok(Format::Mp3);
        }
        if mp4::is_valid(data)? {
            return Ok(Format::Mp4);
        }
        if flac::is_valid(data) {
            return Ok(Format::Flac);
        }
        if aiff::is_valid(data) {
            return Ok(Format::Aiff);
        }
        if wav::is_valid(data) {
            return Ok(Format::Wav);
        }
        if html::is_valid(data) {
            return Ok(Format::Html);
        }
        Ok(Format::Generic)
    }

    pub fn media_hash(self, path: &Path) -> UitsResult<Vec<u8>> {
        let data = fs::read(path).map_err(UitsError::File)?;
        match self {
            Format::Mp3 => mp3::media_hash(&data),
            Format::Mp4 => mp4::media_hash(&data),
            Format::Flac => flac::media_hash(&data),
            Format::Aiff => aiff::media_hash(&data),
            Format::Wav => wav::media_hash(&data),
            Format::Html => html::media_hash(&data),
            Format::Generic => Ok(generic::media_hash(&data)),
        }
    }

    /// Embeds `token_xml` into `in_path`'s container, writing the result to
    /// `out_path`. `pad` is only meaningful for MP3 (spec.md's `--pad` hint);
    /// every other format ignores it.
    pub fn embed(
        self,
        in_path: &Path,
        out_path: &Path,
        token_xml: &str,
        pad: usize,
    ) -> UitsResult<()> {
        let data = fs::read(in_path).map_err(UitsError::File)?;

        let out = match self {
            Format::Mp3 => mp3::embed(&data, token_xml, pad)?,
            Format::Mp4 => mp4::embed(&data, token_xml)?,
            Format::Flac => flac::embed(&data, token_xml)?,
            Format::Aiff => aiff::embed(&data, token_xml)?,
            Format::Wav => wav::embed(&data, token_xml)?,
            Format::Html => html::embed(&data, token_xml)?,
            Format::Generic => generic::embed(&data, token_xml)?,
        };

        fs::write(out_path, out).map_err(UitsError::File)
    }

    pub fn extract(self, path: &Path) -> UitsResult<Option<String>> {
        let data = fs::read(path).map_err(UitsError::File)?;
        match self {
            Format::Mp3 => mp3::extract(&data),
            Format::Mp4 => mp4::extract(&data),
            Format::Flac => flac::extract(&data),
            Format::Aiff => aiff::extract(&data),
            Format::Wav => wav::extract(&data),
            Format::Html => html::extract(&data),
            Format::Generic => generic::extract(&data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_generic_for_unknown_bytes() {
        assert_eq!(
            Format::detect_bytes(b"not a known container format at all").unwrap(),
            Format::Generic
        );
    }
}
