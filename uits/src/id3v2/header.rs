use crate::core::raw;
use crate::err::{UitsError, UitsResult};
use crate::id3v2::syncdata;

pub const ID_HEADER: &[u8] = b"ID3";

/// The 10-byte ID3v2.3 tag header.
pub struct TagHeader {
    major: u8,
    minor: u8,
    tag_size: usize,
    flags: TagFlags,
}

impl TagHeader {
    /// Parses the first ten bytes of an MP3 file.
    ///
    /// Only major version 3 is accepted — other ID3v2 versions are a detection hit
    /// (the `ID3` marker matched) but an unsupported-version error, not a miss.
    pub fn parse(data: &[u8]) -> UitsResult<Self> {
        if data.len() < 10 || !data[0..3].eq(ID_HEADER) {
            return Err(UitsError::Mp3("not an ID3v2 tag".into()));
        }

        let major = data[3];
        let minor = data[4];

        if major != 3 {
            return Err(UitsError::Mp3(format!(
                "unsupported ID3v2 major version {}",
                major
            )));
        }

        let flags = TagFlags::parse(data[5]);
        let tag_size = syncdata::to_u28(data[6..10].try_into().unwrap()) as usize;

        Ok(TagHeader {
            major,
            minor,
            tag_size,
            flags,
        })
    }

    /// Renders this header back to its 10-byte wire form, with `tag_size` replaced.
    pub fn render(&self, tag_size: u32) -> [u8; 10] {
        let mut out = [0u8; 10];
        out[0..3].copy_from_slice(ID_HEADER);
        out[3] = self.major;
        out[4] = self.minor;
        out[5] = self.flags.render();
        out[6..10].copy_from_slice(&syncdata::from_u28(tag_size));
        out
    }

    pub fn major(&self) -> u8 {
        self.major
    }

    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// The declared tag size: bytes following the 10-byte header, before the first audio frame.
    pub fn size(&self) -> usize {
        self.tag_size
    }

    pub fn flags(&self) -> &TagFlags {
        &self.flags
    }
}

#[derive(Default, Clone, Copy)]
pub struct TagFlags {
    pub unsync: bool,
    pub extended: bool,
    pub experimental: bool,
}

impl TagFlags {
    fn parse(flags: u8) -> Self {
        TagFlags {
            unsync: raw::bit_at(7, flags),
            extended: raw::bit_at(6, flags),
            experimental: raw::bit_at(5, flags),
        }
    }

    fn render(self) -> u8 {
        let mut byte = 0u8;
        if self.unsync {
            byte |= 1 << 7;
        }
        if self.extended {
            byte |= 1 << 6;
        }
        if self.experimental {
            byte |= 1 << 5;
        }
        byte
    }
}

/// A 10-byte ID3v2.3 frame header: a four-character ID, a 32-bit big-endian size
/// (not syncsafe in v2.3), and two flag bytes.
pub struct FrameHeader {
    frame_id: [u8; 4],
    frame_size: usize,
    stat_flags: u8,
    format_flags: u8,
}

impl FrameHeader {
    /// Parses a frame header from `data`, which must have at least 10 bytes remaining.
    ///
    /// Returns `None` if `data[0]` is a zero byte (the start of the padding run) rather
    /// than propagating an error — callers use this to know where frames end.
    pub fn parse(data: &[u8]) -> UitsResult<Option<Self>> {
        if data.is_empty() || data[0] == 0 {
            return Ok(None);
        }

        if data.len() < 10 {
            return Err(UitsError::Mp3("truncated frame header".into()));
        }

        let frame_id: [u8; 4] = data[0..4].try_into().unwrap();

        if !is_frame_id(&frame_id) {
            return Ok(None);
        }

        let frame_size = raw::to_size(&data[4..8]);

        Ok(Some(FrameHeader {
            frame_id,
            frame_size,
            stat_flags: data[8],
            format_flags: data[9],
        }))
    }

    pub fn id(&self) -> &[u8; 4] {
        &self.frame_id
    }

    pub fn size(&self) -> usize {
        self.frame_size
    }

    pub fn render(&self) -> [u8; 10] {
        let mut out = [0u8; 10];
        out[0..4].copy_from_slice(&self.frame_id);
        out[4..8].copy_from_slice(&(self.frame_size as u32).to_be_bytes());
        out[8] = self.stat_flags;
        out[9] = self.format_flags;
        out
    }

    /// Builds a fresh frame header for `frame_id` holding `body_len` bytes, with no flags set.
    pub fn new(frame_id: &[u8; 4], body_len: usize) -> Self {
        FrameHeader {
            frame_id: *frame_id,
            frame_size: body_len,
            stat_flags: 0,
            format_flags: 0,
        }
    }
}

fn is_frame_id(frame_id: &[u8; 4]) -> bool {
    frame_id
        .iter()
        .all(|&ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
}
