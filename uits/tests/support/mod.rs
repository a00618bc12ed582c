//! Shared fixture builders and key helpers for the integration suite.
//!
//! Mirrors the synthetic file shapes each container module's own unit tests
//! build (no binary audio fixtures ship with this crate), kept in one place
//! so the end-to-end scenario tests don't each reinvent them.

use std::path::PathBuf;

use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

use uits::crypto::{Algorithm, KeyPair, PublicKey};
use uits::id3v2::{FrameHeader, TagHeader};

/// A PEM keypair written to two temp files, cleaned up on drop.
pub struct TempKeys {
    priv_path: PathBuf,
    pub_path: PathBuf,
}

impl TempKeys {
    pub fn rsa() -> Self {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public = RsaPublicKey::from(&private);

        let priv_pem = private.to_pkcs8_pem(Default::default()).unwrap();
        let pub_pem = public.to_public_key_pem(Default::default()).unwrap();

        let tmp = std::env::temp_dir();
        let unique = format!("{:?}-{}", std::thread::current().id(), std::process::id());
        let priv_path = tmp.join(format!("uits-it-priv-{}.pem", unique));
        let pub_path = tmp.join(format!("uits-it-pub-{}.pem", unique));
        std::fs::write(&priv_path, priv_pem.as_bytes()).unwrap();
        std::fs::write(&pub_path, pub_pem).unwrap();

        TempKeys { priv_path, pub_path }
    }

    pub fn keypair(&self) -> KeyPair {
        KeyPair::load(&self.priv_path, Algorithm::Rsa2048).unwrap()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::load(&self.pub_path, Algorithm::Rsa2048).unwrap()
    }
}

impl Drop for TempKeys {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.priv_path);
        let _ = std::fs::remove_file(&self.pub_path);
    }
}

/// Builds a minimal ID3v2.3 tag wrapping `frames`, followed by zero-pad `pad`
/// bytes, matching the shape `container::mp3`'s own tests build.
pub fn mp3_tag(frames: &[(&[u8; 4], &[u8])], pad: usize) -> Vec<u8> {
    let mut body = Vec::new();
    for (id, content) in frames {
        let header = FrameHeader::new(id, content.len());
        body.extend_from_slice(&header.render());
        body.extend_from_slice(content);
    }
    body.resize(body.len() + pad, 0);

    let mut out = vec![b'I', b'D', b'3', 3, 0, 0];
    out.extend_from_slice(&uits::id3v2::from_u28(body.len() as u32));
    out.extend_from_slice(&body);
    out
}

/// A complete synthetic MP3 file: an empty ID3v2.3 tag followed by audio bytes.
pub fn mp3_file(audio: &[u8]) -> Vec<u8> {
    let mut out = mp3_tag(&[], 0);
    out.extend_from_slice(audio);
    out
}

fn mp4_atom(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + body.len());
    out.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
    out
}

/// A minimal `ftyp`/`mdat`/`moov` MP4 file with one `stco` entry at `chunk_offset`.
pub fn mp4_file(mdat_body: &[u8], chunk_offset: u32) -> Vec<u8> {
    let stco = mp4_atom(b"stco", &{
        let mut b = vec![0, 0, 0, 0];
        b.extend_from_slice(&1u32.to_be_bytes());
        b.extend_from_slice(&chunk_offset.to_be_bytes());
        b
    });
    let stbl = mp4_atom(b"stbl", &stco);
    let minf = mp4_atom(b"minf", &stbl);
    let mdia = mp4_atom(b"mdia", &minf);
    let trak = mp4_atom(b"trak", &mdia);
    let udta = mp4_atom(b"udta", &[]);

    let mut moov_body = Vec::new();
    moov_body.extend_from_slice(&trak);
    moov_body.extend_from_slice(&udta);
    let moov = mp4_atom(b"moov", &moov_body);

    let ftyp = mp4_atom(b"ftyp", b"isomiso2avc1mp41");
    let mdat = mp4_atom(b"mdat", mdat_body);

    let mut out = Vec::new();
    out.extend_from_slice(&ftyp);
    out.extend_from_slice(&mdat);
    out.extend_from_slice(&moov);
    out
}

fn flac_block(block_type: u8, is_last: bool, body: &[u8]) -> Vec<u8> {
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

/// A minimal FLAC stream: `fLaC` magic, a 34-byte STREAMINFO block, then audio.
pub fn flac_file(audio: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"fLaC");
    out.extend_from_slice(&flac_block(0, true, &[0u8; 34]));
    out.extend_from_slice(audio);
    out
}

/// A minimal `FORM`/`AIFF` file with one `SSND` chunk holding `samples`.
pub fn aiff_file(samples: &[u8]) -> Vec<u8> {
    let mut ssnd = Vec::new();
    ssnd.extend_from_slice(b"SSND");
    ssnd.extend_from_slice(&(samples.len() as u32).to_be_bytes());
    ssnd.extend_from_slice(samples);
    if samples.len() & 1 == 1 {
        ssnd.push(0);
    }

    let form_size = 4 + ssnd.len();
    let mut out = Vec::new();
    out.extend_from_slice(b"FORM");
    out.extend_from_slice(&(form_size as u32).to_be_bytes());
    out.extend_from_slice(b"AIFF");
    out.extend_from_slice(&ssnd);
    out
}

/// A minimal `RIFF`/`WAVE` file with one `data` chunk holding `samples`.
pub fn wav_file(samples: &[u8]) -> Vec<u8> {
    let mut data_chunk = Vec::new();
    data_chunk.extend_from_slice(b"data");
    data_chunk.extend_from_slice(&(samples.len() as u32).to_le_bytes());
    data_chunk.extend_from_slice(samples);
    if samples.len() & 1 == 1 {
        data_chunk.push(0);
    }

    let riff_size = 4 + data_chunk.len();
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(riff_size as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(&data_chunk);
    out
}

pub const HTML_PAGE: &str = "<html><head><title>t</title></head><body></body></html>";

/// Writes `bytes` to a fresh temp file and returns its path.
pub fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
    let tmp = std::env::temp_dir();
    let unique = format!("{:?}-{}-{}", std::thread::current().id(), std::process::id(), name);
    let path = tmp.join(unique);
    std::fs::write(&path, bytes).unwrap();
    path
}
