//! The closed error taxonomy shared by the library and the CLI.
use thiserror::Error;

/// Every fallible operation in this crate returns one of these kinds.
///
/// Each variant carries the fixed exit code the CLI reports for it (128 and up),
/// mirroring the closed taxonomy: a failure is always local-fatal, never recovered.
#[derive(Error, Debug)]
pub enum UitsError {
    #[error("uits: {0}")]
    Uits(String),

    #[error("file error: {0}")]
    File(#[from] std::io::Error),

    #[error("invalid value: {0}")]
    Value(String),

    #[error("could not parse arguments: {0}")]
    Parse(String),

    #[error("missing required parameter: {0}")]
    Param(String),

    #[error("could not build payload: {0}")]
    Payload(String),

    #[error("create failed: {0}")]
    Create(String),

    #[error("verify failed: {0}")]
    Verify(String),

    #[error("extract failed: {0}")]
    Extract(String),

    #[error("embed failed: {0}")]
    Embed(String),

    #[error("unrecognized audio container: {0}")]
    Audio(String),

    #[error("mp4 error: {0}")]
    Mp4(String),

    #[error("mp3 error: {0}")]
    Mp3(String),

    #[error("flac error: {0}")]
    Flac(String),

    #[error("aiff error: {0}")]
    Aiff(String),

    #[error("wav error: {0}")]
    Wav(String),

    #[error("schema validation failed: {0}")]
    Schema(String),

    #[error("media hash mismatch: {0}")]
    Hash(String),

    #[error("signature check failed: {0}")]
    Sig(String),

    #[error("crypto primitive failed: {0}")]
    Ssl(String),
}

impl UitsError {
    /// The process exit code this kind maps to (128 + taxonomy offset).
    pub fn exit_code(&self) -> i32 {
        match self {
            UitsError::Uits(_) => 128,
            UitsError::File(_) => 129,
            UitsError::Value(_) => 130,
            UitsError::Parse(_) => 131,
            UitsError::Param(_) => 132,
            UitsError::Payload(_) => 133,
            UitsError::Create(_) => 134,
            UitsError::Verify(_) => 135,
            UitsError::Extract(_) => 136,
            UitsError::Embed(_) => 137,
            UitsError::Audio(_) => 138,
            UitsError::Mp4(_) => 139,
            UitsError::Mp3(_) => 140,
            UitsError::Flac(_) => 141,
            UitsError::Aiff(_) => 142,
            UitsError::Wav(_) => 143,
            UitsError::Schema(_) => 144,
            UitsError::Hash(_) => 145,
            UitsError::Sig(_) => 146,
            UitsError::Ssl(_) => 147,
        }
    }

    /// The bare taxonomy name, used by `uits errors` and by log prefixes.
    pub fn kind_name(&self) -> &'static str {
        match self {
            UitsError::Uits(_) => "UITS",
            UitsError::File(_) => "FILE",
            UitsError::Value(_) => "VALUE",
            UitsError::Parse(_) => "PARSE",
            UitsError::Param(_) => "PARAM",
            UitsError::Payload(_) => "PAYLOAD",
            UitsError::Create(_) => "CREATE",
            UitsError::Verify(_) => "VERIFY",
            UitsError::Extract(_) => "EXTRACT",
            UitsError::Embed(_) => "EMBED",
            UitsError::Audio(_) => "AUDIO",
            UitsError::Mp4(_) => "MP4",
            UitsError::Mp3(_) => "MP3",
            UitsError::Flac(_) => "FLAC",
            UitsError::Aiff(_) => "AIFF",
            UitsError::Wav(_) => "WAV",
            UitsError::Schema(_) => "SCHEMA",
            UitsError::Hash(_) => "HASH",
            UitsError::Sig(_) => "SIG",
            UitsError::Ssl(_) => "SSL",
        }
    }
}

/// The full taxonomy, in exit-code order, used by `uits errors`.
pub const TAXONOMY: &[(&str, i32)] = &[
    ("UITS", 128),
    ("FILE", 129),
    ("VALUE", 130),
    ("PARSE", 131),
    ("PARAM", 132),
    ("PAYLOAD", 133),
    ("CREATE", 134),
    ("VERIFY", 135),
    ("EXTRACT", 136),
    ("EMBED", 137),
    ("AUDIO", 138),
    ("MP4", 139),
    ("MP3", 140),
    ("FLAC", 141),
    ("AIFF", 142),
    ("WAV", 143),
    ("SCHEMA", 144),
    ("HASH", 145),
    ("SIG", 146),
    ("SSL", 147),
];

pub type UitsResult<T> = Result<T, UitsError>;
