//! Command-line surface: `create | verify | extract | hash | key | errors`.
//!
//! Built with `clap`'s derive API rather than the `clap_app!` macro the
//! original CLI used for `musikr-cli` — the macro form was removed after
//! `clap` 2, so derive is the idiomatic equivalent for the version this
//! workspace depends on now (see DESIGN.md).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use uits::err::{UitsError, UitsResult};
use uits::token::TokenModel;

#[derive(Parser)]
#[command(
    name = "uits",
    version,
    about = "Create, verify, extract and inspect UITS proof-of-purchase tokens"
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags meaningful to every subcommand.
#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    /// Print informational progress messages.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress everything but the operation's primary output and fatal errors.
    #[arg(short, long, global = true)]
    pub silent: bool,

    /// Print trace-level diagnostics, including the non-fatal media-hash warnings.
    #[arg(short = 'w', long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a new signed token and write it standalone or embedded.
    Create(CreateArgs),
    /// Check a token's schema, media hash and signature.
    Verify(VerifyArgs),
    /// Pull an embedded token out of a container and write it to a file.
    Extract(ExtractArgs),
    /// Compute a container's audio-region hash.
    Hash(HashArgs),
    /// Fingerprint a public key (SHA-1 of the key file).
    Key(KeyArgs),
    /// Print the fixed error taxonomy and its exit codes.
    Errors,
}

/// Schema/profile selection shared by `create`, `verify` and `extract`.
#[derive(Args, Clone, Default)]
pub struct SchemaArgs {
    /// XSD to validate against (informational; structural checks are fixed
    /// per profile — see `uits::xml::schema`). Defaults to `uits.xsd`, or
    /// `cme-uits.xsd` when `--package` is set.
    #[arg(short = 'x', long)]
    pub xsd: Option<PathBuf>,

    /// Use the package-level profile instead of per-track.
    #[arg(long)]
    pub package: bool,
}

impl SchemaArgs {
    pub fn xsd_path(&self) -> PathBuf {
        self.xsd.clone().unwrap_or_else(|| {
            if self.package {
                PathBuf::from("cme-uits.xsd")
            } else {
                PathBuf::from("uits.xsd")
            }
        })
    }
}

#[derive(Args)]
pub struct CreateArgs {
    /// Audio (or HTML) file to hash and optionally embed into.
    #[arg(short, long)]
    pub audio: Option<PathBuf>,

    /// Output path: the standalone token file, or the embedded-audio output when `--embed` is set.
    #[arg(short, long)]
    pub uits: PathBuf,

    /// Embed the token into `--audio`'s container instead of writing it standalone.
    #[arg(short, long)]
    pub embed: bool,

    /// RSA2048 (default) or DSA2048.
    #[arg(short = 'r', long, default_value = "RSA2048")]
    pub algorithm: String,

    /// Private key PEM used to sign.
    #[arg(short = 'i', long = "priv")]
    pub priv_key: PathBuf,

    /// The `keyID` attribute stamped on `<signature>`.
    #[arg(short = 'k', long = "pubID")]
    pub pub_id: String,

    /// MP3 PRIV-frame padding hint, in bytes.
    #[arg(short = 'd', long, default_value_t = 0)]
    pub pad: usize,

    /// Base64-wrap the signature across multiple lines instead of one.
    #[arg(short = 'm', long)]
    pub ml: bool,

    /// Store the media hash Base64-encoded instead of lowercase hex.
    #[arg(short = 'c', long)]
    pub b64: bool,

    /// Use this value for `<Media>` instead of computing it from `--audio`.
    #[arg(short = 'h', long = "hash")]
    pub hash: Option<String>,

    #[command(flatten)]
    pub schema: SchemaArgs,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Container to extract an embedded token from, if `--uits` isn't given.
    #[arg(short, long)]
    pub audio: Option<PathBuf>,

    /// Standalone token file; wins over an embedded token when both are given.
    #[arg(short, long)]
    pub uits: Option<PathBuf>,

    /// Reference media hash to compare against (overrides `--audio`'s computed hash).
    #[arg(long)]
    pub hash: Option<String>,

    /// File holding the reference media hash.
    #[arg(short = 'f', long)]
    pub hashfile: Option<PathBuf>,

    /// Skip media-hash verification entirely.
    #[arg(short = 'n', long)]
    pub nohash: bool,

    /// RSA2048 (default) or DSA2048.
    #[arg(short = 'r', long, default_value = "RSA2048")]
    pub algorithm: String,

    /// Public key PEM used to verify the signature.
    #[arg(short = 'b', long = "pub")]
    pub pub_key: PathBuf,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Container to extract the embedded token from.
    #[arg(short, long)]
    pub audio: PathBuf,

    /// Path to write the extracted token to.
    #[arg(short, long)]
    pub uits: PathBuf,

    /// Verify the extracted token immediately after writing it.
    #[arg(short = 'y', long)]
    pub verify: bool,

    /// RSA2048 (default) or DSA2048. Only consulted with `--verify`.
    #[arg(short = 'r', long, default_value = "RSA2048")]
    pub algorithm: String,

    /// Public key PEM. Required with `--verify`.
    #[arg(short = 'b', long = "pub")]
    pub pub_key: Option<PathBuf>,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Args)]
pub struct HashArgs {
    /// Audio (or HTML) file to hash.
    #[arg(short, long)]
    pub audio: PathBuf,

    /// Print the hash Base64-encoded instead of lowercase hex.
    #[arg(short = 'c', long)]
    pub b64: bool,

    /// Write the hash to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct KeyArgs {
    /// Public key PEM to fingerprint.
    #[arg(short = 'b', long = "pub")]
    pub pub_key: PathBuf,

    /// Write the fingerprint to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// The full per-track/package element set as named long options, plus a
/// repeatable `--set Key=Value` escape hatch.
///
/// The teacher's own `args.rs` only hand-lists the handful of ID3v2 tags it
/// reads (`TAG_NAMES`); this lists every token element instead, since the
/// element set here is small and fixed rather than an open-ended frame set.
#[derive(Args, Default)]
pub struct MetadataArgs {
    #[arg(long)]
    pub nonce: Option<String>,

    #[arg(long = "Distributor")]
    pub distributor: Option<String>,

    #[arg(long = "Time")]
    pub time: Option<String>,

    #[arg(long = "ProductID")]
    pub product_id: Option<String>,
    #[arg(long = "ProductID_type")]
    pub product_id_type: Option<String>,
    #[arg(long = "ProductID_completed")]
    pub product_id_completed: Option<String>,

    #[arg(long = "AssetID")]
    pub asset_id: Option<String>,
    #[arg(long = "AssetID_type")]
    pub asset_id_type: Option<String>,

    #[arg(long = "TID")]
    pub tid: Option<String>,
    #[arg(long = "TID_version")]
    pub tid_version: Option<String>,

    #[arg(long = "UID")]
    pub uid: Option<String>,
    #[arg(long = "UID_version")]
    pub uid_version: Option<String>,

    #[arg(long = "URL")]
    pub url: Option<String>,
    #[arg(long = "URL_type")]
    pub url_type: Option<String>,

    #[arg(long = "URLS")]
    pub urls: Option<String>,
    #[arg(long = "URLS_type")]
    pub urls_type: Option<String>,

    #[arg(long = "PA")]
    pub pa: Option<String>,

    #[arg(long = "Copyright")]
    pub copyright: Option<String>,
    #[arg(long = "Copyright_value")]
    pub copyright_value: Option<String>,

    #[arg(long = "Extra")]
    pub extra: Option<String>,
    #[arg(long = "Extra_type")]
    pub extra_type: Option<String>,

    #[arg(long = "Extras")]
    pub extras: Option<String>,
    #[arg(long = "Extras_type")]
    pub extras_type: Option<String>,

    /// `Element=Value` or `Element_attribute=Value`, for anything not named above.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl MetadataArgs {
    /// Applies every option the user gave to `model`'s matching slot.
    pub fn apply(&self, model: &mut TokenModel) -> UitsResult<()> {
        if let Some(v) = &self.nonce {
            model.set("nonce", v)?;
        }
        if let Some(v) = &self.distributor {
            model.set("Distributor", v)?;
        }
        if let Some(v) = &self.time {
            model.set("Time", v)?;
        }
        if let Some(v) = &self.product_id {
            model.set("ProductID", v)?;
        }
        if let Some(v) = &self.product_id_type {
            model.set_attribute("ProductID", "type", v)?;
        }
        if let Some(v) = &self.product_id_completed {
            model.set_attribute("ProductID", "completed", v)?;
        }
        if let Some(v) = &self.asset_id {
            model.set("AssetID", v)?;
        }
        if let Some(v) = &self.asset_id_type {
            model.set_attribute("AssetID", "type", v)?;
        }
        if let Some(v) = &self.tid {
            model.set("TID", v)?;
        }
        if let Some(v) = &self.tid_version {
            model.set_attribute("TID", "version", v)?;
        }
        if let Some(v) = &self.uid {
            model.set("UID", v)?;
        }
        if let Some(v) = &self.uid_version {
            model.set_attribute("UID", "version", v)?;
        }
        if let Some(v) = &self.url {
            model.set("URL", v)?;
        }
        if let Some(v) = &self.url_type {
            model.set_attribute("URL", "type", v)?;
        }
        if let Some(v) = &self.urls {
            model.set("URLS", v)?;
        }
        if let Some(v) = &self.urls_type {
            model.set_attribute("URLS", "type", v)?;
        }
        if let Some(v) = &self.pa {
            model.set("PA", v)?;
        }
        if let Some(v) = &self.copyright {
            model.set("Copyright", v)?;
        }
        if let Some(v) = &self.copyright_value {
            model.set_attribute("Copyright", "value", v)?;
        }
        if let Some(v) = &self.extra {
            model.set("Extra", v)?;
        }
        if let Some(v) = &self.extra_type {
            model.set_attribute("Extra", "type", v)?;
        }
        if let Some(v) = &self.extras {
            model.set("Extras", v)?;
        }
        if let Some(v) = &self.extras_type {
            model.set_attribute("Extras", "type", v)?;
        }

        for entry in &self.set {
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                UitsError::Param(format!("--set expects Key=Value, got '{}'", entry))
            })?;

            match key.split_once('_') {
                Some((element, attr)) => model.set_attribute(element, attr, value)?,
                None => model.set(key, value)?,
            }
        }

        Ok(())
    }
}
