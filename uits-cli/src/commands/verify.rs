//! `uits verify`: resolve the token source (standalone wins over embedded),
//! then run the three-stage check in `uits::xml::verify_document`.

use uits::container::Format;
use uits::crypto::{Algorithm, PublicKey};
use uits::err::{UitsError, UitsResult};
use uits::hash::HashMatch;
use uits::xml::{verify_document, Schema};

use crate::args::VerifyArgs;
use crate::commands::{profile_of, read_to_string};

pub fn run(args: &VerifyArgs) -> UitsResult<()> {
    let document = resolve_token(args)?;

    let profile = profile_of(&args.schema);
    let schema = Schema::for_profile(profile);

    let algorithm = Algorithm::parse(&args.algorithm)?;
    let public_key = PublicKey::load(&args.pub_key, algorithm)?;

    let reference_hash = if args.nohash {
        None
    } else {
        Some(resolve_reference_hash(args)?)
    };

    let report = verify_document(&document, &schema, reference_hash.as_deref(), &public_key)?;

    match report.hash_warning {
        Some(HashMatch::Base64OfReference) => {
            log::warn!("media hash matched only after Base64-decoding");
        }
        Some(HashMatch::CaseInsensitive) => {
            log::warn!("media hash matched only case-insensitively");
        }
        Some(HashMatch::Exact) | None => {}
    }

    log::info!("token verified OK");
    Ok(())
}

fn resolve_token(args: &VerifyArgs) -> UitsResult<String> {
    if let Some(path) = &args.uits {
        return read_to_string(path);
    }

    let audio = args
        .audio
        .as_ref()
        .ok_or_else(|| UitsError::Param("one of --uits or --audio is required".into()))?;

    let format = Format::detect(audio)?;
    format
        .extract(audio)?
        .ok_or_else(|| UitsError::Extract("container carries no embedded token".into()))
}

fn resolve_reference_hash(args: &VerifyArgs) -> UitsResult<Vec<u8>> {
    if let Some(hex) = &args.hash {
        return decode_hash_text(hex);
    }

    if let Some(path) = &args.hashfile {
        let text = read_to_string(path)?;
        return decode_hash_text(text.trim());
    }

    let audio = args
        .audio
        .as_ref()
        .ok_or_else(|| UitsError::Param("--hash, --hashfile or --audio is required".into()))?;
    let format = Format::detect(audio)?;
    format.media_hash(audio)
}

fn decode_hash_text(text: &str) -> UitsResult<Vec<u8>> {
    if let Ok(bytes) = hex_decode(text) {
        return Ok(bytes);
    }
    uits::crypto::b64_decode(text)
}

fn hex_decode(text: &str) -> Result<Vec<u8>, ()> {
    if text.len() % 2 != 0 {
        return Err(());
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(|_| ()))
        .collect()
}
