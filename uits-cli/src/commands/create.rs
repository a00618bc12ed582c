//! `uits create`: detect container → hash → populate → validate → sign →
//! embed or write standalone (spec.md §4.4).

use std::fs;

use uits::container::Format;
use uits::crypto::{self, Algorithm, KeyPair};
use uits::err::{UitsError, UitsResult};
use uits::token::{Profile, TokenModel};
use uits::xml::build_document;

use crate::args::CreateArgs;
use crate::commands::profile_of;

pub fn run(args: &CreateArgs) -> UitsResult<()> {
    let profile = profile_of(&args.schema);
    let algorithm = Algorithm::parse(&args.algorithm)?;

    let mut model = TokenModel::blank(profile);
    args.metadata.apply(&mut model)?;

    let format = match &args.audio {
        Some(path) => Some(Format::detect(path)?),
        None => None,
    };

    if profile == Profile::PerTrack {
        populate_media(&mut model, args, format)?;
    }

    let keypair = KeyPair::load(&args.priv_key, algorithm)?;
    let document = build_document(&mut model, algorithm, &keypair, &args.pub_id, args.ml)?;

    if args.embed {
        let audio_path = args
            .audio
            .as_ref()
            .ok_or_else(|| UitsError::Param("--embed requires --audio".into()))?;
        let format = format
            .ok_or_else(|| UitsError::Audio("could not detect container format".into()))?;

        format.embed(audio_path, &args.uits, &document, args.pad)?;
        log::info!(
            "embedded {} token into {}",
            format.name(),
            args.uits.display()
        );
    } else {
        fs::write(&args.uits, document.as_bytes()).map_err(UitsError::File)?;
        log::info!("wrote standalone token to {}", args.uits.display());
    }

    Ok(())
}

/// Fills `<Media>` (and its `algorithm` attribute) from `--hash`, or by
/// hashing `--audio`'s container if the caller left `<Media>` unset.
fn populate_media(model: &mut TokenModel, args: &CreateArgs, format: Option<Format>) -> UitsResult<()> {
    let already_set = model
        .get("Media")
        .and_then(|s| s.value.as_ref())
        .map(|v| !v.is_empty())
        .unwrap_or(false);

    if already_set {
        return Ok(());
    }

    let text = match &args.hash {
        Some(explicit) => explicit.clone(),
        None => {
            let path = args
                .audio
                .as_ref()
                .ok_or_else(|| UitsError::Param("--audio or --hash is required".into()))?;
            let format =
                format.ok_or_else(|| UitsError::Audio("could not detect container format".into()))?;
            let bytes = format.media_hash(path)?;
            let hex = crypto::hex(&bytes);
            if args.b64 {
                crypto::b64_encode(hex.as_bytes())
            } else {
                hex
            }
        }
    };

    model.set("Media", text)?;
    model.set_attribute("Media", "algorithm", "SHA256")?;
    Ok(())
}
