//! `uits extract`: pull the embedded token out of a container, write it to
//! a file, optionally verify it in place (spec.md §4.4).

use std::fs;

use uits::container::Format;
use uits::crypto::{Algorithm, PublicKey};
use uits::err::{UitsError, UitsResult};
use uits::xml::{verify_document, Schema};

use crate::args::ExtractArgs;
use crate::commands::profile_of;

pub fn run(args: &ExtractArgs) -> UitsResult<()> {
    let format = Format::detect(&args.audio)?;
    let token = format
        .extract(&args.audio)?
        .ok_or_else(|| UitsError::Extract("container carries no embedded token".into()))?;

    fs::write(&args.uits, token.as_bytes()).map_err(UitsError::File)?;
    log::info!("extracted token to {}", args.uits.display());

    if args.verify {
        let pub_key_path = args
            .pub_key
            .as_ref()
            .ok_or_else(|| UitsError::Param("--verify requires --pub".into()))?;
        let algorithm = Algorithm::parse(&args.algorithm)?;
        let public_key = PublicKey::load(pub_key_path, algorithm)?;

        let schema = Schema::for_profile(profile_of(&args.schema));
        verify_document(&token, &schema, None, &public_key)?;
        log::info!("extracted token verified OK");
    }

    Ok(())
}
