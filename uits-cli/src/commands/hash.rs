//! `uits hash`: compute a container's audio-region hash and emit it
//! (spec.md §4.4's GenHash operation).

use std::fs;

use uits::container::Format;
use uits::crypto;
use uits::err::{UitsError, UitsResult};

use crate::args::HashArgs;

pub fn run(args: &HashArgs) -> UitsResult<()> {
    let format = Format::detect(&args.audio)?;
    let bytes = format.media_hash(&args.audio)?;

    let hex = crypto::hex(&bytes);
    let text = if args.b64 {
        crypto::b64_encode(hex.as_bytes())
    } else {
        hex
    };

    match &args.output {
        Some(path) => fs::write(path, text.as_bytes()).map_err(UitsError::File)?,
        None => println!("{}", text),
    }

    Ok(())
}
