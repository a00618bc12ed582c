//! `uits key`: fingerprint a public key file (SHA-1, hex-encoded), matching
//! spec.md §4.4's GenKey operation.

use std::fs;

use uits::crypto::sha1_hex;
use uits::err::UitsError;
use uits::err::UitsResult;

use crate::args::KeyArgs;

pub fn run(args: &KeyArgs) -> UitsResult<()> {
    let pem = fs::read(&args.pub_key).map_err(UitsError::File)?;
    let fingerprint = sha1_hex(&pem);

    match &args.output {
        Some(path) => fs::write(path, fingerprint.as_bytes()).map_err(UitsError::File)?,
        None => println!("{}", fingerprint),
    }

    Ok(())
}
