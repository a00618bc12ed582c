//! One module per orchestrator operation in spec.md §4.4, each a thin
//! composition over `uits`'s container/xml/crypto layers.

pub mod create;
pub mod extract;
pub mod hash;
pub mod key;
pub mod verify;

use std::path::Path;

use uits::err::{UitsError, UitsResult};
use uits::token::Profile;

use crate::args::SchemaArgs;

pub(crate) fn profile_of(schema: &SchemaArgs) -> Profile {
    if schema.package {
        Profile::Package
    } else {
        Profile::PerTrack
    }
}

/// Reads a file to a UTF-8 string, mapping IO errors the way every command does.
pub(crate) fn read_to_string(path: &Path) -> UitsResult<String> {
    std::fs::read_to_string(path).map_err(UitsError::File)
}
