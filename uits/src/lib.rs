//! `uits` builds, embeds, extracts and verifies UITS proof-of-purchase payloads.

#![forbid(unsafe_code)]

mod core;

pub mod container;
pub mod crypto;
pub mod err;
pub mod hash;
pub mod id3v2;
pub mod token;
pub mod xml;

pub use err::{UitsError, UitsResult};
