//! Deterministic XML serialization, schema validation and signature
//! attach/verify for the UITS token.
//!
//! The builder and the verifier deliberately do not share a serializer: the
//! signed byte range is the literal `<metadata>…</metadata>` substring of the
//! emitted document, not a canonicalized re-serialization of a parsed tree
//! (spec.md §9, "Deterministic signing bytes"). `builder::metadata_subrange`
//! is the one function both the create path and the verify path call, so the
//! two never drift apart on what "the signed bytes" means.

pub mod builder;
pub mod schema;
pub mod verify;

pub use builder::{build_document, metadata_subrange};
pub use schema::Schema;
pub use verify::{verify_document, VerifyReport};
