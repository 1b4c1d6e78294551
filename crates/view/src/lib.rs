//! Field-level exposure rules and the generic filtering serializer.
//!
//! Records describe their wire fields once, as a static table of [`Field`]
//! metadata (visibility groups plus an optional minimum [`Version`]). The
//! serializer walks that table in declaration order and keeps exactly the
//! fields whose groups intersect the active [`Context`] groups and whose
//! minimum version is satisfied. Relations recurse with the same context.

mod field;
mod serializer;
mod version;

pub use field::{Expose, Field, FieldValue};
pub use serializer::{serialize, serialize_all, Context};
pub use version::{Version, VersionParseError};
