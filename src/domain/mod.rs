//! Domain layer: Core business types and the input pipeline.
//!
//! Everything here is pure logic over plain data; the only I/O is loading
//! the schema artifact at startup.

mod outcome;
mod record;
mod schema;

pub use outcome::{Outcome, Screening};
pub use record::{assemble, collect, FeatureRecord, InputError, OrderedRow, RawInput};
pub use schema::{FeatureKind, FeatureSchema, FeatureSpec, SchemaLoadError};
