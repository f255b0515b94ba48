//! Observability utilities.

mod spans;

pub use spans::{SpanTimer, StageSpanAttributes};
