//! Utility functions for timestamps and text handling.

pub mod text;
pub mod timestamps;

pub use text::{data_url, escape_xml, narration_seconds, truncate_chars, word_count};
pub use timestamps::{format_iso8601, iso_timestamp, parse_timestamp, Timestamp, TimestampError};
