//! Output encodings for parsed records.

pub mod json;
