//! Wire contract shared by the OCR client front ends.

pub mod error;
pub mod protocol;
