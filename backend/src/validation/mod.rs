//! Unified validation rules for request payloads.

pub mod rules;
