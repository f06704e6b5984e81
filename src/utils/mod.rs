//! Utility functions for code generation, URL processing, and request handling.
//!
//! - [`code_generator`] - Short code generation
//! - [`url_normalizer`] - Destination URL validation and normalization
//! - [`client_info`] - Client IP, user agent, referrer and country extraction

pub mod client_info;
pub mod code_generator;
pub mod url_normalizer;
