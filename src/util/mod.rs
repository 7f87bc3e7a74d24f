//! Utility functions shared by the storage layer and the CLI.
//!
//! - **Text**: terminal-safe sanitizing, Unicode-aware width and truncation
//! - **URL validation**: policy checks for remote seed sources

mod text;
mod url_validator;

pub use text::{display_width, pad_to_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url, UrlValidationError};
