//! Utility functions for token estimation, UUID generation, and text handling.

mod text;
mod tokens;
mod uuid_utils;

pub use text::truncate_snippet;
pub use tokens::estimate_tokens;
pub use uuid_utils::{generate_uuid, generate_uuid_string};
