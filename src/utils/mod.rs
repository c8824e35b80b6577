//! Shared utility functions.
//!
//! - `dates`: calendar dates to UTC day boundaries
//! - `text`: character-bounded truncation and whitespace handling

mod dates;
mod text;

pub use dates::{end_of_day, start_of_day};
pub use text::{char_len, collapse_whitespace, truncate_chars};
