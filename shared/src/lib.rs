pub mod models;
pub mod utils;

// Re-exported so the engine and tests can name the number helpers directly.
pub use utils::number_format::{decimal_count, format_number, parse_number};
