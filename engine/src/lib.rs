// Engine library root
// Parsing, editing and export of delimited text tables.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod services;
