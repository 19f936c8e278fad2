// Helpers shared by the engine and its callers.
pub mod number_format;
