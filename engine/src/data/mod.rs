pub mod csv_parser;
pub mod csv_writer;
pub mod session;
pub mod xlsx_export;
