pub mod csv;

// Re-export commonly used functions
pub use self::csv::{export_path, read_csv, write_csv, write_records};
