// Core data structures and error types
pub mod column;
pub mod error;

// Re-exports for convenience
pub use column::{Column, ColumnType};
pub use error::{Error, Result};
