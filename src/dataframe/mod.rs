// DataFrame implementations module
pub mod base;

// Re-exports for convenience
pub use base::DataFrame;
