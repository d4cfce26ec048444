//! Table IO: CSV loading and writing under the pipeline's contracts.

pub mod loader;
pub mod writer;

pub use loader::{load_table, load_tables, LoadOptions};
pub use writer::{ensure_output_dir, write_tables, OutputNaming, DEFAULT_NA_REP};
