//! Probe table input and result output

pub mod table;
pub mod write;

pub use table::ProbeTable;
pub use write::{write_columns, write_columns_to};
