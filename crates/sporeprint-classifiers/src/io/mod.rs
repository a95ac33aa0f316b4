//! IO utilities for loading the raw dataset.

pub mod csv_table;

pub use csv_table::{read_csv_from_reader, read_csv_table, RawTable};
