pub mod table;

pub use table::{CsvTable, StoreError};
