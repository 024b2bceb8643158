// src/process/mod.rs

pub mod correct;
pub mod pipeline;
pub mod raw_table;
pub mod sanitize;
pub mod utils;

pub use pipeline::{canonical_department, clean, CleanRecord, CleanStats, Cleaned};
pub use raw_table::{columns, RawRecord, RawTable};
