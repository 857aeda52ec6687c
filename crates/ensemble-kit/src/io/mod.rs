//! File input and output for labeled datasets.
pub mod csv_dataset;

pub use csv_dataset::{read_csv_dataset, write_csv_dataset, CsvDataset, CsvReaderConfig};
