use std::path::PathBuf;

pub mod source;
pub mod table;
pub mod values;

pub use source::{DirSource, TableSource};
pub use table::Table;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error in {table}: {source}")]
    Csv { table: String, source: csv::Error },
    #[error("missing primary input: {}", path.display())]
    MissingPrimary { path: PathBuf },
    #[error("missing column {column:?} in {table}")]
    MissingColumn { table: String, column: String },
}
