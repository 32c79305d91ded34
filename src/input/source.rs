use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::input::InputError;
use crate::input::table::{Table, read_table};

/// Where stages get their tables from. `Ok(None)` means the table does not
/// exist, which the loader treats as fatal for the primary table only.
pub trait TableSource {
    fn open_table(&self, file: &str) -> Result<Option<Table>, InputError>;

    fn locate(&self, file: &str) -> PathBuf;
}

#[derive(Debug, Clone)]
pub struct DirSource {
    base: PathBuf,
}

impl DirSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn find(&self, file: &str) -> Option<PathBuf> {
        let plain = self.base.join(file);
        if plain.is_file() {
            return Some(plain);
        }
        let gz = self.base.join(format!("{file}.gz"));
        if gz.is_file() {
            return Some(gz);
        }
        None
    }
}

impl TableSource for DirSource {
    fn open_table(&self, file: &str) -> Result<Option<Table>, InputError> {
        let Some(path) = self.find(file) else {
            return Ok(None);
        };
        tracing::debug!("reading {}", path.display());
        let reader = open_maybe_gz(&path)?;
        read_table(file, reader).map(Some)
    }

    fn locate(&self, file: &str) -> PathBuf {
        self.find(file).unwrap_or_else(|| self.base.join(file))
    }
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>, InputError> {
    let file = BufReader::new(File::open(path)?);
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/source.rs"]
mod tests;
