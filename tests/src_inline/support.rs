use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::input::table::read_table;
use crate::input::{InputError, Table, TableSource};
use crate::model::frame::{EntityKey, JoinedColumn, JoinedTable};
use crate::model::profile::EntityKind;

/// In-memory stand-in for a data directory.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file: &str, csv: &str) -> Self {
        self.tables.insert(file.to_string(), csv.to_string());
        self
    }
}

impl TableSource for MemorySource {
    fn open_table(&self, file: &str) -> Result<Option<Table>, InputError> {
        match self.tables.get(file) {
            Some(csv) => read_table(file, csv.as_bytes()).map(Some),
            None => Ok(None),
        }
    }

    fn locate(&self, file: &str) -> PathBuf {
        PathBuf::from("memory").join(file)
    }
}

/// Team table with one column per `(name, cells)` pair.
pub fn team_frame(teams: &[&str], columns: &[(&str, &[&str])]) -> JoinedTable {
    JoinedTable {
        kind: EntityKind::Team,
        keys: teams.iter().map(|t| EntityKey::team(*t)).collect(),
        columns: columns
            .iter()
            .map(|(name, cells)| JoinedColumn {
                name: name.to_string(),
                cells: cells.iter().map(|c| c.to_string()).collect(),
            })
            .collect(),
    }
}

pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
